use self::printer::{ImageProperties, TerminalImage};
use std::{fmt::Debug, sync::Arc};

pub(crate) mod printer;
pub(crate) mod protocols;
pub(crate) mod scale;

/// An image that's ready to be printed on the terminal.
///
/// This stores the image in an [std::sync::Arc] so it's cheap to clone.
#[derive(Clone)]
pub(crate) struct Image {
    inner: Arc<TerminalImage>,
    url: String,
}

impl Image {
    /// Constructs a new image.
    pub(crate) fn new(image: TerminalImage, url: String) -> Self {
        Self { inner: Arc::new(image), url }
    }

    pub(crate) fn image(&self) -> &TerminalImage {
        &self.inner
    }

    pub(crate) fn dimensions(&self) -> (u32, u32) {
        self.inner.dimensions()
    }
}

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (width, height) = self.inner.dimensions();
        write!(f, "Image<{}, {width}x{height}>", self.url)
    }
}
