use super::{
    protocols::{
        ascii::{AsciiImage, AsciiPrinter},
        iterm::{ItermImage, ItermPrinter},
    },
    Image,
};
use crate::terminal::{
    printer::{TerminalError, TerminalIo},
    GraphicsMode,
};
use image::{DynamicImage, ImageError};
use std::{fmt, io, sync::Arc};

pub(crate) trait PrintImage {
    type Image: ImageProperties;

    /// Register an image.
    fn register(&self, spec: ImageSpec) -> Result<Self::Image, RegisterImageError>;

    fn print<T>(&self, image: &Self::Image, options: &PrintOptions, terminal: &mut T) -> Result<(), PrintImageError>
    where
        T: TerminalIo;
}

pub(crate) trait ImageProperties {
    fn dimensions(&self) -> (u32, u32);
}

/// The contents of an image being registered.
pub(crate) enum ImageSpec {
    /// An encoded image, as downloaded.
    Encoded(Vec<u8>),

    /// An image that's already been decoded.
    Decoded(DynamicImage),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PrintOptions {
    pub(crate) columns: u16,
    pub(crate) rows: u16,
}

pub(crate) enum TerminalImage {
    Iterm(ItermImage),
    Ascii(AsciiImage),
}

impl ImageProperties for TerminalImage {
    fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Iterm(image) => image.dimensions(),
            Self::Ascii(image) => image.dimensions(),
        }
    }
}

pub enum ImagePrinter {
    Iterm(ItermPrinter),
    Ascii(AsciiPrinter),
}

impl Default for ImagePrinter {
    fn default() -> Self {
        Self::Ascii(AsciiPrinter)
    }
}

impl ImagePrinter {
    pub fn new(mode: GraphicsMode) -> Self {
        match mode {
            GraphicsMode::Iterm2 => Self::Iterm(ItermPrinter),
            GraphicsMode::AsciiBlocks => Self::Ascii(AsciiPrinter),
        }
    }
}

impl PrintImage for ImagePrinter {
    type Image = TerminalImage;

    fn register(&self, spec: ImageSpec) -> Result<Self::Image, RegisterImageError> {
        let image = match self {
            Self::Iterm(printer) => TerminalImage::Iterm(printer.register(spec)?),
            Self::Ascii(printer) => TerminalImage::Ascii(printer.register(spec)?),
        };
        Ok(image)
    }

    fn print<T>(&self, image: &Self::Image, options: &PrintOptions, terminal: &mut T) -> Result<(), PrintImageError>
    where
        T: TerminalIo,
    {
        match (self, image) {
            (Self::Iterm(printer), TerminalImage::Iterm(image)) => printer.print(image, options, terminal),
            (Self::Ascii(printer), TerminalImage::Ascii(image)) => printer.print(image, options, terminal),
            _ => Err(PrintImageError::Unsupported),
        }
    }
}

/// Turns raw image contents into [Image]s using the configured printer.
///
/// This is shared between the UI thread and the fetch worker.
#[derive(Clone, Default)]
pub(crate) struct ImageRegistry(pub Arc<ImagePrinter>);

impl fmt::Debug for ImageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = match self.0.as_ref() {
            ImagePrinter::Iterm(_) => "Iterm",
            ImagePrinter::Ascii(_) => "Ascii",
        };
        write!(f, "ImageRegistry<{inner}>")
    }
}

impl ImageRegistry {
    pub(crate) fn register_remote(&self, url: &str, contents: Vec<u8>) -> Result<Image, RegisterImageError> {
        let resource = self.0.register(ImageSpec::Encoded(contents))?;
        Ok(Image::new(resource, url.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum PrintImageError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("unsupported image type")]
    Unsupported,
}

impl From<TerminalError> for PrintImageError {
    fn from(e: TerminalError) -> Self {
        match e {
            TerminalError::Io(e) => Self::Io(e),
            TerminalError::Image(e) => e,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum RegisterImageError {
    #[error("image decoding: {0}")]
    Image(#[from] ImageError),
}
