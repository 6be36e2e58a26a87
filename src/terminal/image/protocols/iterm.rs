use crate::terminal::{
    image::printer::{ImageProperties, ImageSpec, PrintImage, PrintImageError, PrintOptions, RegisterImageError},
    printer::{TerminalCommand, TerminalIo},
};
use base64::{engine::general_purpose::STANDARD, Engine};
use image::{codecs::png::PngEncoder, GenericImageView, ImageEncoder, ImageFormat};

pub(crate) struct ItermImage {
    dimensions: (u32, u32),
    raw_length: usize,
    base64_contents: String,
}

impl ItermImage {
    fn new(contents: Vec<u8>, dimensions: (u32, u32)) -> Self {
        let raw_length = contents.len();
        let base64_contents = STANDARD.encode(&contents);
        Self { dimensions, raw_length, base64_contents }
    }
}

impl ImageProperties for ItermImage {
    fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }
}

#[derive(Default)]
pub struct ItermPrinter;

impl PrintImage for ItermPrinter {
    type Image = ItermImage;

    fn register(&self, spec: ImageSpec) -> Result<Self::Image, RegisterImageError> {
        match spec {
            ImageSpec::Decoded(image) => {
                let dimensions = image.dimensions();
                let mut contents = Vec::new();
                let encoder = PngEncoder::new(&mut contents);
                encoder.write_image(image.as_bytes(), dimensions.0, dimensions.1, image.color().into())?;
                Ok(ItermImage::new(contents, dimensions))
            }
            ImageSpec::Encoded(contents) => {
                // The terminal decodes the image itself but we still need its dimensions and to
                // make sure it's an image at all.
                let format = image::guess_format(&contents)?;
                let image = image::load_from_memory_with_format(&contents, format)?;
                let dimensions = image.dimensions();
                if format == ImageFormat::Gif {
                    // Only keep the first frame so the terminal doesn't loop the animation.
                    return self.register(ImageSpec::Decoded(image));
                }
                Ok(ItermImage::new(contents, dimensions))
            }
        }
    }

    fn print<T>(&self, image: &Self::Image, options: &PrintOptions, terminal: &mut T) -> Result<(), PrintImageError>
    where
        T: TerminalIo,
    {
        let size = image.raw_length;
        let columns = options.columns;
        let rows = options.rows;
        let contents = &image.base64_contents;
        let content = format!(
            "\x1b]1337;File=size={size};width={columns};height={rows};inline=1;preserveAspectRatio=1:{contents}\x07"
        );
        terminal.execute(&TerminalCommand::PrintText { content: &content, style: Default::default() })?;
        Ok(())
    }
}
