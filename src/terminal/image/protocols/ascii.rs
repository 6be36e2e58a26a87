use crate::{
    style::{Color, TextStyle},
    terminal::{
        image::printer::{ImageProperties, ImageSpec, PrintImage, PrintImageError, PrintOptions, RegisterImageError},
        printer::{TerminalCommand, TerminalIo},
    },
};
use image::{imageops::FilterType, DynamicImage, GenericImageView, Rgba};
use itertools::Itertools;

const TOP_CHAR: &str = "▀";
const BOTTOM_CHAR: &str = "▄";

pub(crate) struct AsciiImage(DynamicImage);

impl ImageProperties for AsciiImage {
    fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }
}

#[derive(Default)]
pub struct AsciiPrinter;

impl AsciiPrinter {
    fn pixel_color(pixel: &Rgba<u8>) -> Option<Color> {
        let [r, g, b, alpha] = pixel.0;
        if alpha == 0 { None } else { Some(Color::new(r, g, b)) }
    }
}

impl PrintImage for AsciiPrinter {
    type Image = AsciiImage;

    fn register(&self, spec: ImageSpec) -> Result<Self::Image, RegisterImageError> {
        let image = match spec {
            ImageSpec::Decoded(image) => image,
            ImageSpec::Encoded(contents) => image::load_from_memory(&contents)?,
        };
        // Cat pictures can be huge; we never print more than a screenful of cells so shrink them
        // right away rather than resizing the full image on every redraw.
        let image = if image.width() > 512 || image.height() > 512 { image.thumbnail(512, 512) } else { image };
        Ok(AsciiImage(image.into_rgba8().into()))
    }

    fn print<T>(&self, image: &Self::Image, options: &PrintOptions, terminal: &mut T) -> Result<(), PrintImageError>
    where
        T: TerminalIo,
    {
        // Use half vertical blocks in combination with foreground/background colors to fit 2
        // vertical pixels per cell: cell (x, y) contains pixels (x, 2y) and (x, 2y + 1).
        let image = image.0.resize_exact(options.columns as u32, 2 * options.rows as u32, FilterType::Triangle);
        let image = image.into_rgba8();

        for mut rows in &image.rows().chunks(2) {
            let Some(top_row) = rows.next() else {
                break;
            };
            let mut bottom_row = rows.next();
            for top_pixel in top_row {
                let bottom_pixel = bottom_row.as_mut().and_then(|pixels| pixels.next());
                let top = Self::pixel_color(top_pixel);
                let bottom = bottom_pixel.and_then(Self::pixel_color);
                let command = match (top, bottom) {
                    (Some(top), Some(bottom)) => TerminalCommand::PrintText {
                        content: TOP_CHAR,
                        style: TextStyle::default().fg_color(top).bg_color(bottom),
                    },
                    (Some(top), None) => TerminalCommand::PrintText {
                        content: TOP_CHAR,
                        style: TextStyle::default().fg_color(top),
                    },
                    (None, Some(bottom)) => TerminalCommand::PrintText {
                        content: BOTTOM_CHAR,
                        style: TextStyle::default().fg_color(bottom),
                    },
                    (None, None) => TerminalCommand::MoveRight(1),
                };
                terminal.execute(&command)?;
            }
            terminal.execute(&TerminalCommand::MoveDown(1))?;
            terminal.execute(&TerminalCommand::MoveLeft(options.columns))?;
        }
        Ok(())
    }
}
