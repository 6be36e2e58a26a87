use crossterm::terminal::window_size;
use std::io;

pub(crate) mod emulator;
pub(crate) mod image;
pub(crate) mod printer;
#[cfg(test)]
pub(crate) mod virt;

/// The way images are drawn on the terminal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphicsMode {
    Iterm2,
    AsciiBlocks,
}

/// The dimensions of the terminal window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowSize {
    pub rows: u16,
    pub columns: u16,
    /// The width in pixels, 0 if unknown.
    pub width: u16,
    /// The height in pixels, 0 if unknown.
    pub height: u16,
}

impl WindowSize {
    pub fn current() -> io::Result<Self> {
        match window_size() {
            Ok(size) => Ok(size.into()),
            // Some platforms can't report pixel sizes, fall back to just rows/columns.
            Err(_) => {
                let (columns, rows) = crossterm::terminal::size()?;
                Ok(Self { rows, columns, width: 0, height: 0 })
            }
        }
    }

    /// The ratio between a cell's height and its width.
    ///
    /// Terminals that don't report their pixel size are assumed to use cells twice as tall as
    /// they are wide.
    pub(crate) fn cell_aspect_ratio(&self) -> f64 {
        if self.width == 0 || self.height == 0 || self.rows == 0 || self.columns == 0 {
            return 2.0;
        }
        let pixels_per_column = self.width as f64 / self.columns as f64;
        let pixels_per_row = self.height as f64 / self.rows as f64;
        pixels_per_row / pixels_per_column
    }
}

impl From<crossterm::terminal::WindowSize> for WindowSize {
    fn from(size: crossterm::terminal::WindowSize) -> Self {
        Self { rows: size.rows, columns: size.columns, width: size.width, height: size.height }
    }
}
