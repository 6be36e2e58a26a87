use crate::terminal::WindowSize;

/// A rectangle measured in terminal cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TerminalRect {
    pub(crate) columns: u16,
    pub(crate) rows: u16,
}

/// Shrink an image so it fits inside `area`, keeping its aspect ratio.
///
/// The window size is used to know how tall a cell is compared to how wide it is.
pub(crate) fn fit_image_to_rect(
    window: &WindowSize,
    area: TerminalRect,
    image_width: u32,
    image_height: u32,
) -> TerminalRect {
    if area.columns == 0 || area.rows == 0 || image_width == 0 || image_height == 0 {
        return TerminalRect { columns: 0, rows: 0 };
    }
    let aspect_ratio = image_height as f64 / image_width as f64;
    let cell_aspect_ratio = window.cell_aspect_ratio();

    // How many columns we could use if the height was the only constraint.
    let columns_for_height = (area.rows as f64 * cell_aspect_ratio / aspect_ratio).floor();
    let columns = (area.columns as f64).min(columns_for_height).max(1.0);
    let rows = (columns * aspect_ratio / cell_aspect_ratio).round().clamp(1.0, area.rows as f64);
    TerminalRect { columns: columns as u16, rows: rows as u16 }
}
