use super::{
    image::{printer::PrintOptions, Image},
    printer::{TerminalCommand, TerminalError, TerminalIo},
    WindowSize,
};
use crate::style::TextStyle;
use std::collections::HashMap;

pub(crate) struct PrintedImage {
    pub(crate) image: Image,
    pub(crate) options: PrintOptions,
}

pub(crate) struct TerminalGrid {
    pub(crate) rows: Vec<Vec<StyledChar>>,
    pub(crate) images: HashMap<(u16, u16), PrintedImage>,
}

impl TerminalGrid {
    /// The text in the given row, with trailing whitespace removed.
    pub(crate) fn line(&self, row: u16) -> String {
        let line: String = self.rows[row as usize].iter().map(|c| c.character).collect();
        line.trim_end().to_string()
    }

    /// Finds the first position where `text` is printed.
    pub(crate) fn find(&self, text: &str) -> Option<(u16, u16)> {
        for (row_index, row) in self.rows.iter().enumerate() {
            let chars: Vec<char> = row.iter().map(|c| c.character).collect();
            let needle: Vec<char> = text.chars().collect();
            if let Some(column) = chars.windows(needle.len()).position(|window| window == needle.as_slice()) {
                return Some((row_index as u16, column as u16));
            }
        }
        None
    }

    pub(crate) fn style_at(&self, row: u16, column: u16) -> TextStyle {
        self.rows[row as usize][column as usize].style
    }
}

/// A terminal that keeps everything printed on it in memory.
pub(crate) struct VirtualTerminal {
    row: u16,
    column: u16,
    rows: Vec<Vec<StyledChar>>,
    images: HashMap<(u16, u16), PrintedImage>,
}

impl VirtualTerminal {
    pub(crate) fn new(dimensions: WindowSize) -> Self {
        let rows = vec![vec![StyledChar::default(); dimensions.columns as usize]; dimensions.rows as usize];
        Self { row: 0, column: 0, rows, images: Default::default() }
    }

    pub(crate) fn into_contents(self) -> TerminalGrid {
        TerminalGrid { rows: self.rows, images: self.images }
    }

    fn print_text(&mut self, content: &str, style: &TextStyle) {
        for c in content.chars() {
            if let Some(cell) = self.rows.get_mut(self.row as usize).and_then(|row| row.get_mut(self.column as usize)) {
                cell.character = c;
                cell.style = *style;
            }
            self.column += 1;
        }
    }

    fn clear_screen(&mut self) {
        for row in &mut self.rows {
            for cell in row {
                *cell = StyledChar::default();
            }
        }
        self.images.clear();
    }
}

impl TerminalIo for VirtualTerminal {
    fn execute(&mut self, command: &TerminalCommand<'_>) -> Result<(), TerminalError> {
        use TerminalCommand::*;
        match command {
            BeginUpdate | EndUpdate | Flush => (),
            MoveTo { column, row } => {
                self.column = *column;
                self.row = *row;
            }
            MoveDown(amount) => self.row += amount,
            MoveRight(amount) => self.column += amount,
            MoveLeft(amount) => self.column = self.column.saturating_sub(*amount),
            PrintText { content, style } => self.print_text(content, style),
            ClearScreen => self.clear_screen(),
            PrintImage { image, options } => {
                let image = PrintedImage { image: image.clone(), options: options.clone() };
                self.images.insert((self.row, self.column), image);
            }
        };
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct StyledChar {
    pub(crate) character: char,
    pub(crate) style: TextStyle,
}

impl Default for StyledChar {
    fn default() -> Self {
        Self { character: ' ', style: Default::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: WindowSize = WindowSize { rows: 2, columns: 3, width: 0, height: 0 };

    #[test]
    fn text() {
        let mut term = VirtualTerminal::new(SIZE);
        term.execute(&TerminalCommand::PrintText { content: "abc", style: Default::default() }).unwrap();
        term.execute(&TerminalCommand::MoveTo { column: 0, row: 1 }).unwrap();
        term.execute(&TerminalCommand::PrintText { content: "A", style: Default::default() }).unwrap();
        let grid = term.into_contents();
        assert_eq!(grid.line(0), "abc");
        assert_eq!(grid.line(1), "A");
    }

    #[test]
    fn movement() {
        let mut term = VirtualTerminal::new(SIZE);
        term.execute(&TerminalCommand::PrintText { content: "A", style: Default::default() }).unwrap();
        term.execute(&TerminalCommand::MoveDown(1)).unwrap();
        term.execute(&TerminalCommand::PrintText { content: "B", style: Default::default() }).unwrap();
        term.execute(&TerminalCommand::MoveTo { column: 2, row: 0 }).unwrap();
        term.execute(&TerminalCommand::PrintText { content: "C", style: Default::default() }).unwrap();
        term.execute(&TerminalCommand::MoveLeft(2)).unwrap();
        term.execute(&TerminalCommand::MoveDown(1)).unwrap();
        term.execute(&TerminalCommand::MoveRight(1)).unwrap();
        term.execute(&TerminalCommand::PrintText { content: "D", style: Default::default() }).unwrap();

        let grid = term.into_contents();
        assert_eq!(grid.line(0), "A C");
        assert_eq!(grid.line(1), " BD");
    }

    #[test]
    fn overflow_is_dropped() {
        let mut term = VirtualTerminal::new(SIZE);
        term.execute(&TerminalCommand::PrintText { content: "abcdef", style: Default::default() }).unwrap();
        let grid = term.into_contents();
        assert_eq!(grid.line(0), "abc");
        assert_eq!(grid.find("bc"), Some((0, 1)));
    }
}
