use super::{Body, BreedDetails, Footer, Gallery, HitMap, HitTarget, Line, ListView, Screen, Span, TabLabel, Tone};
use crate::{
    config::ThemeConfig,
    style::TextStyle,
    terminal::{
        image::{
            printer::PrintOptions,
            scale::{fit_image_to_rect, TerminalRect},
            Image,
        },
        printer::{TerminalCommand, TerminalError, TerminalIo},
        WindowSize,
    },
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ACTIVE_DOT: &str = "●";
const INACTIVE_DOT: &str = "○";
const SEPARATOR: &str = "─";
const CURSOR: &str = "> ";
const MAX_LIST_WIDTH: u16 = 32;

/// Rows taken by the tab bar, the separators and the footer.
const CHROME_ROWS: u16 = 4;

/// A rectangle on the screen.
#[derive(Clone, Copy, Debug)]
struct Area {
    row: u16,
    column: u16,
    columns: u16,
    rows: u16,
}

impl Area {
    fn bottom(&self) -> u16 {
        self.row + self.rows
    }
}

/// Draws a [Screen] on a terminal.
pub(crate) struct ScreenRenderer<'a, T: TerminalIo> {
    terminal: &'a mut T,
    window: WindowSize,
    theme: &'a ThemeConfig,
    hits: HitMap,
}

impl<'a, T: TerminalIo> ScreenRenderer<'a, T> {
    pub(crate) fn new(terminal: &'a mut T, window: WindowSize, theme: &'a ThemeConfig) -> Self {
        Self { terminal, window, theme, hits: HitMap::default() }
    }

    /// Render the screen, returning where everything clickable ended up.
    pub(crate) fn render(mut self, screen: &Screen) -> Result<HitMap, TerminalError> {
        self.terminal.execute(&TerminalCommand::BeginUpdate)?;
        self.terminal.execute(&TerminalCommand::ClearScreen)?;
        self.render_tabs(&screen.tabs)?;
        if self.window.rows > CHROME_ROWS {
            let columns = self.window.columns;
            let body = Area { row: 2, column: 0, columns, rows: self.window.rows - CHROME_ROWS };
            self.render_separator(1)?;
            self.render_body(&screen.body, body)?;
            self.render_separator(body.bottom())?;
            self.render_footer(&screen.footer, body.bottom() + 1)?;
        }
        self.terminal.execute(&TerminalCommand::EndUpdate)?;
        self.terminal.execute(&TerminalCommand::Flush)?;
        Ok(self.hits)
    }

    fn render_tabs(&mut self, tabs: &[TabLabel]) -> Result<(), TerminalError> {
        let mut column = 0;
        for label in tabs {
            let text = format!(" {} ", label.tab);
            let style = if label.active {
                TextStyle::default().fg_color(self.theme.accent).bold().reversed()
            } else {
                TextStyle::default()
            };
            let width = text.width() as u16;
            self.print_at(0, column, &text, style)?;
            self.hits.add(0, column, width, HitTarget::Tab(label.tab));
            column += width + 1;
        }
        Ok(())
    }

    fn render_separator(&mut self, row: u16) -> Result<(), TerminalError> {
        let separator = SEPARATOR.repeat(self.window.columns as usize);
        self.print_at(row, 0, &separator, self.style(Tone::Muted))
    }

    fn render_body(&mut self, body: &Body, area: Area) -> Result<(), TerminalError> {
        match body {
            Body::Voting { image, loading } => match image {
                Some(image) => self.render_image(image, area),
                None if *loading => self.print_at(area.row, area.column, "Loading...", self.style(Tone::Muted)),
                None => self.print_at(area.row, area.column, "No cat to show", self.style(Tone::Muted)),
            },
            Body::Breeds { list, details, gallery } => {
                let (left, right) = Self::split(area);
                self.render_list(list, left)?;
                self.render_breed(details.as_ref(), gallery, right)
            }
            Body::Entries { list, preview } => {
                let (left, right) = Self::split(area);
                self.render_list(list, left)?;
                match preview {
                    Some(image) => self.render_image(image, right),
                    None => Ok(()),
                }
            }
        }
    }

    fn split(area: Area) -> (Area, Area) {
        let list_columns = (area.columns / 3).min(MAX_LIST_WIDTH);
        let left = Area { columns: list_columns, ..area };
        let gap = 2.min(area.columns - list_columns);
        let right = Area {
            column: area.column + list_columns + gap,
            columns: area.columns - list_columns - gap,
            ..area
        };
        (left, right)
    }

    fn render_list(&mut self, list: &ListView, area: Area) -> Result<(), TerminalError> {
        if let Some(placeholder) = list.placeholder {
            let style = self.style(Tone::Muted);
            let lines = wrap_text(placeholder, area.columns as usize);
            for (row, line) in (area.row..area.bottom()).zip(lines) {
                self.print_at(row, area.column, &line, style)?;
            }
            return Ok(());
        }
        if area.rows == 0 {
            return Ok(());
        }
        let cursor = list.cursor.unwrap_or_default();
        // Scroll just enough to keep the cursor visible.
        let offset = cursor.saturating_sub(area.rows as usize - 1);
        let visible = list.rows.iter().enumerate().skip(offset).take(area.rows as usize);
        for (row, (index, line)) in (area.row..).zip(visible) {
            let selected = list.cursor == Some(index);
            let (prefix, style) = if selected {
                (CURSOR, self.style(Tone::Accent).bold())
            } else {
                ("  ", TextStyle::default())
            };
            self.print_at(row, area.column, prefix, style)?;
            let prefix_width = prefix.width() as u16;
            let columns = area.columns.saturating_sub(prefix_width);
            self.print_line(row, area.column + prefix_width, columns, line, selected)?;
            self.hits.add(row, area.column, area.columns, HitTarget::ListRow(index));
        }
        Ok(())
    }

    fn render_breed(
        &mut self,
        details: Option<&BreedDetails>,
        gallery: &Gallery,
        area: Area,
    ) -> Result<(), TerminalError> {
        let Some(details) = details else {
            let text = "Select a breed to see its details";
            return self.print_truncated(area.row, area.column, area.columns, text, self.style(Tone::Muted));
        };
        let mut lines = vec![
            Line::from(Span::new(details.name, Tone::Accent)),
            Line(vec![Span::new("Origin: ", Tone::Muted), Span::new(details.origin, Tone::Normal)]),
            Line(vec![Span::new("Temperament: ", Tone::Muted), Span::new(details.temperament, Tone::Normal)]),
        ];
        lines.extend(
            wrap_text(details.description, area.columns as usize)
                .into_iter()
                .map(|line| Line::from(Span::new(line, Tone::Normal))),
        );
        if let Some(url) = details.wikipedia_url {
            lines.push(Line(vec![Span::new("Wikipedia: ", Tone::Muted), Span::new(url, Tone::Accent)]));
        }

        let mut row = area.row;
        for line in lines.iter().take(area.rows as usize) {
            self.print_line(row, area.column, area.columns, line, false)?;
            row += 1;
        }
        // Leave a blank line between the details and the images.
        row += 1;
        if row >= area.bottom() {
            return Ok(());
        }
        let remaining = Area { row, rows: area.bottom() - row, ..area };
        self.render_gallery(gallery, remaining)
    }

    fn render_gallery(&mut self, gallery: &Gallery, area: Area) -> Result<(), TerminalError> {
        match gallery {
            Gallery::Idle => Ok(()),
            Gallery::Loading => {
                self.print_truncated(area.row, area.column, area.columns, "Loading images...", self.style(Tone::Muted))
            }
            Gallery::Failed(message) => {
                self.print_truncated(area.row, area.column, area.columns, message, self.style(Tone::Error))
            }
            Gallery::Slides { image, dots } => {
                // The dots go on the last row, the image takes whatever's above them.
                let image_area = Area { rows: area.rows.saturating_sub(2), ..area };
                let rows = self.render_image_sized(image, image_area)?;
                self.render_dots(dots, area.row + rows + 1, area)
            }
        }
    }

    fn render_dots(&mut self, dots: &[bool], row: u16, area: Area) -> Result<(), TerminalError> {
        let width = (dots.len() * 2).saturating_sub(1) as u16;
        let mut column = area.column + area.columns.saturating_sub(width) / 2;
        for (index, active) in dots.iter().enumerate() {
            let (dot, style) = if *active {
                (ACTIVE_DOT, self.style(Tone::Accent))
            } else {
                (INACTIVE_DOT, self.style(Tone::Muted))
            };
            self.print_at(row, column, dot, style)?;
            self.hits.add(row, column, 1, HitTarget::Indicator(index));
            column += 2;
        }
        Ok(())
    }

    fn render_footer(&mut self, footer: &Footer, row: u16) -> Result<(), TerminalError> {
        let loading = if footer.loading { "Loading..." } else { "" };
        let columns = self.window.columns.saturating_sub(loading.width() as u16 + 1);
        match &footer.toast {
            Some(toast) => {
                let style = self.style(toast.tone).bold();
                self.print_truncated(row, 0, columns, &toast.text, style)?;
            }
            None => {
                let mut spans = Vec::new();
                for hint in footer.hints {
                    spans.push(Span::new(format!("{} ", hint.key), Tone::Accent));
                    spans.push(Span::new(format!("{}  ", hint.label), Tone::Muted));
                }
                self.print_line(row, 0, columns, &Line(spans), false)?;
            }
        };
        if footer.loading {
            let column = self.window.columns.saturating_sub(loading.width() as u16);
            self.print_at(row, column, loading, self.style(Tone::Muted))?;
        }
        Ok(())
    }

    fn render_image(&mut self, image: &Image, area: Area) -> Result<(), TerminalError> {
        self.render_image_sized(image, area)?;
        Ok(())
    }

    /// Print an image centered horizontally at the top of `area`, returning the rows it took.
    fn render_image_sized(&mut self, image: &Image, area: Area) -> Result<u16, TerminalError> {
        let (width, height) = image.dimensions();
        let available = TerminalRect { columns: area.columns, rows: area.rows };
        let TerminalRect { columns, rows } = fit_image_to_rect(&self.window, available, width, height);
        if columns == 0 || rows == 0 {
            return Ok(0);
        }
        let column = area.column + (area.columns - columns) / 2;
        self.terminal.execute(&TerminalCommand::MoveTo { column, row: area.row })?;
        let options = PrintOptions { columns, rows };
        self.terminal.execute(&TerminalCommand::PrintImage { image: image.clone(), options })?;
        Ok(rows)
    }

    fn print_line(
        &mut self,
        row: u16,
        column: u16,
        columns: u16,
        line: &Line,
        highlight: bool,
    ) -> Result<(), TerminalError> {
        let mut column = column;
        let mut remaining = columns;
        for span in &line.0 {
            if remaining == 0 {
                break;
            }
            let mut style = self.style(span.tone);
            if highlight {
                style = style.bold();
            }
            let text = truncate(&span.text, remaining as usize);
            let width = text.width() as u16;
            self.print_at(row, column, &text, style)?;
            column += width;
            remaining -= width;
        }
        Ok(())
    }

    fn print_truncated(
        &mut self,
        row: u16,
        column: u16,
        columns: u16,
        text: &str,
        style: TextStyle,
    ) -> Result<(), TerminalError> {
        self.print_at(row, column, &truncate(text, columns as usize), style)
    }

    fn print_at(&mut self, row: u16, column: u16, text: &str, style: TextStyle) -> Result<(), TerminalError> {
        self.terminal.execute(&TerminalCommand::MoveTo { column, row })?;
        self.terminal.execute(&TerminalCommand::PrintText { content: text, style })
    }

    fn style(&self, tone: Tone) -> TextStyle {
        let color = match tone {
            Tone::Normal => return TextStyle::default(),
            Tone::Accent => self.theme.accent,
            Tone::Muted => self.theme.muted,
            Tone::Upvote => self.theme.upvote,
            Tone::Downvote => self.theme.downvote,
            Tone::Success => self.theme.success,
            Tone::Error => self.theme.error,
        };
        TextStyle::default().fg_color(color)
    }
}

/// Cut `text` so it's at most `columns` wide.
fn truncate(text: &str, columns: usize) -> String {
    let mut output = String::new();
    let mut width = 0;
    for c in text.chars() {
        let char_width = c.width().unwrap_or_default();
        if width + char_width > columns {
            break;
        }
        width += char_width;
        output.push(c);
    }
    output
}

/// Split `text` into lines at most `columns` wide, breaking on whitespace.
///
/// Words longer than a line are cut.
fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    if columns == 0 {
        return Vec::new();
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let word = truncate(word, columns);
        if current.is_empty() {
            current = word;
        } else if current.width() + 1 + word.width() <= columns {
            current.push(' ');
            current.push_str(&word);
        } else {
            lines.push(std::mem::replace(&mut current, word));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
