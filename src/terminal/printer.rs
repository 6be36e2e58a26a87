use crate::{
    style::TextStyle,
    terminal::image::{
        Image,
        printer::{ImagePrinter, PrintImage, PrintImageError, PrintOptions},
    },
};
use crossterm::{
    cursor, style,
    terminal::{self},
    QueueableCommand,
};
use std::{
    io::{self, Write},
    sync::Arc,
};

#[derive(Debug, PartialEq)]
pub(crate) enum TerminalCommand<'a> {
    BeginUpdate,
    EndUpdate,
    MoveTo { column: u16, row: u16 },
    MoveDown(u16),
    MoveRight(u16),
    MoveLeft(u16),
    PrintText { content: &'a str, style: TextStyle },
    ClearScreen,
    Flush,
    PrintImage { image: Image, options: PrintOptions },
}

pub(crate) trait TerminalIo {
    fn execute(&mut self, command: &TerminalCommand<'_>) -> Result<(), TerminalError>;
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum TerminalError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("image: {0}")]
    Image(#[from] PrintImageError),
}

/// A wrapper over the terminal write handle.
pub(crate) struct Terminal<I: TerminalWrite> {
    writer: I,
    image_printer: Arc<ImagePrinter>,
}

impl<I: TerminalWrite> Terminal<I> {
    pub(crate) fn new(mut writer: I, image_printer: Arc<ImagePrinter>) -> io::Result<Self> {
        writer.init()?;
        Ok(Self { writer, image_printer })
    }

    fn print_text(&mut self, content: &str, style: &TextStyle) -> io::Result<()> {
        let content = style.apply(content);
        self.writer.queue(style::PrintStyledContent(content))?;
        Ok(())
    }

    fn print_image(&mut self, image: &Image, options: &PrintOptions) -> Result<(), PrintImageError> {
        let image_printer = self.image_printer.clone();
        image_printer.print(image.image(), options, self)?;
        Ok(())
    }

    pub(crate) fn suspend(&mut self) {
        self.writer.deinit();
    }

    pub(crate) fn resume(&mut self) {
        let _ = self.writer.init();
    }
}

impl<I: TerminalWrite> TerminalIo for Terminal<I> {
    fn execute(&mut self, command: &TerminalCommand<'_>) -> Result<(), TerminalError> {
        use TerminalCommand::*;
        match command {
            BeginUpdate => {
                self.writer.queue(terminal::BeginSynchronizedUpdate)?;
            }
            EndUpdate => {
                self.writer.queue(terminal::EndSynchronizedUpdate)?;
            }
            MoveTo { column, row } => {
                self.writer.queue(cursor::MoveTo(*column, *row))?;
            }
            MoveDown(amount) => {
                self.writer.queue(cursor::MoveDown(*amount))?;
            }
            MoveRight(amount) => {
                self.writer.queue(cursor::MoveRight(*amount))?;
            }
            MoveLeft(amount) => {
                self.writer.queue(cursor::MoveLeft(*amount))?;
            }
            PrintText { content, style } => self.print_text(content, style)?,
            ClearScreen => {
                self.writer.queue(style::ResetColor)?;
                self.writer.queue(terminal::Clear(terminal::ClearType::All))?;
            }
            Flush => self.writer.flush()?,
            PrintImage { image, options } => self.print_image(image, options)?,
        };
        Ok(())
    }
}

impl<I: TerminalWrite> Drop for Terminal<I> {
    fn drop(&mut self) {
        self.writer.deinit();
    }
}

pub(crate) fn should_hide_cursor() -> bool {
    // WezTerm on Windows fails to display images if we've hidden the cursor so we **always** hide it
    // unless we're on WezTerm on Windows.
    let term = std::env::var("TERM_PROGRAM");
    let is_wezterm = term.as_ref().map(|s| s.as_str()) == Ok("WezTerm");
    !(is_windows_based_os() && is_wezterm)
}

fn is_windows_based_os() -> bool {
    let is_windows = std::env::consts::OS == "windows";
    let is_wsl = std::env::var("WSL_DISTRO_NAME").is_ok();
    is_windows || is_wsl
}

pub(crate) trait TerminalWrite: io::Write {
    fn init(&mut self) -> io::Result<()>;
    fn deinit(&mut self);
}

impl TerminalWrite for io::Stdout {
    fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        if should_hide_cursor() {
            self.queue(cursor::Hide)?;
        }
        self.queue(terminal::EnterAlternateScreen)?;
        // Clicks on tabs, indicator dots and list rows.
        self.queue(crossterm::event::EnableMouseCapture)?;
        self.flush()
    }

    fn deinit(&mut self) {
        let _ = self.queue(crossterm::event::DisableMouseCapture);
        let _ = self.queue(terminal::LeaveAlternateScreen);
        if should_hide_cursor() {
            let _ = self.queue(cursor::Show);
        }
        let _ = self.flush();
        let _ = terminal::disable_raw_mode();
    }
}
