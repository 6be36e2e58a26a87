use crate::{
    api::{ApiClient, VoteValue},
    commands::{
        keyboard::KeyBindingsValidationError,
        listener::{Command, CommandListener},
    },
    config::{Config, ThemeConfig},
    session::{Session, SessionEvent, SessionOptions, Tab},
    slideshow::SlideshowOptions,
    terminal::{
        image::printer::{ImagePrinter, ImageRegistry},
        printer::{Terminal, TerminalError},
        GraphicsMode, WindowSize,
    },
    ui::{render::ScreenRenderer, HitMap, HitTarget, KeyHints, Screen},
};
use std::{
    io::{self, Stdout},
    sync::{
        mpsc::{channel, Receiver},
        Arc,
    },
    time::{Duration, Instant},
};
use tracing::{debug, info};

/// How long to wait for input before checking on background events.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// The application.
///
/// This type puts everything else together: it feeds input and background events to the session
/// and redraws the screen whenever something changed.
pub struct App {
    session: Session,
    commands: CommandListener,
    events: Receiver<SessionEvent>,
    printer: Arc<ImagePrinter>,
    theme: ThemeConfig,
    hints: KeyHints,
    hits: HitMap,
}

impl App {
    pub fn new(client: Arc<dyn ApiClient>, config: Config, graphics_mode: GraphicsMode) -> Result<Self, AppError> {
        let hints = KeyHints::new(&config.bindings);
        let commands = CommandListener::new(config.bindings)?;
        let printer = Arc::new(ImagePrinter::new(graphics_mode));
        let (sender, events) = channel();
        let options = SessionOptions {
            image_limit: config.slideshow.image_limit,
            slideshow: SlideshowOptions {
                interval: config.slideshow.interval(),
                restart_on_select: config.slideshow.restart_on_select,
            },
        };
        let session = Session::new(client, ImageRegistry(printer.clone()), sender, options);
        Ok(Self { session, commands, events, printer, theme: config.theme, hints, hits: HitMap::default() })
    }

    /// Run until the user exits.
    pub fn run(mut self) -> Result<(), AppError> {
        let mut terminal = Terminal::new(io::stdout(), self.printer.clone())?;
        info!("Starting session");
        self.session.start();

        let mut dirty = true;
        loop {
            if dirty {
                self.render(&mut terminal)?;
                dirty = false;
            }
            if let Some(command) = self.commands.try_next_command(POLL_INTERVAL)? {
                debug!("Applying command {command:?}");
                match self.apply_command(command) {
                    CommandSideEffect::Exit => {
                        info!("Exiting");
                        return Ok(());
                    }
                    CommandSideEffect::Suspend => {
                        Self::suspend(&mut terminal);
                        dirty = true;
                    }
                    CommandSideEffect::Redraw => dirty = true,
                    CommandSideEffect::None => (),
                };
            }
            dirty |= self.drain_events();
            dirty |= self.session.expire_toasts(Instant::now());
        }
    }

    fn render(&mut self, terminal: &mut Terminal<Stdout>) -> Result<(), AppError> {
        let window = WindowSize::current()?;
        let screen = Screen::build(&self.session, &self.hints);
        self.hits = ScreenRenderer::new(terminal, window, &self.theme).render(&screen)?;
        Ok(())
    }

    /// Hand every pending background event to the session, returning whether there was any.
    fn drain_events(&mut self) -> bool {
        let mut received = false;
        while let Ok(event) = self.events.try_recv() {
            self.session.on_event(event);
            received = true;
        }
        received
    }

    fn apply_command(&mut self, command: Command) -> CommandSideEffect {
        let session = &mut self.session;
        match command {
            Command::Exit => return CommandSideEffect::Exit,
            Command::Suspend => return CommandSideEffect::Suspend,
            Command::Redraw => (),
            Command::NextTab => session.next_tab(),
            Command::PreviousTab => session.previous_tab(),
            Command::ShowVoting => session.switch_tab(Tab::Voting),
            Command::ShowBreeds => session.switch_tab(Tab::Breeds),
            Command::ShowFavorites => session.switch_tab(Tab::Favorites),
            Command::ShowHistory => session.switch_tab(Tab::VoteHistory),
            Command::VoteUp => session.vote(VoteValue::Up),
            Command::VoteDown => session.vote(VoteValue::Down),
            Command::Favorite => session.favorite(),
            Command::NextItem => session.next_item(),
            Command::PreviousItem => session.previous_item(),
            Command::Confirm => session.confirm(),
            Command::Remove => session.remove(),
            Command::NextSlide => session.next_slide(),
            Command::PreviousSlide => session.previous_slide(),
            Command::SelectSlide(number) => match (number as usize).checked_sub(1) {
                Some(index) => session.select_slide(index),
                None => return CommandSideEffect::None,
            },
            Command::Refresh => session.refresh(),
            Command::Click { column, row } => {
                let Some(target) = self.hits.target_at(column, row) else {
                    return CommandSideEffect::None;
                };
                debug!("Clicked on {target:?}");
                match target {
                    HitTarget::Tab(tab) => session.switch_tab(tab),
                    HitTarget::Indicator(index) => session.select_slide(index),
                    HitTarget::ListRow(index) => session.select_row(index),
                }
            }
        };
        CommandSideEffect::Redraw
    }

    fn suspend(terminal: &mut Terminal<Stdout>) {
        #[cfg(unix)]
        unsafe {
            terminal.suspend();
            libc::raise(libc::SIGTSTP);
            terminal.resume();
        }
        #[cfg(not(unix))]
        let _ = terminal;
    }
}

enum CommandSideEffect {
    Exit,
    Suspend,
    Redraw,
    None,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("rendering: {0}")]
    Render(String),

    #[error("invalid key bindings: {0}")]
    KeyBindings(#[from] KeyBindingsValidationError),
}

impl From<TerminalError> for AppError {
    fn from(e: TerminalError) -> Self {
        match e {
            TerminalError::Io(e) => Self::Io(e),
            other => Self::Render(other.to_string()),
        }
    }
}
