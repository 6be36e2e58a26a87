use super::keyboard::{CommandKeyBindings, KeyBindingsValidationError, KeyboardListener};
use crate::config::KeyBindingsConfig;
use crossterm::event::{poll, read, Event, MouseButton, MouseEvent, MouseEventKind};
use std::{io, time::Duration};
use strum::EnumDiscriminants;

/// A command listener that turns terminal input events into commands.
pub(crate) struct CommandListener {
    keyboard: KeyboardListener,
}

impl CommandListener {
    pub(crate) fn new(config: KeyBindingsConfig) -> Result<Self, KeyBindingsValidationError> {
        let bindings = CommandKeyBindings::try_from(config)?;
        Ok(Self { keyboard: KeyboardListener::new(bindings) })
    }

    /// Try to get the next command.
    ///
    /// This waits for at most `timeout` and returns `Ok(None)` if nothing came in.
    pub(crate) fn try_next_command(&mut self, timeout: Duration) -> io::Result<Option<Command>> {
        if poll(timeout)? { Ok(self.on_event(read()?)) } else { Ok(None) }
    }

    fn on_event(&mut self, event: Event) -> Option<Command> {
        match event {
            Event::Key(event) => self.keyboard.on_key(event),
            Event::Mouse(MouseEvent { kind: MouseEventKind::Down(MouseButton::Left), column, row, .. }) => {
                self.keyboard.reset();
                Some(Command::Click { column, row })
            }
            Event::Resize(..) => Some(Command::Redraw),
            _ => None,
        }
    }
}

/// A command.
#[derive(Clone, Debug, PartialEq, Eq, EnumDiscriminants)]
pub(crate) enum Command {
    /// Redraw the screen.
    ///
    /// This can happen on terminal resize.
    Redraw,

    /// Switch to the tab to the right of the current one, wrapping around.
    NextTab,

    /// Switch to the tab to the left of the current one, wrapping around.
    PreviousTab,

    ShowVoting,
    ShowBreeds,
    ShowFavorites,
    ShowHistory,

    /// Vote the current cat up.
    VoteUp,

    /// Vote the current cat down.
    VoteDown,

    /// Add the current cat to the favorites.
    Favorite,

    /// Move the cursor in the current list down.
    NextItem,

    /// Move the cursor in the current list up.
    PreviousItem,

    /// Act on the item under the cursor.
    Confirm,

    /// Remove the item under the cursor.
    Remove,

    /// Show the next image in the slideshow.
    NextSlide,

    /// Show the previous image in the slideshow.
    PreviousSlide,

    /// Show a specific image in the slideshow, 1-based.
    SelectSlide(u32),

    /// Reload the contents of the current tab.
    Refresh,

    /// Exit the application.
    Exit,

    /// Suspend the application.
    Suspend,

    /// A left click at a position on the screen.
    Click { column: u16, row: u16 },
}
