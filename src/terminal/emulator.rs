use super::GraphicsMode;
use std::env;
use strum::IntoEnumIterator;

#[derive(Debug, PartialEq, Eq, strum::EnumIter)]
pub enum TerminalEmulator {
    Iterm2,
    WezTerm,
    Mintty,
    Konsole,
    Kitty,
    Unknown,
}

impl TerminalEmulator {
    pub fn detect() -> Self {
        let term = env::var("TERM").unwrap_or_default();
        let term_program = env::var("TERM_PROGRAM").unwrap_or_default();
        let lc_terminal = env::var("LC_TERMINAL").unwrap_or_default();
        Self::detect_from(&term, &term_program, &lc_terminal)
    }

    fn detect_from(term: &str, term_program: &str, lc_terminal: &str) -> Self {
        Self::iter().find(|emulator| emulator.is_detected(term, term_program, lc_terminal)).unwrap_or(Self::Unknown)
    }

    pub fn preferred_protocol(&self) -> GraphicsMode {
        match self {
            // All of these support the iterm2 protocol.
            Self::Iterm2 | Self::WezTerm | Self::Mintty | Self::Konsole => GraphicsMode::Iterm2,
            Self::Kitty | Self::Unknown => GraphicsMode::AsciiBlocks,
        }
    }

    fn is_detected(&self, term: &str, term_program: &str, lc_terminal: &str) -> bool {
        match self {
            Self::Iterm2 => term_program.contains("iTerm") || lc_terminal.contains("iTerm"),
            Self::WezTerm => term_program.contains("WezTerm") || env::var("WEZTERM_EXECUTABLE").is_ok(),
            Self::Mintty => term_program.contains("mintty"),
            Self::Konsole => env::var("KONSOLE_VERSION").is_ok(),
            Self::Kitty => term.contains("kitty"),
            Self::Unknown => true,
        }
    }
}
