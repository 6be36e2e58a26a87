use super::listener::{Command, CommandDiscriminants};
use crate::config::KeyBindingsConfig;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use serde_with::DeserializeFromStr;
use std::{fmt, iter, mem, str::FromStr};

/// Turns key presses into commands.
///
/// Key presses that are a prefix of some binding are buffered until the binding is either
/// completed or can no longer match.
pub(crate) struct KeyboardListener {
    bindings: CommandKeyBindings,
    events: Vec<KeyEvent>,
}

impl KeyboardListener {
    pub(crate) fn new(bindings: CommandKeyBindings) -> Self {
        Self { bindings, events: Vec::new() }
    }

    /// Process a key event, returning the command it completes, if any.
    pub(crate) fn on_key(&mut self, event: KeyEvent) -> Option<Command> {
        // Ignore release events
        if event.kind == KeyEventKind::Release {
            return None;
        }
        let mut events = mem::take(&mut self.events);
        events.push(event);
        let (command, events) = self.match_events(events);
        self.events = events;
        command
    }

    /// Forget any partially typed binding.
    pub(crate) fn reset(&mut self) {
        self.events.clear();
    }

    fn match_events(&self, events: Vec<KeyEvent>) -> (Option<Command>, Vec<KeyEvent>) {
        match self.bindings.apply(&events) {
            InputAction::Emit(command) => (Some(command), Vec::new()),
            InputAction::Buffer => (None, events),
            InputAction::Reset => (None, Vec::new()),
        }
    }
}

enum InputAction {
    Buffer,
    Reset,
    Emit(Command),
}

pub(crate) struct CommandKeyBindings {
    bindings: Vec<(KeyBinding, CommandDiscriminants)>,
}

impl CommandKeyBindings {
    fn apply(&self, events: &[KeyEvent]) -> InputAction {
        let mut any_partials = false;
        for (binding, identifier) in &self.bindings {
            match binding.match_events(events) {
                BindingMatch::Full(context) => return Self::instantiate(identifier, context),
                BindingMatch::Partial => any_partials = true,
                BindingMatch::None => (),
            }
        }
        if any_partials { InputAction::Buffer } else { InputAction::Reset }
    }

    fn instantiate(discriminant: &CommandDiscriminants, context: MatchContext) -> InputAction {
        use CommandDiscriminants::*;
        let command = match discriminant {
            Redraw => Command::Redraw,
            NextTab => Command::NextTab,
            PreviousTab => Command::PreviousTab,
            ShowVoting => Command::ShowVoting,
            ShowBreeds => Command::ShowBreeds,
            ShowFavorites => Command::ShowFavorites,
            ShowHistory => Command::ShowHistory,
            VoteUp => Command::VoteUp,
            VoteDown => Command::VoteDown,
            Favorite => Command::Favorite,
            NextItem => Command::NextItem,
            PreviousItem => Command::PreviousItem,
            Confirm => Command::Confirm,
            Remove => Command::Remove,
            NextSlide => Command::NextSlide,
            PreviousSlide => Command::PreviousSlide,
            SelectSlide => {
                match context {
                    // this means the command is malformed and this should have been caught earlier
                    // on.
                    MatchContext::None => return InputAction::Reset,
                    MatchContext::Number(number) => Command::SelectSlide(number),
                }
            }
            Refresh => Command::Refresh,
            Suspend => Command::Suspend,
            Exit => Command::Exit,
            // Clicks only come from the mouse.
            Click => return InputAction::Reset,
        };
        InputAction::Emit(command)
    }

    fn validate_conflicts<'a>(
        bindings: impl Iterator<Item = &'a KeyBinding>,
    ) -> Result<(), KeyBindingsValidationError> {
        let mut bindings: Vec<_> = bindings.map(|binding| &binding.0).collect();
        bindings.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        for window in bindings.windows(2) {
            if window[0].iter().eq(window[1].iter().take(window[0].len())) {
                return Err(KeyBindingsValidationError::Conflict(
                    KeyBinding(window[0].clone()),
                    KeyBinding(window[1].clone()),
                ));
            }
        }
        Ok(())
    }
}

impl TryFrom<KeyBindingsConfig> for CommandKeyBindings {
    type Error = KeyBindingsValidationError;

    fn try_from(config: KeyBindingsConfig) -> Result<Self, Self::Error> {
        let zip = |discriminant, bindings: Vec<KeyBinding>| bindings.into_iter().zip(iter::repeat(discriminant));
        if !config.select_slide.iter().all(|k| k.expects_number()) {
            return Err(KeyBindingsValidationError::Invalid("select_slide", "<number> matcher required"));
        }
        let bindings: Vec<_> = iter::empty()
            .chain(zip(CommandDiscriminants::NextTab, config.next_tab))
            .chain(zip(CommandDiscriminants::PreviousTab, config.previous_tab))
            .chain(zip(CommandDiscriminants::ShowVoting, config.show_voting))
            .chain(zip(CommandDiscriminants::ShowBreeds, config.show_breeds))
            .chain(zip(CommandDiscriminants::ShowFavorites, config.show_favorites))
            .chain(zip(CommandDiscriminants::ShowHistory, config.show_history))
            .chain(zip(CommandDiscriminants::VoteUp, config.vote_up))
            .chain(zip(CommandDiscriminants::VoteDown, config.vote_down))
            .chain(zip(CommandDiscriminants::Favorite, config.favorite))
            .chain(zip(CommandDiscriminants::NextItem, config.next_item))
            .chain(zip(CommandDiscriminants::PreviousItem, config.previous_item))
            .chain(zip(CommandDiscriminants::Confirm, config.confirm))
            .chain(zip(CommandDiscriminants::Remove, config.remove))
            .chain(zip(CommandDiscriminants::NextSlide, config.next_slide))
            .chain(zip(CommandDiscriminants::PreviousSlide, config.previous_slide))
            .chain(zip(CommandDiscriminants::SelectSlide, config.select_slide))
            .chain(zip(CommandDiscriminants::Refresh, config.refresh))
            .chain(zip(CommandDiscriminants::Exit, config.exit))
            .chain(zip(CommandDiscriminants::Suspend, config.suspend))
            .collect();
        Self::validate_conflicts(bindings.iter().map(|binding| &binding.0))?;
        Ok(Self { bindings })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum KeyBindingsValidationError {
    #[error("invalid binding for {0}: {1}")]
    Invalid(&'static str, &'static str),

    #[error("conflicting keybindings: {0} and {1}")]
    Conflict(KeyBinding, KeyBinding),
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum BindingMatch {
    Full(MatchContext),
    Partial,
    None,
}

#[derive(Clone, Debug, PartialEq, Eq, DeserializeFromStr)]
pub struct KeyBinding(Vec<KeyMatcher>);

impl KeyBinding {
    fn match_events(&self, mut events: &[KeyEvent]) -> BindingMatch {
        let mut output_context = MatchContext::None;
        for (index, matcher) in self.0.iter().enumerate() {
            let Some((context, rest)) = matcher.try_match_events(events) else {
                return BindingMatch::None;
            };
            if !matches!(context, MatchContext::None) {
                output_context = context;
            }
            events = rest;

            // We ran all matchers but we have no events left; this is a partial match.
            if index != self.0.len() - 1 && events.is_empty() {
                return BindingMatch::Partial;
            }
        }
        BindingMatch::Full(output_context)
    }

    fn expects_number(&self) -> bool {
        self.0.iter().any(|m| matches!(m, KeyMatcher::Number))
    }
}

impl FromStr for KeyBinding {
    type Err = KeyBindingParseError;

    fn from_str(mut input: &str) -> Result<Self, Self::Err> {
        let mut matchers = Vec::new();
        let mut has_numbers = false;
        while !input.is_empty() {
            let (matcher, rest) = KeyMatcher::parse(input)?;
            let is_number = matches!(matcher, KeyMatcher::Number);
            // We don't want more than one <number> matcher
            if has_numbers && is_number {
                return Err(KeyBindingParseError::TooManyNumbers);
            }
            has_numbers = has_numbers || is_number;
            matchers.push(matcher);
            input = rest;
        }
        if matchers.is_empty() {
            return Err(KeyBindingParseError::NoInput);
        }
        Ok(Self(matchers))
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for matcher in &self.0 {
            write!(f, "{matcher}")?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum KeyBindingParseError {
    #[error("no input")]
    NoInput,

    #[error("not a valid key: {0}")]
    InvalidKey(char),

    #[error("too many number placeholders")]
    TooManyNumbers,

    #[error("invalid control sequence")]
    InvalidControlSequence,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd)]
enum KeyMatcher {
    Key(KeyCombination),
    Number,
}

impl KeyMatcher {
    fn try_match_events<'a>(&self, events: &'a [KeyEvent]) -> Option<(MatchContext, &'a [KeyEvent])> {
        match self {
            Self::Key(combo) => Self::try_match_key(combo, events),
            Self::Number => Self::try_match_number(events),
        }
    }

    fn try_match_key<'a>(combo: &KeyCombination, events: &'a [KeyEvent]) -> Option<(MatchContext, &'a [KeyEvent])> {
        let event = events.first()?;
        let is_control = event.modifiers == KeyModifiers::CONTROL;
        if combo.key == event.code && combo.control == is_control {
            let rest = &events[1..];
            Some((MatchContext::None, rest))
        } else {
            None
        }
    }

    fn try_match_number(mut events: &[KeyEvent]) -> Option<(MatchContext, &[KeyEvent])> {
        let mut number = None;
        while let Some((head, rest)) = events.split_first() {
            let digit = match head.code {
                KeyCode::Char(c) => match c.to_digit(10) {
                    Some(digit) => digit,
                    None => break,
                },
                _ => break,
            };

            let next = number.unwrap_or(0u32).checked_mul(10).and_then(|number| number.checked_add(digit));
            match next {
                Some(n) => {
                    number = Some(n);
                    events = rest;
                }
                // if we overflow we're done
                None => return None,
            }
        }
        number.map(|number| (MatchContext::Number(number), events))
    }

    fn parse(input: &str) -> Result<(Self, &str), KeyBindingParseError> {
        if let Some(input) = input.strip_prefix("<number>") {
            Ok((Self::Number, input))
        } else if let Some(input) = Self::try_match_input(input, &["<c-", "<C-"]) {
            let (key, input) = Self::parse_key_code(input)?;
            let Some(input) = input.strip_prefix('>') else {
                return Err(KeyBindingParseError::InvalidControlSequence);
            };
            let matcher = Self::Key(KeyCombination { key, control: true });
            Ok((matcher, input))
        } else {
            let (key, input) = Self::parse_key_code(input)?;
            let matcher = Self::Key(KeyCombination { key, control: false });
            Ok((matcher, input))
        }
    }

    fn parse_key_code(input: &str) -> Result<(KeyCode, &str), KeyBindingParseError> {
        if let Some(input) = Self::try_match_input(input, &["<PageUp>", "<page_up>"]) {
            Ok((KeyCode::PageUp, input))
        } else if let Some(input) = Self::try_match_input(input, &["<PageDown>", "<page_down>"]) {
            Ok((KeyCode::PageDown, input))
        } else if let Some(input) = Self::try_match_input(input, &["<cr>", "<CR>", "<Enter>", "<enter>"]) {
            Ok((KeyCode::Enter, input))
        } else if let Some(input) = Self::try_match_input(input, &["<Home>", "<home>"]) {
            Ok((KeyCode::Home, input))
        } else if let Some(input) = Self::try_match_input(input, &["<End>", "<end>"]) {
            Ok((KeyCode::End, input))
        } else if let Some(input) = Self::try_match_input(input, &["<Left>", "<left>"]) {
            Ok((KeyCode::Left, input))
        } else if let Some(input) = Self::try_match_input(input, &["<Right>", "<right>"]) {
            Ok((KeyCode::Right, input))
        } else if let Some(input) = Self::try_match_input(input, &["<Up>", "<up>"]) {
            Ok((KeyCode::Up, input))
        } else if let Some(input) = Self::try_match_input(input, &["<Down>", "<down>"]) {
            Ok((KeyCode::Down, input))
        } else if let Some(input) = Self::try_match_input(input, &["<Esc>", "<esc>"]) {
            Ok((KeyCode::Esc, input))
        } else if let Some(input) = Self::try_match_input(input, &["<BackTab>", "<backtab>", "<s-tab>", "<S-Tab>"]) {
            Ok((KeyCode::BackTab, input))
        } else if let Some(input) = Self::try_match_input(input, &["<Tab>", "<tab>"]) {
            Ok((KeyCode::Tab, input))
        } else if let Some(input) = Self::try_match_input(input, &["<Backspace>", "<backspace>"]) {
            Ok((KeyCode::Backspace, input))
        } else if let Some(input) = Self::try_match_input(input, &["<Delete>", "<delete>", "<del>"]) {
            Ok((KeyCode::Delete, input))
        } else if let Some(input) = Self::try_match_input(input, &["<F", "<f"]) {
            let (number, rest) = input.split_once('>').ok_or(KeyBindingParseError::InvalidControlSequence)?;
            let number: u8 = number.parse().map_err(|_| KeyBindingParseError::InvalidControlSequence)?;
            if number == 0 || number > 12 {
                Err(KeyBindingParseError::InvalidControlSequence)
            } else {
                Ok((KeyCode::F(number), rest))
            }
        } else {
            let next = input.chars().next().ok_or(KeyBindingParseError::NoInput)?;
            // don't allow these as they create ambiguity
            if next == '<' || next == '>' {
                Err(KeyBindingParseError::InvalidKey(next))
            } else if next.is_alphanumeric() || next.is_ascii_punctuation() || next == ' ' {
                let key = KeyCode::Char(next);
                Ok((key, &input[next.len_utf8()..]))
            } else {
                Err(KeyBindingParseError::InvalidKey(next))
            }
        }
    }

    fn try_match_input<'a>(input: &'a str, aliases: &[&str]) -> Option<&'a str> {
        for alias in aliases {
            if let Some(input) = input.strip_prefix(alias) {
                return Some(input);
            }
        }
        None
    }
}

impl fmt::Display for KeyMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number => write!(f, "<number>"),
            Self::Key(combo) => {
                if combo.control {
                    write!(f, "<c-")?;
                }
                match combo.key {
                    KeyCode::Char(' ') => write!(f, "' '")?,
                    KeyCode::Char(c) => write!(f, "{c}")?,
                    KeyCode::F(number) => write!(f, "<F{number}>")?,
                    other => write!(f, "<{other:?}>")?,
                };
                if combo.control {
                    write!(f, ">")?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum MatchContext {
    Number(u32),
    None,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd)]
struct KeyCombination {
    key: KeyCode,
    control: bool,
}

impl KeyCombination {
    #[cfg(test)]
    fn char(c: char) -> Self {
        Self { key: KeyCode::Char(c), control: false }
    }

    #[cfg(test)]
    fn control_char(c: char) -> Self {
        Self { key: KeyCode::Char(c), control: true }
    }
}

impl From<KeyCode> for KeyCombination {
    fn from(key: KeyCode) -> Self {
        Self { key, control: false }
    }
}
