use crate::{
    commands::keyboard::KeyBinding,
    style::Color,
    terminal::{emulator::TerminalEmulator, GraphicsMode},
};
use clap::ValueEnum;
use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Where the backend lives.
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub slideshow: SlideshowConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub theme: ThemeConfig,

    #[serde(default)]
    pub bindings: KeyBindingsConfig,
}

impl Config {
    /// Load the config from a path.
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(ConfigLoadError::NotFound),
            Err(e) => return Err(e.into()),
        };
        let config: Self = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.slideshow.interval == 0 {
            return Err(ConfigLoadError::OutOfRange("slideshow.interval"));
        }
        if self.slideshow.image_limit == 0 {
            return Err(ConfigLoadError::OutOfRange("slideshow.image_limit"));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("config file not found")]
    NotFound,

    #[error("invalid configuration: {0}")]
    Invalid(#[from] serde_yaml::Error),

    #[error("{0} must be greater than zero")]
    OutOfRange(&'static str),
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// The base URL of the backend.
    #[serde(default = "default_server_url")]
    pub url: String,

    /// The number of seconds to wait for a request before giving up.
    ///
    /// Requests wait forever when this isn't set.
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl ServerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { url: default_server_url(), timeout: None }
    }
}

fn default_server_url() -> String {
    "http://localhost:8080".into()
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
    /// The image protocol to use.
    #[serde(default)]
    pub image_protocol: ImageProtocol,
}

#[derive(Clone, Debug, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ImageProtocol {
    /// Automatically detect the best image protocol to use.
    #[default]
    Auto,

    /// Use the iTerm2 image protocol.
    Iterm2,

    /// Draw images using colored half blocks.
    AsciiBlocks,
}

impl From<&ImageProtocol> for GraphicsMode {
    fn from(protocol: &ImageProtocol) -> Self {
        match protocol {
            ImageProtocol::Auto => TerminalEmulator::detect().preferred_protocol(),
            ImageProtocol::Iterm2 => GraphicsMode::Iterm2,
            ImageProtocol::AsciiBlocks => GraphicsMode::AsciiBlocks,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlideshowConfig {
    /// The number of milliseconds each breed image is shown for.
    #[serde(default = "default_slideshow_interval")]
    pub interval: u64,

    /// The maximum number of images to fetch for a breed.
    #[serde(default = "default_image_limit")]
    pub image_limit: u32,

    /// Whether picking an image manually restarts the countdown to the next one.
    #[serde(default)]
    pub restart_on_select: bool,
}

impl SlideshowConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval)
    }
}

impl Default for SlideshowConfig {
    fn default() -> Self {
        Self { interval: default_slideshow_interval(), image_limit: default_image_limit(), restart_on_select: false }
    }
}

fn default_slideshow_interval() -> u64 {
    3000
}

fn default_image_limit() -> u32 {
    8
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// The file to write logs to.
    ///
    /// Defaults to `purrview.log` in the cache directory.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// The log filter, using `tracing_subscriber`'s `EnvFilter` syntax.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { path: None, level: default_log_level() }
    }
}

fn default_log_level() -> String {
    "info".into()
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThemeConfig {
    /// The color of the active tab, list cursors and the active slide indicator.
    #[serde(default = "default_accent_color")]
    pub(crate) accent: Color,

    /// The color of upvotes in the vote history.
    #[serde(default = "default_positive_color")]
    pub(crate) upvote: Color,

    /// The color of downvotes in the vote history.
    #[serde(default = "default_negative_color")]
    pub(crate) downvote: Color,

    /// The color of notifications for actions that worked.
    #[serde(default = "default_positive_color")]
    pub(crate) success: Color,

    /// The color of notifications for actions that failed.
    #[serde(default = "default_negative_color")]
    pub(crate) error: Color,

    /// The color of secondary text like key hints.
    #[serde(default = "default_muted_color")]
    pub(crate) muted: Color,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            accent: default_accent_color(),
            upvote: default_positive_color(),
            downvote: default_negative_color(),
            success: default_positive_color(),
            error: default_negative_color(),
            muted: default_muted_color(),
        }
    }
}

fn default_accent_color() -> Color {
    Color::Cyan
}

fn default_positive_color() -> Color {
    Color::Green
}

fn default_negative_color() -> Color {
    Color::Red
}

fn default_muted_color() -> Color {
    Color::DarkGrey
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyBindingsConfig {
    /// The keys that move to the next tab.
    #[serde(default = "default_next_tab_bindings")]
    pub(crate) next_tab: Vec<KeyBinding>,

    /// The keys that move to the previous tab.
    #[serde(default = "default_previous_tab_bindings")]
    pub(crate) previous_tab: Vec<KeyBinding>,

    #[serde(default = "default_show_voting_bindings")]
    pub(crate) show_voting: Vec<KeyBinding>,

    #[serde(default = "default_show_breeds_bindings")]
    pub(crate) show_breeds: Vec<KeyBinding>,

    #[serde(default = "default_show_favorites_bindings")]
    pub(crate) show_favorites: Vec<KeyBinding>,

    #[serde(default = "default_show_history_bindings")]
    pub(crate) show_history: Vec<KeyBinding>,

    /// The keys that vote the current cat up.
    #[serde(default = "default_vote_up_bindings")]
    pub(crate) vote_up: Vec<KeyBinding>,

    /// The keys that vote the current cat down.
    #[serde(default = "default_vote_down_bindings")]
    pub(crate) vote_down: Vec<KeyBinding>,

    /// The keys that add the current cat to the favorites.
    #[serde(default = "default_favorite_bindings")]
    pub(crate) favorite: Vec<KeyBinding>,

    /// The keys that move the list cursor down.
    #[serde(default = "default_next_item_bindings")]
    pub(crate) next_item: Vec<KeyBinding>,

    /// The keys that move the list cursor up.
    #[serde(default = "default_previous_item_bindings")]
    pub(crate) previous_item: Vec<KeyBinding>,

    /// The keys that open the breed under the cursor.
    #[serde(default = "default_confirm_bindings")]
    pub(crate) confirm: Vec<KeyBinding>,

    /// The keys that remove the favorite under the cursor.
    #[serde(default = "default_remove_bindings")]
    pub(crate) remove: Vec<KeyBinding>,

    /// The keys that show the next slideshow image.
    #[serde(default = "default_next_slide_bindings")]
    pub(crate) next_slide: Vec<KeyBinding>,

    /// The keys that show the previous slideshow image.
    #[serde(default = "default_previous_slide_bindings")]
    pub(crate) previous_slide: Vec<KeyBinding>,

    /// The key binding to jump to a specific slideshow image.
    #[serde(default = "default_select_slide_bindings")]
    pub(crate) select_slide: Vec<KeyBinding>,

    /// The keys that reload the current tab.
    #[serde(default = "default_refresh_bindings")]
    pub(crate) refresh: Vec<KeyBinding>,

    /// The key binding to close the application.
    #[serde(default = "default_exit_bindings")]
    pub(crate) exit: Vec<KeyBinding>,

    /// The key binding to suspend the application.
    #[serde(default = "default_suspend_bindings")]
    pub(crate) suspend: Vec<KeyBinding>,
}

impl KeyBindingsConfig {
    /// The bindings for every command, along with the name they're configured under.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[KeyBinding])> {
        [
            ("next_tab", self.next_tab.as_slice()),
            ("previous_tab", self.previous_tab.as_slice()),
            ("show_voting", self.show_voting.as_slice()),
            ("show_breeds", self.show_breeds.as_slice()),
            ("show_favorites", self.show_favorites.as_slice()),
            ("show_history", self.show_history.as_slice()),
            ("vote_up", self.vote_up.as_slice()),
            ("vote_down", self.vote_down.as_slice()),
            ("favorite", self.favorite.as_slice()),
            ("next_item", self.next_item.as_slice()),
            ("previous_item", self.previous_item.as_slice()),
            ("confirm", self.confirm.as_slice()),
            ("remove", self.remove.as_slice()),
            ("next_slide", self.next_slide.as_slice()),
            ("previous_slide", self.previous_slide.as_slice()),
            ("select_slide", self.select_slide.as_slice()),
            ("refresh", self.refresh.as_slice()),
            ("exit", self.exit.as_slice()),
            ("suspend", self.suspend.as_slice()),
        ]
        .into_iter()
    }
}

impl Default for KeyBindingsConfig {
    fn default() -> Self {
        Self {
            next_tab: default_next_tab_bindings(),
            previous_tab: default_previous_tab_bindings(),
            show_voting: default_show_voting_bindings(),
            show_breeds: default_show_breeds_bindings(),
            show_favorites: default_show_favorites_bindings(),
            show_history: default_show_history_bindings(),
            vote_up: default_vote_up_bindings(),
            vote_down: default_vote_down_bindings(),
            favorite: default_favorite_bindings(),
            next_item: default_next_item_bindings(),
            previous_item: default_previous_item_bindings(),
            confirm: default_confirm_bindings(),
            remove: default_remove_bindings(),
            next_slide: default_next_slide_bindings(),
            previous_slide: default_previous_slide_bindings(),
            select_slide: default_select_slide_bindings(),
            refresh: default_refresh_bindings(),
            exit: default_exit_bindings(),
            suspend: default_suspend_bindings(),
        }
    }
}

fn make_keybindings<const N: usize>(raw_bindings: [&str; N]) -> Vec<KeyBinding> {
    let mut bindings = Vec::new();
    for binding in raw_bindings {
        bindings.push(binding.parse().expect("invalid binding"));
    }
    bindings
}

fn default_next_tab_bindings() -> Vec<KeyBinding> {
    make_keybindings(["<tab>"])
}

fn default_previous_tab_bindings() -> Vec<KeyBinding> {
    make_keybindings(["<backtab>"])
}

fn default_show_voting_bindings() -> Vec<KeyBinding> {
    make_keybindings(["<F1>"])
}

fn default_show_breeds_bindings() -> Vec<KeyBinding> {
    make_keybindings(["<F2>"])
}

fn default_show_favorites_bindings() -> Vec<KeyBinding> {
    make_keybindings(["<F3>"])
}

fn default_show_history_bindings() -> Vec<KeyBinding> {
    make_keybindings(["<F4>"])
}

fn default_vote_up_bindings() -> Vec<KeyBinding> {
    make_keybindings(["+", "u"])
}

fn default_vote_down_bindings() -> Vec<KeyBinding> {
    make_keybindings(["-", "d"])
}

fn default_favorite_bindings() -> Vec<KeyBinding> {
    make_keybindings(["f"])
}

fn default_next_item_bindings() -> Vec<KeyBinding> {
    make_keybindings(["j", "<down>"])
}

fn default_previous_item_bindings() -> Vec<KeyBinding> {
    make_keybindings(["k", "<up>"])
}

fn default_confirm_bindings() -> Vec<KeyBinding> {
    make_keybindings(["<enter>"])
}

fn default_remove_bindings() -> Vec<KeyBinding> {
    make_keybindings(["x", "<del>"])
}

fn default_next_slide_bindings() -> Vec<KeyBinding> {
    make_keybindings(["l", "<right>"])
}

fn default_previous_slide_bindings() -> Vec<KeyBinding> {
    make_keybindings(["h", "<left>"])
}

fn default_select_slide_bindings() -> Vec<KeyBinding> {
    make_keybindings(["<number>G"])
}

fn default_refresh_bindings() -> Vec<KeyBinding> {
    make_keybindings(["<c-r>"])
}

fn default_exit_bindings() -> Vec<KeyBinding> {
    make_keybindings(["<c-c>", "q"])
}

fn default_suspend_bindings() -> Vec<KeyBinding> {
    make_keybindings(["<c-z>"])
}
