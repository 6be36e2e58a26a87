//! purrview: vote on, favorite and browse cat pictures from your terminal.
//!
//! This is not meant to be used as a crate!

pub(crate) mod api;
pub(crate) mod app;
pub(crate) mod commands;
pub(crate) mod config;
pub mod logging;
pub(crate) mod session;
pub(crate) mod slideshow;
pub(crate) mod style;
pub(crate) mod terminal;
pub(crate) mod ui;

pub use crate::{
    api::{ApiClient, ApiError, HttpApiClient},
    app::{App, AppError},
    config::{Config, ConfigLoadError, ImageProtocol},
    terminal::GraphicsMode,
};
