pub mod app;
pub mod config;
pub mod connection;
pub mod edid;
pub mod error;
pub mod identity;
pub mod logging;
pub mod models;
pub mod monitor;
pub mod placement;
pub mod settings;
pub mod toggle;

#[cfg(windows)]
pub mod platform;
#[cfg(windows)]
pub mod ui;

pub use error::{Error, Result};
