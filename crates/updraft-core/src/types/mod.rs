//! Type definitions for Updraft configuration and platforms

mod platform;
mod updater_config;

pub use platform::*;
pub use updater_config::*;
