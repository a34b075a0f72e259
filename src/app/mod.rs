//! Application module
//!
//! This module contains the application state, configuration and the
//! toolkit-independent camera screen logic.

pub mod config;
pub mod controller;
mod state;

#[allow(unused_imports)]
pub use config::{Action, AppConfig, ShortcutConfig};
#[allow(unused_imports)]
pub use controller::CameraController;
#[allow(unused_imports)]
pub use state::{AppState, Screen};
