//! Application state types
//!
//! Navigation between the landing screen and the camera screen, and
//! ownership of the camera controller while the camera screen is shown.

use log::debug;
use std::rc::Rc;
use std::sync::Arc;

use super::config::{AppConfig, ShortcutConfig};
use super::controller::CameraController;
use crate::capture::DeviceProvider;
use crate::library::PhotoLibrary;

/// Which screen is showing
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    /// Landing screen with the camera button
    #[default]
    Viewing,
    /// Camera screen on top of the landing screen
    PresentingCamera,
    /// Camera screen closed; back on the landing screen
    Dismissed,
}

/// Main application state
pub struct AppState {
    pub screen: Screen,
    pub config: AppConfig,
    pub shortcuts: ShortcutConfig,
    /// Present only while the camera screen is showing
    pub camera: Option<CameraController>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            screen: Screen::Viewing,
            config,
            shortcuts: ShortcutConfig::default(),
            camera: None,
        }
    }

    pub fn is_camera_presented(&self) -> bool {
        self.screen == Screen::PresentingCamera
    }

    /// Open the camera screen and start its session.
    ///
    /// Returns `false` if the camera screen is already showing.
    pub fn present_camera(
        &mut self,
        provider: Arc<dyn DeviceProvider>,
        library: Rc<dyn PhotoLibrary>,
    ) -> bool {
        if self.is_camera_presented() {
            return false;
        }

        debug!("Presenting camera screen");
        self.camera = Some(CameraController::open(provider, &self.config, library));
        self.screen = Screen::PresentingCamera;
        true
    }

    /// Close the camera screen, stopping its session.
    ///
    /// Returns `false` if the camera screen was not showing.
    pub fn dismiss_camera(&mut self) -> bool {
        if !self.is_camera_presented() {
            return false;
        }

        debug!("Dismissing camera screen");
        if let Some(mut camera) = self.camera.take() {
            camera.close();
        }
        self.screen = Screen::Dismissed;
        true
    }
}
