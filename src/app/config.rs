use gtk::gdk;
use gtk4 as gtk;
use log::warn;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::capture::{FlashMode, Orientation, PhotoSettings};
use crate::library::{OutputFormat, PicturesLibrary};
use crate::preview::VideoGravity;

pub const ENV_DEVICE: &str = "VIEWCAM_DEVICE";
pub const ENV_SAVE_DIR: &str = "VIEWCAM_SAVE_DIR";
pub const ENV_FORMAT: &str = "VIEWCAM_FORMAT";
pub const ENV_GRAVITY: &str = "VIEWCAM_GRAVITY";
pub const ENV_FLASH: &str = "VIEWCAM_FLASH";

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Camera to bind by name; the first device is used when unset or missing
    pub preferred_device: Option<String>,
    /// Scaling policy of the preview (and of the crop that inverts it)
    pub gravity: VideoGravity,
    /// How device frames are rotated for display
    pub stream_rotation: Orientation,
    pub photo: PhotoSettings,
    pub save_dir: PathBuf,
    pub output_format: OutputFormat,
    /// Preview refresh and capture delivery interval
    pub frame_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            preferred_device: None,
            gravity: VideoGravity::ResizeAspectFill,
            stream_rotation: Orientation::Up,
            photo: PhotoSettings::default(),
            save_dir: PicturesLibrary::default_directory(),
            output_format: OutputFormat::Jpeg,
            frame_interval: Duration::from_millis(33),
        }
    }
}

impl AppConfig {
    /// Defaults with `VIEWCAM_*` environment overrides applied
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(device) = lookup(ENV_DEVICE).filter(|d| !d.trim().is_empty()) {
            self.preferred_device = Some(device.trim().to_string());
        }

        if let Some(dir) = lookup(ENV_SAVE_DIR).filter(|d| !d.trim().is_empty()) {
            self.save_dir = PathBuf::from(dir);
        }

        if let Some(label) = lookup(ENV_FORMAT) {
            match OutputFormat::from_label(&label) {
                Some(format) => self.output_format = format,
                None => warn!("Ignoring unknown {} value '{}'", ENV_FORMAT, label),
            }
        }

        if let Some(label) = lookup(ENV_GRAVITY) {
            match VideoGravity::from_label(&label) {
                Some(gravity) => self.gravity = gravity,
                None => warn!("Ignoring unknown {} value '{}'", ENV_GRAVITY, label),
            }
        }

        if let Some(label) = lookup(ENV_FLASH) {
            match FlashMode::from_label(&label) {
                Some(mode) => self.photo.flash_mode = mode,
                None => warn!("Ignoring unknown {} value '{}'", ENV_FLASH, label),
            }
        }

        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    OpenCamera,
    Capture,
    Close,
}

#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: gdk::Key,
    pub modifiers: gdk::ModifierType,
}

#[derive(Debug, Clone)]
pub struct ShortcutConfig {
    bindings: HashMap<Action, Vec<Shortcut>>,
}

impl Default for ShortcutConfig {
    fn default() -> Self {
        let mut bindings = HashMap::new();

        bindings.insert(
            Action::OpenCamera,
            vec![Shortcut {
                key: gdk::Key::n,
                modifiers: gdk::ModifierType::CONTROL_MASK,
            }],
        );
        bindings.insert(
            Action::Capture,
            vec![
                Shortcut {
                    key: gdk::Key::space,
                    modifiers: gdk::ModifierType::empty(),
                },
                Shortcut {
                    key: gdk::Key::Return,
                    modifiers: gdk::ModifierType::empty(),
                },
            ],
        );
        bindings.insert(
            Action::Close,
            vec![Shortcut {
                key: gdk::Key::Escape,
                modifiers: gdk::ModifierType::empty(),
            }],
        );

        Self { bindings }
    }
}

impl ShortcutConfig {
    pub fn get_action(&self, key: gdk::Key, modifiers: gdk::ModifierType) -> Option<Action> {
        // Filter out irrelevant modifiers like NumLock/CapsLock/ScrollLock
        let mask = gdk::ModifierType::CONTROL_MASK
            | gdk::ModifierType::SHIFT_MASK
            | gdk::ModifierType::ALT_MASK
            | gdk::ModifierType::SUPER_MASK
            | gdk::ModifierType::META_MASK;

        let clean_mods = modifiers & mask;
        // Keypad Enter behaves like Return
        let key = if key == gdk::Key::KP_Enter {
            gdk::Key::Return
        } else {
            key
        };

        self.bindings.iter().find_map(|(action, shortcuts)| {
            shortcuts
                .iter()
                .any(|sc| sc.key == key && sc.modifiers == clean_mods)
                .then_some(*action)
        })
    }
}
