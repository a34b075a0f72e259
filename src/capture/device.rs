//! Camera device abstraction.
//!
//! A [`DeviceProvider`] enumerates devices and constructs their inputs.
//! Devices themselves are not required to be `Send`: the session constructs
//! and drives them on its own worker thread.

use image::RgbaImage;

use super::orientation::Orientation;

/// How a backend addresses a device: by number, or by a path or
/// identifier string on backends that enumerate that way
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceId {
    Index(u32),
    Path(String),
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(index) => write!(f, "#{}", index),
            Self::Path(path) => write!(f, "{}", path),
        }
    }
}

/// Information about a capture device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub id: DeviceId,
    pub name: String,
    pub description: String,
}

impl DeviceInfo {
    pub fn display_label(&self) -> String {
        if self.description.is_empty() {
            format!("{} ({})", self.name, self.id)
        } else {
            format!("{} ({})", self.name, self.description)
        }
    }
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlashMode {
    Off,
    On,
    #[default]
    Auto,
}

impl FlashMode {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "off" => Some(FlashMode::Off),
            "on" => Some(FlashMode::On),
            "auto" => Some(FlashMode::Auto),
            _ => None,
        }
    }
}

/// Settings applied to a single still capture
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhotoSettings {
    pub flash_mode: FlashMode,
    /// JPEG quality used when the device encodes the still (1-100)
    pub jpeg_quality: u8,
}

impl Default for PhotoSettings {
    fn default() -> Self {
        Self {
            flash_mode: FlashMode::Auto,
            jpeg_quality: 90,
        }
    }
}

/// Encoded still photo as delivered by a device
#[derive(Debug, Clone)]
pub struct RawPhoto {
    pub data: Vec<u8>,
    /// Orientation reported by the device; when absent the EXIF tag is used
    pub orientation: Option<Orientation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    NoDevice,

    InputFailed(String),

    OutputFailed(String),

    CaptureFailed(String),

    DecodeFailed(String),

    SessionClosed,

    Busy,
}

impl std::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDevice => write!(f, "No camera device available"),
            Self::InputFailed(msg) => write!(f, "Failed to open camera input: {}", msg),
            Self::OutputFailed(msg) => write!(f, "Failed to attach photo output: {}", msg),
            Self::CaptureFailed(msg) => write!(f, "Failed to capture photo: {}", msg),
            Self::DecodeFailed(msg) => write!(f, "Failed to decode photo: {}", msg),
            Self::SessionClosed => write!(f, "Capture session is not running"),
            Self::Busy => write!(f, "A capture is already in progress"),
        }
    }
}

impl std::error::Error for CaptureError {}

pub type CaptureResult<T> = Result<T, CaptureError>;

/// An opened camera input
pub trait CameraDevice {
    /// Frame size in storage order
    fn resolution(&self) -> (u32, u32);

    /// Attach the still-photo output and start streaming
    fn attach_photo_output(&mut self) -> CaptureResult<()>;

    /// Next preview frame
    fn next_frame(&mut self) -> CaptureResult<RgbaImage>;

    fn capture_photo(&mut self, settings: &PhotoSettings) -> CaptureResult<RawPhoto>;

    fn close(&mut self);
}

/// Enumerates devices and constructs their inputs
pub trait DeviceProvider: Send + Sync {
    fn devices(&self) -> CaptureResult<Vec<DeviceInfo>>;

    fn open(&self, info: &DeviceInfo) -> CaptureResult<Box<dyn CameraDevice>>;

    /// Device named `preferred`, falling back to the first one
    fn select(&self, preferred: Option<&str>) -> CaptureResult<DeviceInfo> {
        let devices = self.devices()?;

        if let Some(name) = preferred {
            if let Some(info) = devices.iter().find(|d| d.name == name) {
                return Ok(info.clone());
            }
            log::debug!("Preferred device '{}' not found, using default", name);
        }

        devices.into_iter().next().ok_or(CaptureError::NoDevice)
    }
}
