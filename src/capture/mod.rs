//! Capture module: camera devices, the capture session and photo decoding
//!
//! Devices are reached through the [`DeviceProvider`] / [`CameraDevice`]
//! traits; [`WebcamProvider`] implements them with nokhwa.

pub mod device;
pub mod orientation;
pub mod photo;
pub mod session;
pub mod webcam;

#[allow(unused_imports)]
pub use device::{
    CameraDevice, CaptureError, CaptureResult, DeviceId, DeviceInfo, DeviceProvider, FlashMode,
    PhotoSettings, RawPhoto,
};
pub use orientation::Orientation;
#[allow(unused_imports)]
pub use photo::{decode_photo, CapturedImage};
pub use session::CaptureSession;
pub use webcam::WebcamProvider;
