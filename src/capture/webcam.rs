//! Webcam backend on top of nokhwa.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage, RgbaImage};
use log::debug;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;

use super::device::{
    CameraDevice, CaptureError, CaptureResult, DeviceId, DeviceInfo, DeviceProvider, FlashMode,
    PhotoSettings, RawPhoto,
};
use super::orientation::Orientation;

/// Provider for the platform's native camera API
#[derive(Debug, Default, Clone, Copy)]
pub struct WebcamProvider {
    /// Orientation tag given to stills, matching how frames are displayed
    rotation: Orientation,
}

impl WebcamProvider {
    pub fn new(rotation: Orientation) -> Self {
        Self { rotation }
    }
}

impl DeviceProvider for WebcamProvider {
    fn devices(&self) -> CaptureResult<Vec<DeviceInfo>> {
        let cameras = nokhwa::query(ApiBackend::Auto)
            .map_err(|e| CaptureError::InputFailed(format!("Failed to query cameras: {}", e)))?;

        Ok(cameras
            .iter()
            .map(|camera| DeviceInfo {
                id: device_id(camera.index()),
                name: camera.human_name(),
                description: camera.description().to_string(),
            })
            .collect())
    }

    fn open(&self, info: &DeviceInfo) -> CaptureResult<Box<dyn CameraDevice>> {
        let requested =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);
        let camera = Camera::new(camera_index(&info.id), requested)
            .map_err(|e| CaptureError::InputFailed(e.to_string()))?;

        Ok(Box::new(Webcam {
            name: info.name.clone(),
            camera,
            rotation: self.rotation,
        }))
    }
}

fn device_id(index: &CameraIndex) -> DeviceId {
    match index {
        CameraIndex::Index(index) => DeviceId::Index(*index),
        CameraIndex::String(path) => DeviceId::Path(path.clone()),
    }
}

fn camera_index(id: &DeviceId) -> CameraIndex {
    match id {
        DeviceId::Index(index) => CameraIndex::Index(*index),
        DeviceId::Path(path) => CameraIndex::String(path.clone()),
    }
}

pub struct Webcam {
    name: String,
    camera: Camera,
    rotation: Orientation,
}

impl Webcam {
    fn grab_rgb(&mut self) -> CaptureResult<RgbImage> {
        let buffer = self
            .camera
            .frame()
            .map_err(|e| CaptureError::CaptureFailed(e.to_string()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CaptureError::DecodeFailed(e.to_string()))?;

        let (width, height) = (decoded.width(), decoded.height());
        RgbImage::from_raw(width, height, decoded.into_raw()).ok_or_else(|| {
            CaptureError::DecodeFailed(format!("Frame buffer does not match {}x{}", width, height))
        })
    }
}

impl CameraDevice for Webcam {
    fn resolution(&self) -> (u32, u32) {
        let resolution = self.camera.resolution();
        (resolution.width(), resolution.height())
    }

    fn attach_photo_output(&mut self) -> CaptureResult<()> {
        self.camera
            .open_stream()
            .map_err(|e| CaptureError::OutputFailed(e.to_string()))
    }

    fn next_frame(&mut self) -> CaptureResult<RgbaImage> {
        let frame = self.grab_rgb()?;
        Ok(DynamicImage::ImageRgb8(frame).to_rgba8())
    }

    fn capture_photo(&mut self, settings: &PhotoSettings) -> CaptureResult<RawPhoto> {
        if settings.flash_mode != FlashMode::Off {
            debug!("{} has no flash, ignoring {:?}", self.name, settings.flash_mode);
        }

        let frame = self.grab_rgb()?;
        let mut data = Vec::new();
        let quality = settings.jpeg_quality.clamp(1, 100);
        JpegEncoder::new_with_quality(&mut Cursor::new(&mut data), quality)
            .encode_image(&frame)
            .map_err(|e| CaptureError::CaptureFailed(e.to_string()))?;

        Ok(RawPhoto {
            data,
            orientation: Some(self.rotation),
        })
    }

    fn close(&mut self) {
        if let Err(e) = self.camera.stop_stream() {
            debug!("Failed to stop {}: {}", self.name, e);
        }
    }
}
