//! Camera screen logic, independent of the widget tree.

use std::rc::Rc;
use std::sync::Arc;

use image::RgbaImage;
use log::{debug, warn};

use super::config::AppConfig;
use crate::capture::{
    CaptureError, CaptureResult, CaptureSession, DeviceProvider, PhotoSettings,
};
use crate::crop::crop_to_viewport;
use crate::library::PhotoLibrary;
use crate::preview::{PreviewLayer, Rect, Size};

pub struct CameraController {
    session: CaptureSession,
    preview: PreviewLayer,
    settings: PhotoSettings,
    library: Rc<dyn PhotoLibrary>,
}

impl CameraController {
    /// Start the session for the configured device.
    ///
    /// The device is bound in the background; [`CameraController::tick`]
    /// picks up the result. Setup failures leave an inert controller whose
    /// preview stays blank.
    pub fn open(
        provider: Arc<dyn DeviceProvider>,
        config: &AppConfig,
        library: Rc<dyn PhotoLibrary>,
    ) -> Self {
        let mut session = CaptureSession::new();
        session.start(provider, config.preferred_device.as_deref());

        Self {
            session,
            preview: PreviewLayer::new(Size::default(), config.stream_rotation, config.gravity),
            settings: config.photo,
            library,
        }
    }

    /// Whether the device is bound and accepting captures
    pub fn is_live(&self) -> bool {
        self.session.is_live()
    }

    /// Whether the device is still being set up
    pub fn is_starting(&self) -> bool {
        self.session.is_running() && !self.session.is_live()
    }

    pub fn is_capturing(&self) -> bool {
        self.session.is_capturing()
    }

    pub fn setup_error(&self) -> Option<&CaptureError> {
        self.session.setup_error()
    }

    pub fn preview(&self) -> &PreviewLayer {
        &self.preview
    }

    /// The visible area: the full bounds of the preview widget
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.preview.set_bounds(Rect::new(0.0, 0.0, width, height));
    }

    pub fn latest_frame(&self) -> Option<Arc<RgbaImage>> {
        self.session.latest_frame()
    }

    /// Capture, crop to the viewport and hand the result to the library.
    ///
    /// Fails when the session cannot take a capture right now. Failures after
    /// the capture started abandon the photo silently.
    pub fn capture(&mut self) -> CaptureResult<()> {
        let preview = self.preview;
        let viewport = preview.bounds;
        let library = self.library.clone();

        self.session
            .capture_photo(&self.settings, move |result| {
                let image = match result {
                    Ok(image) => image,
                    Err(e) => {
                        warn!("Photo abandoned: {}", e);
                        return;
                    }
                };

                match crop_to_viewport(&image, &preview, viewport) {
                    Some(cropped) => library.save(cropped),
                    None => warn!("Photo abandoned: viewport {:?} has no crop", viewport),
                }
            })
    }

    /// Apply session events and track the frame size.
    ///
    /// Called from the preview refresh tick on the main thread. Returns how
    /// many capture callbacks ran.
    pub fn tick(&mut self) -> usize {
        let delivered = self.session.poll();

        let stream_size = match self.session.latest_frame() {
            Some(frame) => Some((frame.width(), frame.height())),
            None => self.session.stream_size(),
        };
        if let Some((width, height)) = stream_size {
            let size = Size::from_pixels(width, height);
            if size != self.preview.stream_size {
                debug!("Stream size now {}x{}", width, height);
                self.preview.stream_size = size;
            }
        }

        delivered
    }

    pub fn close(&mut self) {
        self.session.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::session::tests::{FakeBehavior, FakeProvider};
    use crate::capture::Orientation;
    use crate::library::tests::RecordingLibrary;
    use std::thread;
    use std::time::{Duration, Instant};

    fn config() -> AppConfig {
        AppConfig {
            frame_interval: Duration::from_millis(5),
            ..AppConfig::default()
        }
    }

    /// Open and tick until the session is live or has failed
    fn open_settled(
        provider: FakeProvider,
        config: &AppConfig,
        library: Rc<RecordingLibrary>,
    ) -> CameraController {
        let mut controller = CameraController::open(Arc::new(provider), config, library);
        let deadline = Instant::now() + Duration::from_secs(2);
        while controller.is_starting() && Instant::now() < deadline {
            controller.tick();
            thread::sleep(Duration::from_millis(5));
        }
        controller
    }

    fn tick_until_delivered(controller: &mut CameraController) -> usize {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            let delivered = controller.tick();
            if delivered > 0 || Instant::now() > deadline {
                return delivered;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_capture_saves_cropped_photo() {
        let library = Rc::new(RecordingLibrary::default());
        let mut controller =
            open_settled(FakeProvider::working(400, 300), &config(), library.clone());
        assert!(controller.is_live());
        assert_eq!(controller.preview().stream_size, Size::new(400.0, 300.0));
        controller.set_viewport(300.0, 300.0);

        controller.capture().unwrap();
        assert!(controller.is_capturing());
        assert_eq!(tick_until_delivered(&mut controller), 1);
        assert!(!controller.is_capturing());

        let saved = library.saved.borrow();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].pixels.dimensions(), (300, 300));
        assert_eq!(saved[0].orientation, Orientation::Up);

        drop(saved);
        controller.close();
        assert!(!controller.is_live());
    }

    #[test]
    fn test_open_returns_while_device_warms_up() {
        let library = Rc::new(RecordingLibrary::default());
        let mut provider = FakeProvider::working(40, 30);
        provider.open_delay = Duration::from_millis(500);

        let begun = Instant::now();
        let mut controller = CameraController::open(Arc::new(provider), &config(), library);
        assert!(begun.elapsed() < Duration::from_millis(250));

        assert!(controller.is_starting());
        assert!(controller.setup_error().is_none());
        assert!(controller.preview().stream_size.is_empty());
        assert_eq!(controller.capture(), Err(CaptureError::SessionClosed));

        let deadline = Instant::now() + Duration::from_secs(2);
        while !controller.is_live() && Instant::now() < deadline {
            controller.tick();
            thread::sleep(Duration::from_millis(5));
        }
        assert!(controller.is_live());
        assert_eq!(controller.preview().stream_size, Size::new(40.0, 30.0));
    }

    #[test]
    fn test_rotated_stream_crop() {
        let library = Rc::new(RecordingLibrary::default());
        let mut provider = FakeProvider::working(40, 20);
        provider.orientation = Orientation::Right;
        let config = AppConfig {
            stream_rotation: Orientation::Right,
            ..config()
        };

        let mut controller = open_settled(provider, &config, library.clone());
        controller.set_viewport(20.0, 40.0);

        controller.capture().unwrap();
        assert_eq!(tick_until_delivered(&mut controller), 1);

        let saved = library.saved.borrow();
        assert_eq!(saved[0].pixels.dimensions(), (40, 20));
        assert_eq!(saved[0].orientation, Orientation::Right);
        assert_eq!(saved[0].to_display_pixels().dimensions(), (20, 40));
    }

    #[test]
    fn test_no_camera_is_inert() {
        let library = Rc::new(RecordingLibrary::default());
        let mut controller = open_settled(FakeProvider::empty(), &config(), library.clone());

        assert!(!controller.is_live());
        assert!(!controller.is_starting());
        assert_eq!(controller.setup_error(), Some(&CaptureError::NoDevice));
        assert!(controller.latest_frame().is_none());

        controller.set_viewport(300.0, 300.0);
        assert_eq!(controller.capture(), Err(CaptureError::SessionClosed));
        assert_eq!(controller.tick(), 0);
        assert!(library.saved.borrow().is_empty());

        controller.close();
    }

    #[test]
    fn test_capture_failure_saves_nothing() {
        let library = Rc::new(RecordingLibrary::default());
        let mut controller = open_settled(
            FakeProvider::working(8, 8).with_behavior(FakeBehavior::CaptureFails),
            &config(),
            library.clone(),
        );
        controller.set_viewport(8.0, 8.0);

        controller.capture().unwrap();
        assert_eq!(tick_until_delivered(&mut controller), 1);
        assert!(library.saved.borrow().is_empty());
    }

    #[test]
    fn test_empty_viewport_saves_nothing() {
        let library = Rc::new(RecordingLibrary::default());
        let mut controller = open_settled(FakeProvider::working(8, 8), &config(), library.clone());
        // Never laid out: zero-sized viewport

        controller.capture().unwrap();
        assert_eq!(tick_until_delivered(&mut controller), 1);
        assert!(library.saved.borrow().is_empty());
    }
}
