//! Capture session: one device input and one still-photo output driven on a
//! worker thread.
//!
//! Device selection, input construction and output attachment all happen on
//! the worker, so [`CaptureSession::start`] returns immediately. The worker
//! publishes preview frames into a shared slot and reports setup results and
//! finished captures as events. [`CaptureSession::poll`], called from the UI
//! refresh tick, applies those events, so callbacks always run on the GTK
//! main thread.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use image::RgbaImage;
use log::{debug, info, warn};

use super::device::{
    CameraDevice, CaptureError, CaptureResult, DeviceInfo, DeviceProvider, PhotoSettings,
};
use super::photo::{decode_photo, CapturedImage};

/// Pause after a failed frame grab before trying again
const FRAME_RETRY_DELAY: Duration = Duration::from_millis(10);

pub type CaptureCallback = Box<dyn FnOnce(CaptureResult<CapturedImage>)>;

type FrameSlot = Arc<Mutex<Option<Arc<RgbaImage>>>>;

enum Command {
    Capture { id: u64, settings: PhotoSettings },
    Stop,
}

enum Event {
    Ready {
        device: DeviceInfo,
        stream_size: (u32, u32),
    },
    SetupFailed(CaptureError),
    Captured {
        id: u64,
        result: CaptureResult<CapturedImage>,
    },
}

struct Worker {
    commands: Sender<Command>,
    events: Receiver<Event>,
    /// Known once the worker reports its device ready
    stream_size: Option<(u32, u32)>,
}

pub struct CaptureSession {
    worker: Option<Worker>,
    setup_error: Option<CaptureError>,
    latest_frame: FrameSlot,
    /// The capture in flight, if any. At most one is allowed.
    pending: Option<(u64, CaptureCallback)>,
    next_id: u64,
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSession {
    /// An inert session
    pub fn new() -> Self {
        Self {
            worker: None,
            setup_error: None,
            latest_frame: Arc::new(Mutex::new(None)),
            pending: None,
            next_id: 0,
        }
    }

    /// Begin binding a device and start the feed.
    ///
    /// Returns without waiting for the device. The outcome arrives through
    /// [`CaptureSession::poll`]: the session either goes live or becomes
    /// inert with the failure kept in [`CaptureSession::setup_error`].
    pub fn start(&mut self, provider: Arc<dyn DeviceProvider>, preferred_device: Option<&str>) {
        if self.is_running() {
            debug!("Capture session already running");
            return;
        }

        let (command_tx, command_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let latest_frame: FrameSlot = Arc::new(Mutex::new(None));
        let worker_frame = latest_frame.clone();
        let preferred_device = preferred_device.map(str::to_string);

        let spawned = thread::Builder::new()
            .name("camera-session".to_string())
            .spawn(move || {
                let mut camera = match open_device(provider.as_ref(), preferred_device.as_deref())
                {
                    Ok((device, mut camera)) => {
                        let stream_size = camera.resolution();
                        if event_tx.send(Event::Ready { device, stream_size }).is_err() {
                            camera.close();
                            return;
                        }
                        camera
                    }
                    Err(e) => {
                        let _ = event_tx.send(Event::SetupFailed(e));
                        return;
                    }
                };

                run_worker(camera.as_mut(), &command_rx, &event_tx, &worker_frame);
                camera.close();
                debug!("Camera worker exited");
            });

        match spawned {
            Ok(_) => {
                debug!("Camera session starting");
                self.setup_error = None;
                self.latest_frame = latest_frame;
                self.worker = Some(Worker {
                    commands: command_tx,
                    events: event_rx,
                    stream_size: None,
                });
            }
            Err(e) => {
                let error = CaptureError::InputFailed(format!("Failed to spawn worker: {}", e));
                warn!("Camera session not started: {}", error);
                self.setup_error = Some(error);
            }
        }
    }

    /// Halt the feed. Safe to call on an inert or already stopped session.
    ///
    /// Does not wait for the worker: it finishes the frame it is grabbing,
    /// then closes the device on its own.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        let _ = worker.commands.send(Command::Stop);

        // Deliver a capture that finished before the stop
        while let Ok(event) = worker.events.try_recv() {
            if let Event::Captured { id, result } = event {
                self.complete(id, result);
            }
        }
        if self.pending.take().is_some() {
            debug!("Discarding capture that was in flight at stop");
        }

        // The worker keeps the old slot until it exits
        self.latest_frame = Arc::new(Mutex::new(None));
        info!("Camera session stopped");
    }

    /// Whether a worker exists, starting up or live
    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Whether the device is bound and accepting captures
    pub fn is_live(&self) -> bool {
        self.stream_size().is_some()
    }

    pub fn setup_error(&self) -> Option<&CaptureError> {
        self.setup_error.as_ref()
    }

    /// Frame size in storage order, once a device is bound
    pub fn stream_size(&self) -> Option<(u32, u32)> {
        self.worker.as_ref().and_then(|w| w.stream_size)
    }

    pub fn latest_frame(&self) -> Option<Arc<RgbaImage>> {
        self.latest_frame.lock().ok().and_then(|slot| slot.clone())
    }

    pub fn is_capturing(&self) -> bool {
        self.pending.is_some()
    }

    /// Request one still capture.
    ///
    /// Fails with [`CaptureError::SessionClosed`] when the session is not
    /// live and [`CaptureError::Busy`] while another capture is in flight;
    /// `callback` is then dropped without being called. Otherwise `callback`
    /// is called exactly once from a later [`CaptureSession::poll`].
    pub fn capture_photo<F>(&mut self, settings: &PhotoSettings, callback: F) -> CaptureResult<()>
    where
        F: FnOnce(CaptureResult<CapturedImage>) + 'static,
    {
        let worker = match &self.worker {
            Some(worker) if worker.stream_size.is_some() => worker,
            _ => return Err(CaptureError::SessionClosed),
        };
        if self.pending.is_some() {
            return Err(CaptureError::Busy);
        }

        let id = self.next_id;
        self.next_id += 1;

        let command = Command::Capture {
            id,
            settings: *settings,
        };
        if worker.commands.send(command).is_err() {
            warn!("Camera worker is gone");
            return Err(CaptureError::SessionClosed);
        }

        debug!("Capture {} requested", id);
        self.pending = Some((id, Box::new(callback)));
        Ok(())
    }

    /// Apply worker events: setup results and finished captures.
    ///
    /// Returns how many capture callbacks ran.
    pub fn poll(&mut self) -> usize {
        let mut events = Vec::new();
        if let Some(worker) = &self.worker {
            while let Ok(event) = worker.events.try_recv() {
                events.push(event);
            }
        }

        let mut delivered = 0;
        for event in events {
            match event {
                Event::Ready {
                    device,
                    stream_size,
                } => {
                    info!(
                        "Camera session started on {} ({}x{})",
                        device.display_label(),
                        stream_size.0,
                        stream_size.1
                    );
                    if let Some(worker) = self.worker.as_mut() {
                        worker.stream_size = Some(stream_size);
                    }
                }
                Event::SetupFailed(e) => {
                    warn!("Camera session not started: {}", e);
                    self.worker = None;
                    self.setup_error = Some(e);
                }
                Event::Captured { id, result } => {
                    if self.complete(id, result) {
                        delivered += 1;
                    }
                }
            }
        }
        delivered
    }

    fn complete(&mut self, id: u64, result: CaptureResult<CapturedImage>) -> bool {
        match self.pending.take() {
            Some((pending_id, callback)) if pending_id == id => {
                debug!("Capture {} finished", id);
                callback(result);
                true
            }
            other => {
                debug!("Dropping result of unknown capture {}", id);
                self.pending = other;
                false
            }
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.stop();
    }
}

fn open_device(
    provider: &dyn DeviceProvider,
    preferred_device: Option<&str>,
) -> CaptureResult<(DeviceInfo, Box<dyn CameraDevice>)> {
    let device = provider.select(preferred_device)?;
    let mut camera = provider.open(&device)?;
    camera.attach_photo_output()?;
    Ok((device, camera))
}

/// Serve commands between frames. `next_frame` blocks until the device has
/// a frame, so it sets the pace of the loop.
fn run_worker(
    camera: &mut dyn CameraDevice,
    commands: &Receiver<Command>,
    events: &Sender<Event>,
    latest_frame: &FrameSlot,
) {
    loop {
        match commands.try_recv() {
            Ok(Command::Capture { id, settings }) => {
                let result = camera
                    .capture_photo(&settings)
                    .and_then(|raw| decode_photo(&raw));
                if events.send(Event::Captured { id, result }).is_err() {
                    break;
                }
            }
            Ok(Command::Stop) | Err(TryRecvError::Disconnected) => break,
            Err(TryRecvError::Empty) => {}
        }

        match camera.next_frame() {
            Ok(frame) => {
                if let Ok(mut slot) = latest_frame.lock() {
                    *slot = Some(Arc::new(frame));
                }
            }
            Err(e) => {
                debug!("Dropped preview frame: {}", e);
                thread::sleep(FRAME_RETRY_DELAY);
            }
        }
    }
}
