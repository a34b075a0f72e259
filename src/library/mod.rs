//! Photo library: where finished photos are written.
//!
//! Saving is fire-and-forget for the caller: each photo is written on its
//! own thread and failures are logged, never reported back. Writers still in
//! progress are joined by [`PhotoLibrary::flush`] when the app shuts down.

use std::cell::{Cell, RefCell};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::{SystemTime, UNIX_EPOCH};

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use log::{debug, error, info};

use crate::crop::CroppedImage;

pub trait PhotoLibrary {
    fn save(&self, image: CroppedImage);

    /// Wait for saves still being written
    fn flush(&self) {}
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn extension(&self) -> &str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Some(OutputFormat::Jpeg),
            "png" => Some(OutputFormat::Png),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum LibraryError {
    Io(std::io::Error),

    Encode(String),
}

impl std::fmt::Display for LibraryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Failed to write photo: {}", e),
            Self::Encode(msg) => write!(f, "Failed to encode photo: {}", msg),
        }
    }
}

impl std::error::Error for LibraryError {}

impl From<std::io::Error> for LibraryError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Encode `image` in display orientation and write it to `path`
pub fn write_photo(
    path: &Path,
    image: &CroppedImage,
    format: OutputFormat,
    jpeg_quality: u8,
) -> Result<(), LibraryError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pixels = image.to_display_pixels();
    match format {
        OutputFormat::Png => pixels
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| LibraryError::Encode(e.to_string())),
        OutputFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(pixels).to_rgb8();
            let writer = BufWriter::new(File::create(path)?);
            JpegEncoder::new_with_quality(writer, jpeg_quality.clamp(1, 100))
                .encode_image(&rgb)
                .map_err(|e| LibraryError::Encode(e.to_string()))
        }
    }
}

/// Library backed by a directory, by default the user's Pictures folder
pub struct PicturesLibrary {
    directory: PathBuf,
    format: OutputFormat,
    jpeg_quality: u8,
    sequence: Cell<u64>,
    writers: RefCell<Vec<JoinHandle<()>>>,
}

impl PicturesLibrary {
    pub fn new(directory: PathBuf, format: OutputFormat, jpeg_quality: u8) -> Self {
        Self {
            directory,
            format,
            jpeg_quality,
            sequence: Cell::new(0),
            writers: RefCell::new(Vec::new()),
        }
    }

    pub fn default_directory() -> PathBuf {
        dirs::picture_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Unique file name for the next photo
    pub fn next_path(&self) -> PathBuf {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let sequence = self.sequence.get();
        self.sequence.set(sequence + 1);

        self.directory.join(format!(
            "IMG_{}_{}.{}",
            millis,
            sequence,
            self.format.extension()
        ))
    }
}

impl PhotoLibrary for PicturesLibrary {
    fn save(&self, image: CroppedImage) {
        let path = self.next_path();
        let format = self.format;
        let quality = self.jpeg_quality;

        let spawned = thread::Builder::new()
            .name("photo-writer".to_string())
            .spawn(move || match write_photo(&path, &image, format, quality) {
                Ok(()) => info!("Photo saved to {:?}", path),
                Err(e) => error!("{}", e),
            });

        match spawned {
            Ok(handle) => {
                let mut writers = self.writers.borrow_mut();
                writers.retain(|writer| !writer.is_finished());
                writers.push(handle);
            }
            Err(e) => error!("Failed to start photo writer: {}", e),
        }
    }

    fn flush(&self) {
        let writers: Vec<_> = self.writers.borrow_mut().drain(..).collect();
        if !writers.is_empty() {
            debug!("Waiting for {} photo writer(s)", writers.len());
        }
        for writer in writers {
            if writer.join().is_err() {
                error!("Photo writer panicked");
            }
        }
    }
}

impl Drop for PicturesLibrary {
    fn drop(&mut self) {
        self.flush();
    }
}
