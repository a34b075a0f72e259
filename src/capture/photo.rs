//! Decoding of captured stills.

use std::io::Cursor;

use image::RgbaImage;
use log::debug;

use super::device::{CaptureError, CaptureResult, RawPhoto};
use super::orientation::Orientation;
use crate::preview::Size;

/// A decoded still photo.
///
/// `pixels` stay in storage order; `orientation` says how to display them.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedImage {
    pub pixels: RgbaImage,
    pub orientation: Orientation,
    pub scale: f64,
}

impl CapturedImage {
    pub fn new(pixels: RgbaImage, orientation: Orientation) -> Self {
        Self {
            pixels,
            orientation,
            scale: 1.0,
        }
    }

    /// Displayed size (what a viewer honoring the orientation shows)
    pub fn size(&self) -> Size {
        self.orientation.displayed_size(self.storage_size())
    }

    /// Size the crop is computed in: the displayed size with width and
    /// height swapped back for quarter-turn orientations.
    pub fn effective_size(&self) -> Size {
        let size = self.size();
        if self.orientation.swaps_dimensions() {
            size.transposed()
        } else {
            size
        }
    }

    fn storage_size(&self) -> Size {
        Size::from_pixels(self.pixels.width(), self.pixels.height())
    }
}

/// Read the EXIF Orientation tag from encoded image bytes
pub fn read_exif_orientation(data: &[u8]) -> Option<Orientation> {
    let mut cursor = Cursor::new(data);
    let exif = exif::Reader::new().read_from_container(&mut cursor).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    field.value.get_uint(0).map(Orientation::from_exif)
}

/// Decode a device photo into a [`CapturedImage`]
pub fn decode_photo(raw: &RawPhoto) -> CaptureResult<CapturedImage> {
    let decoded = image::load_from_memory(&raw.data)
        .map_err(|e| CaptureError::DecodeFailed(e.to_string()))?;

    let orientation = raw
        .orientation
        .or_else(|| read_exif_orientation(&raw.data))
        .unwrap_or_default();

    debug!(
        "Decoded photo {}x{} ({:?})",
        decoded.width(),
        decoded.height(),
        orientation
    );

    Ok(CapturedImage::new(decoded.to_rgba8(), orientation))
}
