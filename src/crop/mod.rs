//! Crop of a captured photo to what the preview showed.
//!
//! The viewport is mapped into the stream's normalized space by the preview
//! layer, scaled into the photo's effective (storage-order) pixel size,
//! rounded outward to whole pixels and sliced out of the buffer. The slice
//! keeps the source orientation tag and scale.

use image::{imageops, RgbaImage};
use log::debug;

use crate::capture::{CapturedImage, Orientation};
use crate::preview::{PreviewLayer, Rect, Size};

/// Crop region in pixel coordinates of the stored buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn as_tuple(&self) -> (u32, u32, u32, u32) {
        (self.x, self.y, self.width, self.height)
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Whether the region lies inside a `width` x `height` buffer
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x as u64 + self.width as u64 <= width as u64
            && self.y as u64 + self.height as u64 <= height as u64
    }

    /// Integer region for an already integral, non-negative rect
    fn from_integral(rect: Rect) -> Option<Self> {
        if rect.x < 0.0 || rect.y < 0.0 || rect.is_empty() {
            return None;
        }
        Some(Self::new(
            rect.x as u32,
            rect.y as u32,
            rect.width as u32,
            rect.height as u32,
        ))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CroppedImage {
    pub pixels: RgbaImage,
    pub orientation: Orientation,
    pub scale: f64,
}

impl CroppedImage {
    /// Pixels rotated into display order
    pub fn to_display_pixels(&self) -> RgbaImage {
        self.orientation.apply(&self.pixels)
    }
}

/// Pixel crop for a normalized rect in a buffer of `effective` size.
///
/// The scaled rect is rounded outward and clamped to the buffer, so the
/// result always lies within `[0, width] x [0, height]`. `None` when nothing
/// of the rect overlaps the buffer.
pub fn crop_rect_for(normalized: Rect, effective: Size) -> Option<CropRect> {
    let scaled = normalized
        .scaled(effective.width, effective.height)
        .integral();
    let bounded = scaled.intersection(&Rect::from_size(effective))?;
    CropRect::from_integral(bounded)
}

/// Slice the photo's buffer, keeping orientation and scale
pub fn crop_image(image: &CapturedImage, rect: CropRect) -> Option<CroppedImage> {
    let (width, height) = image.pixels.dimensions();
    if !rect.is_valid() || !rect.fits_within(width, height) {
        debug!(
            "Crop {:?} does not fit a {}x{} photo",
            rect.as_tuple(),
            width,
            height
        );
        return None;
    }

    let pixels = imageops::crop_imm(&image.pixels, rect.x, rect.y, rect.width, rect.height)
        .to_image();

    Some(CroppedImage {
        pixels,
        orientation: image.orientation,
        scale: image.scale,
    })
}

/// Crop `image` to the part of the stream visible through `viewport`
pub fn crop_to_viewport(
    image: &CapturedImage,
    preview: &PreviewLayer,
    viewport: Rect,
) -> Option<CroppedImage> {
    let normalized = preview.metadata_output_rect(viewport);
    let rect = crop_rect_for(normalized, image.effective_size())?;
    debug!("Viewport {:?} -> crop {:?}", viewport, rect.as_tuple());
    crop_image(image, rect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::VideoGravity;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([(x % 251) as u8, (y % 241) as u8, ((x + y) % 239) as u8, 255])
        })
    }

    fn layer_for(image: &CapturedImage, bounds: Rect) -> PreviewLayer {
        let mut layer = PreviewLayer::new(
            image.effective_size(),
            image.orientation,
            VideoGravity::ResizeAspectFill,
        );
        layer.set_bounds(bounds);
        layer
    }

    #[test]
    fn test_full_viewport_portrait_is_unchanged() {
        let image = CapturedImage::new(gradient(1080, 1920), Orientation::Up);
        let viewport = Rect::new(0.0, 0.0, 1080.0, 1920.0);
        let layer = layer_for(&image, viewport);

        let cropped = crop_to_viewport(&image, &layer, viewport).unwrap();
        assert_eq!(cropped.pixels, image.pixels);
        assert_eq!(cropped.orientation, Orientation::Up);
    }

    #[test]
    fn test_left_orientation_uses_swapped_dimensions() {
        // Displayed 1920x1080, stored 1080x1920
        let image = CapturedImage::new(RgbaImage::new(1080, 1920), Orientation::Left);
        assert_eq!(image.size(), Size::new(1920.0, 1080.0));

        let rect = crop_rect_for(Rect::new(0.25, 0.0, 0.5, 1.0), image.effective_size());
        assert_eq!(rect, Some(CropRect::new(270, 0, 540, 1920)));

        let cropped = crop_image(&image, rect.unwrap()).unwrap();
        assert_eq!(cropped.pixels.dimensions(), (540, 1920));
        assert_eq!(cropped.orientation, Orientation::Left);
    }

    #[test]
    fn test_crop_rect_stays_in_bounds() {
        let sizes = [(1080, 1920), (1081, 1917), (640, 480), (3, 7)];
        let steps = [0.0, 0.1, 1.0 / 3.0, 0.25, 0.5, 0.77, 0.999, 1.0];

        for (w, h) in sizes {
            let effective = Size::from_pixels(w, h);
            for &x in &steps {
                for &y in &steps {
                    for &width in &steps {
                        for &height in &steps {
                            if x + width > 1.0 || y + height > 1.0 {
                                continue;
                            }
                            let normalized = Rect::new(x, y, width, height);
                            if let Some(rect) = crop_rect_for(normalized, effective) {
                                assert!(rect.is_valid());
                                assert!(
                                    rect.fits_within(w, h),
                                    "{:?} escapes {}x{} for {:?}",
                                    rect,
                                    w,
                                    h,
                                    normalized
                                );
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_crop_rect_rounds_outward() {
        let rect = crop_rect_for(Rect::new(0.1, 0.1, 0.5, 0.5), Size::new(15.0, 15.0));
        // 1.5..9.0 -> 1..9
        assert_eq!(rect, Some(CropRect::new(1, 1, 8, 8)));
    }

    #[test]
    fn test_crop_rect_clamps_overflow() {
        let rect = crop_rect_for(Rect::new(-0.1, 0.5, 1.2, 0.8), Size::new(100.0, 100.0));
        assert_eq!(rect, Some(CropRect::new(0, 50, 100, 50)));
    }

    #[test]
    fn test_crop_rect_outside_is_none() {
        assert_eq!(
            crop_rect_for(Rect::new(1.5, 0.0, 0.5, 1.0), Size::new(100.0, 100.0)),
            None
        );
        assert_eq!(
            crop_rect_for(Rect::new(0.2, 0.2, 0.0, 0.5), Size::new(100.0, 100.0)),
            None
        );
    }

    #[test]
    fn test_crop_image_rejects_out_of_bounds() {
        let image = CapturedImage::new(gradient(10, 10), Orientation::Up);
        assert!(crop_image(&image, CropRect::new(5, 5, 6, 5)).is_none());
        assert!(crop_image(&image, CropRect::new(0, 0, 0, 5)).is_none());
    }

    #[test]
    fn test_crop_is_idempotent() {
        let image = CapturedImage::new(gradient(640, 480), Orientation::Right);
        let layer = layer_for(&image, Rect::new(0.0, 0.0, 390.0, 844.0));
        let viewport = layer.bounds;

        let first = crop_to_viewport(&image, &layer, viewport).unwrap();
        let second = crop_to_viewport(&image, &layer, viewport).unwrap();
        assert_eq!(first.pixels.as_raw(), second.pixels.as_raw());
        assert_eq!(first.orientation, second.orientation);
    }

    #[test]
    fn test_aspect_fill_crop_matches_visible_region() {
        // 400x300 stream in a 300x300 view: the center 300 columns are visible
        let image = CapturedImage::new(gradient(400, 300), Orientation::Up);
        let layer = layer_for(&image, Rect::new(0.0, 0.0, 300.0, 300.0));

        let cropped = crop_to_viewport(&image, &layer, layer.bounds).unwrap();
        assert_eq!(cropped.pixels.dimensions(), (300, 300));
        assert_eq!(cropped.pixels.get_pixel(0, 0), image.pixels.get_pixel(50, 0));
    }

    #[test]
    fn test_rotated_crop_keeps_scale_and_tag() {
        let mut image = CapturedImage::new(gradient(40, 20), Orientation::Right);
        image.scale = 2.0;
        let layer = layer_for(&image, Rect::new(0.0, 0.0, 20.0, 40.0));

        let cropped = crop_to_viewport(&image, &layer, Rect::new(0.0, 0.0, 10.0, 40.0)).unwrap();
        assert_eq!(cropped.orientation, Orientation::Right);
        assert_eq!(cropped.scale, 2.0);
        // Left half of the screen is the bottom half of the stored buffer
        assert_eq!(cropped.pixels.dimensions(), (40, 10));
        assert_eq!(cropped.pixels.get_pixel(0, 0), image.pixels.get_pixel(0, 10));
        assert_eq!(cropped.to_display_pixels().dimensions(), (10, 40));
    }
}
