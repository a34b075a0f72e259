//! Orientation tag carried alongside captured pixel buffers.
//!
//! The buffer is kept in sensor storage order; the tag says how it must be
//! rotated for display. Nothing is rotated eagerly.

use image::{imageops, RgbaImage};

use crate::preview::{Rect, Size};

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Stored as displayed
    #[default]
    Up,
    /// Displayed rotated 180 degrees
    Down,
    /// Displayed rotated 90 degrees counter-clockwise
    Left,
    /// Displayed rotated 90 degrees clockwise
    Right,
}

impl Orientation {
    /// Map an EXIF Orientation value (TIFF tag 274).
    ///
    /// Mirrored variants collapse to their rotation; unknown values are `Up`.
    pub fn from_exif(value: u32) -> Self {
        match value {
            1 | 2 => Self::Up,
            3 | 4 => Self::Down,
            5 | 8 => Self::Left,
            6 | 7 => Self::Right,
            _ => Self::Up,
        }
    }

    /// Whether displaying requires a quarter turn
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// Displayed size of a buffer stored with `stored` dimensions
    pub fn displayed_size(self, stored: Size) -> Size {
        if self.swaps_dimensions() {
            stored.transposed()
        } else {
            stored
        }
    }

    /// Map a rect in displayed coordinates into storage coordinates.
    ///
    /// `stored` is the storage size of the space (use `Size::new(1.0, 1.0)`
    /// for normalized rects).
    pub fn display_rect_to_storage(self, rect: Rect, stored: Size) -> Rect {
        match self {
            Self::Up => rect,
            Self::Down => Rect::new(
                stored.width - rect.max_x(),
                stored.height - rect.max_y(),
                rect.width,
                rect.height,
            ),
            Self::Right => Rect::new(
                rect.y,
                stored.height - rect.max_x(),
                rect.height,
                rect.width,
            ),
            Self::Left => Rect::new(
                stored.width - rect.max_y(),
                rect.x,
                rect.height,
                rect.width,
            ),
        }
    }

    /// Inverse of [`Orientation::display_rect_to_storage`]
    pub fn storage_rect_to_display(self, rect: Rect, stored: Size) -> Rect {
        match self {
            Self::Up => rect,
            Self::Down => Rect::new(
                stored.width - rect.max_x(),
                stored.height - rect.max_y(),
                rect.width,
                rect.height,
            ),
            Self::Right => Rect::new(
                stored.height - rect.max_y(),
                rect.x,
                rect.height,
                rect.width,
            ),
            Self::Left => Rect::new(
                rect.y,
                stored.width - rect.max_x(),
                rect.height,
                rect.width,
            ),
        }
    }

    /// Rotate pixels into display order
    pub fn apply(self, image: &RgbaImage) -> RgbaImage {
        match self {
            Self::Up => image.clone(),
            Self::Down => imageops::rotate180(image),
            Self::Right => imageops::rotate90(image),
            Self::Left => imageops::rotate270(image),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_exif() {
        assert_eq!(Orientation::from_exif(1), Orientation::Up);
        assert_eq!(Orientation::from_exif(3), Orientation::Down);
        assert_eq!(Orientation::from_exif(6), Orientation::Right);
        assert_eq!(Orientation::from_exif(8), Orientation::Left);
        assert_eq!(Orientation::from_exif(0), Orientation::Up);
        assert_eq!(Orientation::from_exif(42), Orientation::Up);
    }

    #[test]
    fn test_from_exif_mirrored() {
        assert_eq!(Orientation::from_exif(2), Orientation::Up);
        assert_eq!(Orientation::from_exif(4), Orientation::Down);
        assert_eq!(Orientation::from_exif(5), Orientation::Left);
        assert_eq!(Orientation::from_exif(7), Orientation::Right);
    }

    #[test]
    fn test_displayed_size() {
        let stored = Size::new(1920.0, 1080.0);
        assert_eq!(Orientation::Up.displayed_size(stored), stored);
        assert_eq!(Orientation::Down.displayed_size(stored), stored);
        assert_eq!(
            Orientation::Left.displayed_size(stored),
            Size::new(1080.0, 1920.0)
        );
        assert_eq!(
            Orientation::Right.displayed_size(stored),
            Size::new(1080.0, 1920.0)
        );
    }

    #[test]
    fn test_rect_mapping_matches_pixel_rotation() {
        // 3x2 buffer with one marked pixel at (2, 0)
        let mut stored = RgbaImage::new(3, 2);
        stored.put_pixel(2, 0, image::Rgba([255, 0, 0, 255]));
        let stored_size = Size::new(3.0, 2.0);
        let marked = Rect::new(2.0, 0.0, 1.0, 1.0);

        for orientation in [
            Orientation::Up,
            Orientation::Down,
            Orientation::Left,
            Orientation::Right,
        ] {
            let displayed = orientation.apply(&stored);
            let rect = orientation.storage_rect_to_display(marked, stored_size);
            let pixel = displayed.get_pixel(rect.x as u32, rect.y as u32);
            assert_eq!(pixel.0, [255, 0, 0, 255], "{:?}", orientation);

            let back = orientation.display_rect_to_storage(rect, stored_size);
            assert_eq!(back, marked, "{:?}", orientation);
        }
    }
}
