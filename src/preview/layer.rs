//! Geometry of the live preview.
//!
//! The layer renders stream frames into its bounds using a [`VideoGravity`].
//! The same gravity drives both where frames are drawn ([`PreviewLayer::content_rect`])
//! and how a layer rect is mapped back into the stream's normalized space
//! ([`PreviewLayer::metadata_output_rect`]), so changing one changes the other.

use crate::capture::Orientation;

use super::geometry::{Rect, Size};

/// Scaling policy for rendering frames into the layer bounds
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoGravity {
    /// Fill the bounds, clipping the overflow along the longer dimension
    #[default]
    ResizeAspectFill,
    /// Fit inside the bounds, letterboxing the remainder
    ResizeAspect,
    /// Stretch to the bounds, ignoring aspect ratio
    Resize,
}

impl VideoGravity {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "fill" => Some(VideoGravity::ResizeAspectFill),
            "fit" => Some(VideoGravity::ResizeAspect),
            "stretch" => Some(VideoGravity::Resize),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PreviewLayer {
    /// Layer bounds in widget coordinates
    pub bounds: Rect,
    /// Frame size as delivered by the device, in storage order
    pub stream_size: Size,
    /// How stream frames are rotated for display
    pub stream_rotation: Orientation,
    pub gravity: VideoGravity,
}

impl PreviewLayer {
    pub fn new(stream_size: Size, stream_rotation: Orientation, gravity: VideoGravity) -> Self {
        Self {
            bounds: Rect::default(),
            stream_size,
            stream_rotation,
            gravity,
        }
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    /// Stream size once rotated into display orientation
    pub fn display_size(&self) -> Size {
        self.stream_rotation.displayed_size(self.stream_size)
    }

    /// Where the rotated frame is drawn inside the layer.
    ///
    /// For aspect-fill this rect overflows the bounds along one axis.
    pub fn content_rect(&self) -> Rect {
        let video = self.display_size();
        let bounds = self.bounds;

        if video.is_empty() || bounds.is_empty() {
            return bounds;
        }

        let scale_x = bounds.width / video.width;
        let scale_y = bounds.height / video.height;
        let scale = match self.gravity {
            VideoGravity::ResizeAspectFill => scale_x.max(scale_y),
            VideoGravity::ResizeAspect => scale_x.min(scale_y),
            VideoGravity::Resize => return bounds,
        };

        let width = video.width * scale;
        let height = video.height * scale;
        Rect::new(
            bounds.x + (bounds.width - width) / 2.0,
            bounds.y + (bounds.height - height) / 2.0,
            width,
            height,
        )
    }

    /// Convert a rect in layer coordinates into the normalized `[0,1]x[0,1]`
    /// space of the stream.
    ///
    /// The result is not clipped: parts of `layer_rect` outside the rendered
    /// frame map outside the unit square. A layer that renders nothing maps
    /// everything to an empty rect.
    pub fn metadata_output_rect(&self, layer_rect: Rect) -> Rect {
        let content = self.content_rect();
        if content.is_empty() {
            return Rect::default();
        }

        let displayed = Rect::new(
            (layer_rect.x - content.x) / content.width,
            (layer_rect.y - content.y) / content.height,
            layer_rect.width / content.width,
            layer_rect.height / content.height,
        );

        self.stream_rotation
            .display_rect_to_storage(displayed, Size::new(1.0, 1.0))
    }

    /// Inverse of [`PreviewLayer::metadata_output_rect`]
    #[cfg(test)]
    pub fn layer_rect(&self, metadata_rect: Rect) -> Rect {
        let content = self.content_rect();
        let displayed = self
            .stream_rotation
            .storage_rect_to_display(metadata_rect, Size::new(1.0, 1.0));

        Rect::new(
            content.x + displayed.x * content.width,
            content.y + displayed.y * content.height,
            displayed.width * content.width,
            displayed.height * content.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_rect_close(actual: Rect, expected: Rect) {
        let eps = 1e-9;
        assert!(
            (actual.x - expected.x).abs() < eps
                && (actual.y - expected.y).abs() < eps
                && (actual.width - expected.width).abs() < eps
                && (actual.height - expected.height).abs() < eps,
            "{:?} != {:?}",
            actual,
            expected
        );
    }

    const UNIT: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
    };

    #[test]
    fn test_full_viewport_is_unit_rect() {
        for rotation in [
            Orientation::Up,
            Orientation::Down,
            Orientation::Left,
            Orientation::Right,
        ] {
            let stream = Size::new(1920.0, 1080.0);
            let mut layer =
                PreviewLayer::new(stream, rotation, VideoGravity::ResizeAspectFill);
            layer.set_bounds(Rect::from_size(layer.display_size()));

            assert_eq!(
                layer.metadata_output_rect(layer.bounds),
                UNIT,
                "rotation {:?}",
                rotation
            );
        }
    }

    #[test]
    fn test_full_viewport_is_unit_rect_for_every_gravity() {
        for gravity in [
            VideoGravity::ResizeAspectFill,
            VideoGravity::ResizeAspect,
            VideoGravity::Resize,
        ] {
            let mut layer = PreviewLayer::new(Size::new(640.0, 480.0), Orientation::Up, gravity);
            layer.set_bounds(Rect::new(0.0, 0.0, 320.0, 240.0));
            assert_eq!(layer.metadata_output_rect(layer.bounds), UNIT);
        }
    }

    #[test]
    fn test_aspect_fill_clips_wider_stream() {
        // 4:3 stream in a square layer: scaled to the height, sides clipped
        let mut layer = PreviewLayer::new(
            Size::new(400.0, 300.0),
            Orientation::Up,
            VideoGravity::ResizeAspectFill,
        );
        layer.set_bounds(Rect::new(0.0, 0.0, 300.0, 300.0));

        assert_rect_close(layer.content_rect(), Rect::new(-50.0, 0.0, 400.0, 300.0));
        assert_rect_close(
            layer.metadata_output_rect(layer.bounds),
            Rect::new(0.125, 0.0, 0.75, 1.0),
        );
    }

    #[test]
    fn test_aspect_fit_letterboxes() {
        let mut layer = PreviewLayer::new(
            Size::new(400.0, 300.0),
            Orientation::Up,
            VideoGravity::ResizeAspect,
        );
        layer.set_bounds(Rect::new(0.0, 0.0, 300.0, 300.0));

        assert_rect_close(layer.content_rect(), Rect::new(0.0, 37.5, 300.0, 225.0));
        let normalized = layer.metadata_output_rect(layer.bounds);
        assert!(normalized.y < 0.0);
        assert!(normalized.max_y() > 1.0);
    }

    #[test]
    fn test_rotated_stream_maps_into_storage_space() {
        // Landscape sensor shown in portrait: left half of the screen is the
        // bottom half of the sensor frame.
        let mut layer = PreviewLayer::new(
            Size::new(1920.0, 1080.0),
            Orientation::Right,
            VideoGravity::ResizeAspectFill,
        );
        layer.set_bounds(Rect::new(0.0, 0.0, 1080.0, 1920.0));

        let left_half = Rect::new(0.0, 0.0, 540.0, 1920.0);
        assert_rect_close(
            layer.metadata_output_rect(left_half),
            Rect::new(0.0, 0.5, 1.0, 0.5),
        );
    }

    #[test]
    fn test_layer_rect_inverts_metadata_rect() {
        let mut layer = PreviewLayer::new(
            Size::new(1920.0, 1080.0),
            Orientation::Left,
            VideoGravity::ResizeAspectFill,
        );
        layer.set_bounds(Rect::new(0.0, 0.0, 390.0, 844.0));

        let viewport = Rect::new(20.0, 40.0, 300.0, 500.0);
        let normalized = layer.metadata_output_rect(viewport);
        assert_rect_close(layer.layer_rect(normalized), viewport);
    }

    #[test]
    fn test_unlaid_out_layer_maps_to_empty_rect() {
        let layer = PreviewLayer::new(
            Size::new(640.0, 480.0),
            Orientation::Up,
            VideoGravity::ResizeAspectFill,
        );
        assert!(layer.metadata_output_rect(layer.bounds).is_empty());
    }

    #[test]
    fn test_gravity_labels() {
        assert_eq!(
            VideoGravity::from_label(" Fill "),
            Some(VideoGravity::ResizeAspectFill)
        );
        assert_eq!(VideoGravity::from_label("fit"), Some(VideoGravity::ResizeAspect));
        assert_eq!(VideoGravity::from_label("stretch"), Some(VideoGravity::Resize));
        assert_eq!(VideoGravity::from_label("zoom"), None);
    }
}
