//! Preview surface: aspect-fill geometry of the live view and its rendering

pub mod geometry;
pub mod layer;
pub mod render;

pub use geometry::{Rect, Size};
pub use layer::{PreviewLayer, VideoGravity};
pub use render::draw_preview;
