//! Rectangle and size primitives shared by the preview and crop code.
//!
//! Coordinates are `f64` with the origin at the top-left corner, matching
//! GTK widget and cairo coordinates.

/// Values closer than this to an integer are treated as that integer when
/// rounding outward, so float noise never grows a rect by a whole pixel.
const INTEGRAL_EPSILON: f64 = 1e-6;

#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn from_pixels(width: u32, height: u32) -> Self {
        Self::new(width as f64, height as f64)
    }

    /// Swap width and height (a quarter-turn rotation)
    pub fn transposed(self) -> Self {
        Self::new(self.height, self.width)
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rect anchored at the origin covering `size`
    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }

    /// Component-wise multiply of origin and size
    pub fn scaled(&self, sx: f64, sy: f64) -> Self {
        Self::new(self.x * sx, self.y * sy, self.width * sx, self.height * sy)
    }

    /// Smallest integer-aligned rect enclosing this one: origin floored,
    /// far edge ceiled.
    pub fn integral(&self) -> Self {
        let min_x = snap(self.x).floor();
        let min_y = snap(self.y).floor();
        let max_x = snap(self.max_x()).ceil();
        let max_y = snap(self.max_y()).ceil();
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Overlap of two rects, `None` when they do not overlap
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let min_x = self.x.max(other.x);
        let min_y = self.y.max(other.y);
        let max_x = self.max_x().min(other.max_x());
        let max_y = self.max_y().min(other.max_y());

        let rect = Rect::new(min_x, min_y, max_x - min_x, max_y - min_y);
        if rect.is_empty() {
            None
        } else {
            Some(rect)
        }
    }
}

fn snap(value: f64) -> f64 {
    let rounded = value.round();
    if (value - rounded).abs() < INTEGRAL_EPSILON {
        rounded
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integral_rounds_outward() {
        let rect = Rect::new(10.2, 5.7, 20.1, 3.1).integral();
        assert_eq!(rect, Rect::new(10.0, 5.0, 21.0, 4.0));
    }

    #[test]
    fn test_integral_keeps_integer_rect() {
        let rect = Rect::new(270.0, 0.0, 540.0, 1920.0);
        assert_eq!(rect.integral(), rect);
    }

    #[test]
    fn test_integral_ignores_float_noise() {
        let rect = Rect::new(0.0, 0.0, 0.1 + 0.2, 1.0).scaled(10.0, 1.0);
        assert_eq!(rect.integral(), Rect::new(0.0, 0.0, 3.0, 1.0));
    }

    #[test]
    fn test_intersection() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, -5.0, 10.0, 10.0);
        assert_eq!(a.intersection(&b), Some(Rect::new(5.0, 0.0, 5.0, 5.0)));
    }

    #[test]
    fn test_intersection_disjoint() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert_eq!(a.intersection(&b), None);
    }

    #[test]
    fn test_size_transposed() {
        assert_eq!(Size::new(1920.0, 1080.0).transposed(), Size::new(1080.0, 1920.0));
        assert!(Size::new(0.0, 10.0).is_empty());
    }
}
