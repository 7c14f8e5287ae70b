// THEORY:
// The `geometry` module holds the three value types every other module speaks in:
// `Size`, `Point` and `Rect`. They are "dumb" data containers in the same spirit as
// `MaskImage`: plain `f64` fields, `Copy`, no hidden state.
//
// Key principles:
// 1.  **One unit per type**: a `Point` is either normalized (0..1 on both axes) or
//     pixel-space; the type does not track which. The function that produces it
//     documents the space.
// 2.  **Inclusive containment**: `Rect::contains` includes all four edges, so a tap
//     on the last display column still maps onto the image.
// 3.  **Degenerate sizes are representable**: a `Size` of zero is a valid value;
//     it is the mapping operations that refuse to divide by it.

/// The dimensions of an image or a view.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when either axis has no extent or is not a number.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// The length of the longer side.
    pub fn long_side(&self) -> f64 {
        self.width.max(self.height)
    }
}

/// A 2D coordinate, normalized or in pixels depending on where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// The value `first_non_zero_pixel` returns when a mask is empty.
pub const NOT_FOUND: Point = Point { x: -1.0, y: -1.0 };

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// True for the `NOT_FOUND` sentinel (or any point with a negative component).
    pub fn is_not_found(&self) -> bool {
        self.x < 0.0 || self.y < 0.0
    }

    /// True when both components lie in [0, 1].
    pub fn is_normalized(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }
}

/// An axis-aligned box. Used for the region of a view an aspect-fit image occupies.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn min_x(&self) -> f64 {
        self.x
    }

    pub fn min_y(&self) -> f64 {
        self.y
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

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Edge-inclusive containment test.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x()
            && point.x <= self.max_x()
            && point.y >= self.min_y()
            && point.y <= self.max_y()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_includes_every_edge() {
        let rect = Rect::new(0.0, 25.0, 100.0, 50.0);
        assert!(rect.contains(Point::new(0.0, 25.0)));
        assert!(rect.contains(Point::new(100.0, 75.0)));
        assert!(rect.contains(Point::new(100.0, 25.0)));
        assert!(!rect.contains(Point::new(50.0, 24.999)));
        assert!(!rect.contains(Point::new(100.001, 50.0)));
    }

    #[test]
    fn center_is_midpoint() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(rect.center(), Point::new(25.0, 40.0));
    }

    #[test]
    fn sentinel_is_not_a_pixel() {
        assert!(NOT_FOUND.is_not_found());
        assert!(!Point::new(0.0, 0.0).is_not_found());
    }

    #[test]
    fn degenerate_sizes() {
        assert!(Size::new(0.0, 0.0).is_degenerate());
        assert!(Size::new(10.0, 0.0).is_degenerate());
        assert!(!Size::new(1.0, 1.0).is_degenerate());
        assert!(Size::new(f64::NAN, 1.0).is_degenerate());
        assert!(Size::new(1.0, f64::NAN).is_degenerate());
        assert_eq!(Size::new(300.0, 150.0).long_side(), 300.0);
    }
}
