/// A 2D point in container pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Offset from `other` to `self`.
    pub fn delta_from(&self, other: Point) -> (f32, f32) {
        (self.x - other.x, self.y - other.y)
    }

    /// Euclidean distance between two points.
    pub fn distance_to(&self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Measured width and height of an element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero, negative or not a number.
    ///
    /// Hidden elements measure as zero, so this doubles as a "not laid out yet" check.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(30.0, 40.0);
        assert_eq!(a.distance_to(b), 50.0);
        assert_eq!(b.distance_to(a), 50.0);
    }

    #[test]
    fn test_delta_from() {
        let prev = Point::new(10.0, 20.0);
        let next = Point::new(15.0, 12.0);
        assert_eq!(next.delta_from(prev), (5.0, -8.0));
    }

    #[test]
    fn test_size_is_empty() {
        assert!(Size::default().is_empty());
        assert!(Size::new(0.0, 100.0).is_empty());
        assert!(Size::new(f32::NAN, 100.0).is_empty());
        assert!(!Size::new(1.0, 1.0).is_empty());
    }
}
