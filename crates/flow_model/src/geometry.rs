//! Geometry utilities: points, sizes, rectangles and clamping
//!
//! All coordinates are canvas units with the origin at the top-left and
//! `y` growing downwards.

use serde::{Deserialize, Serialize};

/// A point in canvas space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Offset from `other` to `self`
    pub fn offset_from(&self, other: Point) -> (f32, f32) {
        (self.x - other.x, self.y - other.y)
    }

    pub fn distance(&self, other: Point) -> f32 {
        let (dx, dy) = self.offset_from(other);
        (dx * dx + dy * dy).sqrt()
    }
}

/// Width and height of a box
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Component-wise maximum
    pub fn max(self, other: Size) -> Size {
        Size::new(self.width.max(other.width), self.height.max(other.height))
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Closed-interval point test: points on the border are inside.
    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() &&
        point.y >= self.y && point.y <= self.bottom()
    }

    /// Strict overlap; rectangles that only touch do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right() && other.x < self.right() &&
        self.y < other.bottom() && other.y < self.bottom()
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let x2 = self.right().max(other.right());
        let y2 = self.bottom().max(other.bottom());
        Rect::new(x, y, x2 - x, y2 - y)
    }

    /// Grow by `dx` on the left and right and `dy` on the top and bottom
    pub fn inflate(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x - dx, self.y - dy, self.width + 2.0 * dx, self.height + 2.0 * dy)
    }

    /// Same size, moved by `(dx, dy)`
    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Bounding box of a set of rectangles, `None` when the set is empty
    pub fn bounding<I>(rects: I) -> Option<Rect>
    where
        I: IntoIterator<Item = Rect>,
    {
        rects.into_iter().reduce(|acc, r| acc.union(&r))
    }
}

/// Clamp `value` into `[min, max]`.
///
/// Unlike [`f32::clamp`] this never panics: when `min > max` the lower bound
/// wins, which is what a minimum-size constraint wants.
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    if value > max {
        if max < min { min } else { max }
    } else if value < min {
        min
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_point_is_closed() {
        let r = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert!(r.contains_point(Point::new(0.0, 0.0)));
        assert!(r.contains_point(Point::new(100.0, 50.0)));
        assert!(r.contains_point(Point::new(50.0, 25.0)));
        assert!(!r.contains_point(Point::new(100.1, 25.0)));
        assert!(!r.contains_point(Point::new(50.0, -0.1)));
    }

    #[test]
    fn test_intersects_excludes_touching() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.intersects(&Rect::new(10.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_union_and_bounding() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 5.0, 10.0, 20.0);
        assert_eq!(a.union(&b), Rect::new(0.0, 0.0, 30.0, 25.0));
        assert_eq!(Rect::bounding([a, b]), Some(Rect::new(0.0, 0.0, 30.0, 25.0)));
        assert_eq!(Rect::bounding(Vec::new()), None);
    }

    #[test]
    fn test_inflate() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0).inflate(5.0, 2.0);
        assert_eq!(r, Rect::new(5.0, 8.0, 30.0, 24.0));
    }

    #[test]
    fn test_translate_keeps_size() {
        let r = Rect::new(10.0, 10.0, 20.0, 5.0).translate(-15.0, 4.0);
        assert_eq!(r, Rect::new(-5.0, 14.0, 20.0, 5.0));
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp(-1.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp(11.0, 0.0, 10.0), 10.0);
        // Inverted bounds keep the minimum
        assert_eq!(clamp(11.0, 50.0, 10.0), 50.0);
    }

    #[test]
    fn test_size_max() {
        let s = Size::new(10.0, 40.0).max(Size::new(20.0, 30.0));
        assert_eq!(s, Size::new(20.0, 40.0));
    }

    mod properties {
        use crate::geometry::*;
        use proptest::prelude::*;

        fn rect() -> impl Strategy<Value = Rect> {
            (-500f32..500.0, -500f32..500.0, 0f32..300.0, 0f32..300.0)
                .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
        }

        proptest! {
            #[test]
            fn prop_union_contains_both_centers(a in rect(), b in rect()) {
                let u = a.union(&b);
                prop_assert!(u.contains_point(a.center()));
                prop_assert!(u.contains_point(b.center()));
            }

            #[test]
            fn prop_clamp_respects_lower_bound(v in -1e4f32..1e4, min in -100f32..100.0, max in -100f32..100.0) {
                let c = clamp(v, min, max);
                prop_assert!(c >= min);
                if min <= max {
                    prop_assert!(c <= max);
                }
            }
        }
    }
}
