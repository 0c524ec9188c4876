//! Axis-aligned overlap tests
//!
//! Units, projectiles and math blocks are anchored at their top-left corner.
//! Enemies and bosses are anchored at their center and grow with `scale`, so
//! their boxes are rebuilt around the center before testing.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle stored as top-left corner plus size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    /// Box anchored at its top-left corner
    #[inline]
    pub fn from_top_left(pos: Vec2, size: Vec2) -> Self {
        Self { min: pos, size }
    }

    /// Box of `size * scale` centered on `center`
    #[inline]
    pub fn from_center_scaled(center: Vec2, size: Vec2, scale: f32) -> Self {
        let scaled = size * scale;
        Self {
            min: center - scaled / 2.0,
            size: scaled,
        }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.size / 2.0
    }

    /// Half-open overlap test on both axes (touching edges do not overlap)
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        intersects(self, other)
    }

    /// True if the box lies entirely inside `[0, width] x [0, height]`
    pub fn within(&self, width: f32, height: f32) -> bool {
        let max = self.max();
        self.min.x >= 0.0 && self.min.y >= 0.0 && max.x <= width && max.y <= height
    }
}

/// Half-open AABB overlap: `a.left < b.right && a.right > b.left && ...`
#[inline]
pub fn intersects(a: &Aabb, b: &Aabb) -> bool {
    let a_max = a.max();
    let b_max = b.max();
    a.min.x < b_max.x && a_max.x > b.min.x && a.min.y < b_max.y && a_max.y > b.min.y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap() {
        let a = Aabb::from_top_left(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let b = Aabb::from_top_left(Vec2::new(5.0, 5.0), Vec2::new(10.0, 10.0));
        assert!(intersects(&a, &b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Aabb::from_top_left(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let right = Aabb::from_top_left(Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0));
        let below = Aabb::from_top_left(Vec2::new(0.0, 10.0), Vec2::new(10.0, 10.0));
        assert!(!intersects(&a, &right));
        assert!(!intersects(&a, &below));
    }

    #[test]
    fn test_separated_on_one_axis() {
        let a = Aabb::from_top_left(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let b = Aabb::from_top_left(Vec2::new(5.0, 30.0), Vec2::new(10.0, 10.0));
        assert!(!intersects(&a, &b));
    }

    #[test]
    fn test_center_scaled_box() {
        let b = Aabb::from_center_scaled(Vec2::new(50.0, 50.0), Vec2::splat(10.0), 2.0);
        assert_eq!(b.min, Vec2::new(40.0, 40.0));
        assert_eq!(b.size, Vec2::splat(20.0));
        assert_eq!(b.center(), Vec2::new(50.0, 50.0));

        // A point-sized probe just inside the scaled extent hits, outside misses
        let inside = Aabb::from_top_left(Vec2::new(41.0, 50.0), Vec2::splat(1.0));
        let outside = Aabb::from_top_left(Vec2::new(38.0, 50.0), Vec2::splat(1.0));
        assert!(b.intersects(&inside));
        assert!(!b.intersects(&outside));
    }

    #[test]
    fn test_within() {
        let b = Aabb::from_top_left(Vec2::new(0.0, 0.0), Vec2::splat(10.0));
        assert!(b.within(10.0, 10.0));
        assert!(!b.within(9.0, 10.0));
        let neg = Aabb::from_top_left(Vec2::new(-1.0, 0.0), Vec2::splat(10.0));
        assert!(!neg.within(100.0, 100.0));
    }
}
