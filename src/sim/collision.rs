//! Circle collision tests
//!
//! Every actor is a circle. Overlap is strict: touching circles do not
//! collide.

use glam::Vec2;

/// Check whether two circles overlap
#[inline]
pub fn circles_overlap(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> bool {
    a_pos.distance(b_pos) < a_radius + b_radius
}

/// Overlap test with the combined radius scaled (for tighter hit boxes)
#[inline]
pub fn within_scaled_reach(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32, scale: f32) -> bool {
    a_pos.distance(b_pos) < (a_radius + b_radius) * scale
}

/// Unit vector from `from` toward `to`, zero if they coincide
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circles_overlap() {
        assert!(circles_overlap(Vec2::ZERO, 1.5, Vec2::new(2.0, 0.0), 0.8));
        assert!(!circles_overlap(Vec2::ZERO, 1.5, Vec2::new(3.0, 0.0), 0.8));
    }

    #[test]
    fn test_touching_is_not_overlap() {
        assert!(!circles_overlap(Vec2::ZERO, 1.0, Vec2::new(2.0, 0.0), 1.0));
    }

    #[test]
    fn test_scaled_reach_is_tighter() {
        let a = Vec2::ZERO;
        let b = Vec2::new(2.0, 0.0);
        // combined radii 2.3, scaled 1.84
        assert!(circles_overlap(a, 1.5, b, 0.8));
        assert!(!within_scaled_reach(a, 1.5, b, 0.8, 0.8));
        assert!(within_scaled_reach(a, 1.5, Vec2::new(1.5, 0.0), 0.8, 0.8));
    }

    #[test]
    fn test_direction_to() {
        let d = direction_to(Vec2::new(1.0, 1.0), Vec2::new(4.0, 5.0));
        assert!((d - Vec2::new(0.6, 0.8)).length() < 1e-6);
        assert_eq!(direction_to(Vec2::ONE, Vec2::ONE), Vec2::ZERO);
    }
}
