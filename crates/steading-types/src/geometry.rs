//! Plane geometry for entity positions.
//!
//! The world is a continuous 2D plane. Positions are `f64` pairs; all
//! range queries compare squared distances first so the square root is
//! only taken when a caller actually needs the metric value.

use serde::{Deserialize, Serialize};

/// A point on the world plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Position {
    /// Horizontal coordinate (world units).
    pub x: f64,
    /// Vertical coordinate (world units).
    pub y: f64,
}

impl Position {
    /// Create a position from coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another position.
    ///
    /// Preferred for range checks: avoids the square root and cannot
    /// produce NaN for finite inputs.
    pub fn distance_squared(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another position.
    pub fn distance(&self, other: &Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Move up to `step` units toward `target`.
    ///
    /// If the target is within `step` units, returns the target exactly
    /// (arrival snap). Otherwise returns a point `step` units along the
    /// straight line toward the target.
    pub fn step_toward(&self, target: &Self, step: f64) -> Self {
        let dist = self.distance(target);
        if dist <= step || dist <= f64::EPSILON {
            return *target;
        }
        let scale = step / dist;
        Self {
            x: (target.x - self.x).mul_add(scale, self.x),
            y: (target.y - self.y).mul_add(scale, self.y),
        }
    }

    /// Whether another position lies within `radius` units (inclusive).
    pub fn within(&self, other: &Self, radius: f64) -> bool {
        self.distance_squared(other) <= radius * radius
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_squared_matches_distance() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert!((a.distance_squared(&b) - 25.0).abs() < f64::EPSILON);
        assert!((a.distance(&b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn step_toward_snaps_on_arrival() {
        let a = Position::new(0.0, 0.0);
        let target = Position::new(1.0, 1.0);
        // Step larger than the remaining distance: land exactly on target.
        let next = a.step_toward(&target, 5.0);
        assert!((next.x - 1.0).abs() < f64::EPSILON);
        assert!((next.y - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn step_toward_advances_partially() {
        let a = Position::new(0.0, 0.0);
        let target = Position::new(10.0, 0.0);
        let next = a.step_toward(&target, 4.0);
        assert!((next.x - 4.0).abs() < 1e-9);
        assert!(next.y.abs() < 1e-9);
    }

    #[test]
    fn step_toward_zero_distance_is_stable() {
        let a = Position::new(2.0, 2.0);
        let next = a.step_toward(&a, 1.0);
        assert!((next.x - 2.0).abs() < f64::EPSILON);
        assert!((next.y - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn within_is_inclusive() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(1.5, 0.0);
        assert!(a.within(&b, 1.5));
        assert!(!a.within(&b, 1.49));
    }
}
