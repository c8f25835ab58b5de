use super::plane::Plane;
use super::vector::Vector;
use super::{DotProduct, ScalarMul};

/// Axis aligned box kept as a min/max pair.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vector,
    pub max: Vector,
}

impl Default for Aabb {
    fn default() -> Self {
        Self {
            min: Vector::ZERO,
            max: Vector::ZERO,
        }
    }
}

impl Aabb {
    pub fn new(min: Vector, max: Vector) -> Self {
        Self { min, max }
    }

    /// Seed value for accumulating a bound: min at +infinity, max at
    /// -infinity, so the first expand_to snaps to the point.
    pub fn max_opposite() -> Self {
        Self {
            min: Vector::new(f32::MAX, f32::MAX, f32::MAX),
            max: Vector::new(-f32::MAX, -f32::MAX, -f32::MAX),
        }
    }

    /// True until at least one point has been accumulated.
    pub fn is_inverted(&self) -> bool {
        self.min.x > self.max.x
    }

    pub fn expand_to(&mut self, point: Vector) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn merge_with(&mut self, other: &Aabb) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn centre(&self) -> Vector {
        (self.min + self.max).mul_scalar(0.5)
    }

    /// Signed distance range of the box against a plane. `r_min > 0`
    /// means the whole box sits on the outside of the half space.
    pub fn project_range_in_plane(&self, plane: &Plane) -> (f32, f32) {
        let half = (self.max - self.min).mul_scalar(0.5);
        let length = half.dot(plane.normal.abs());
        let dist = plane.distance_to(self.centre());

        (dist - length, dist + length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_from_seed() {
        let mut bb = Aabb::max_opposite();
        assert!(bb.is_inverted());

        bb.expand_to(Vector::new(1.0, 2.0, 3.0));
        bb.expand_to(Vector::new(-1.0, 0.0, 5.0));

        assert!(!bb.is_inverted());
        assert_eq!(bb.min, Vector::new(-1.0, 0.0, 3.0));
        assert_eq!(bb.max, Vector::new(1.0, 2.0, 5.0));
        assert_eq!(bb.centre(), Vector::new(0.0, 1.0, 4.0));
    }

    #[test]
    fn project_range_straddling_plane() {
        let bb = Aabb::new(Vector::new(-1.0, -1.0, -1.0), Vector::new(1.0, 1.0, 1.0));
        let plane = Plane::new(Vector::new(1.0, 0.0, 0.0), 0.0);

        let (r_min, r_max) = bb.project_range_in_plane(&plane);
        assert_eq!(r_min, -1.0);
        assert_eq!(r_max, 1.0);
    }

    #[test]
    fn project_range_fully_outside() {
        let bb = Aabb::new(Vector::new(2.0, 0.0, 0.0), Vector::new(4.0, 1.0, 1.0));
        let plane = Plane::new(Vector::new(1.0, 0.0, 0.0), 0.0);

        let (r_min, _) = bb.project_range_in_plane(&plane);
        assert!(r_min > 0.0);
    }
}
