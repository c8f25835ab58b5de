use super::vector::Vector;
use super::ScalarMul;

/// Column axes of a node's rotation/scale, expressed in world space.
/// `forward` is the local z axis; lights shine along `-forward`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Basis {
    pub right: Vector,
    pub up: Vector,
    pub forward: Vector,
}

impl Default for Basis {
    fn default() -> Self {
        Self {
            right: Vector::new(1.0, 0.0, 0.0),
            up: Vector::new(0.0, 1.0, 0.0),
            forward: Vector::new(0.0, 0.0, 1.0),
        }
    }
}

impl Basis {
    pub fn xform(&self, v: Vector) -> Vector {
        self.right.mul_scalar(v.x) + self.up.mul_scalar(v.y) + self.forward.mul_scalar(v.z)
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Transform {
    pub basis: Basis,
    pub origin: Vector,
}

impl Transform {
    pub fn from_origin(origin: Vector) -> Self {
        Self {
            basis: Basis::default(),
            origin,
        }
    }

    pub fn xform(&self, point: Vector) -> Vector {
        self.basis.xform(point) + self.origin
    }
}
