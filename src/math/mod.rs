pub mod aabb;
pub mod matrix;
pub mod plane;
pub mod vector;

pub use aabb::Aabb;
pub use matrix::{Basis, Transform};
pub use plane::Plane;
pub use vector::Vector;

pub trait DotProduct {
    fn dot(self, rhs: Self) -> f32;
}

pub trait CrossProduct {
    type Result;
    fn cross(self, rhs: Self) -> Self::Result;
}

pub trait ScalarMul {
    fn mul_scalar(self, scalar: f32) -> Self;
}

pub trait ScalarDiv {
    fn div_scalar(self, scalar: f32) -> Self;
}
