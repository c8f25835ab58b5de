use crate::math::Vector;
use crate::scene::{LightKind, NodeId};

/// A light ingested from the scene. Local lights (those authored inside
/// a room) influence only rooms reachable from their home room through
/// portals; lights with no home room are global and affect everything.
#[derive(Debug, Clone)]
pub struct Light {
    pub id: NodeId,
    pub kind: LightKind,
    pub position: Vector,
    /// Unit direction the light points along (-z basis axis of the node).
    pub direction: Vector,
    /// Spot cone angle, unused for other kinds.
    pub spread: f32,
    pub max_distance: f32,
    /// Home room index; None for global lights.
    pub room_id: Option<usize>,

    /// Slice into the manager light-caster array.
    pub first_caster: usize,
    pub num_casters: usize,
}

impl Light {
    pub fn is_global(&self) -> bool {
        self.room_id.is_none()
    }
}
