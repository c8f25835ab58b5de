use anyhow::Result;
use strum_macros::Display;

use crate::math::{Aabb, Plane, Transform, Vector};

pub mod mock;
pub mod name;

/// Opaque handle to a node owned by the host scene graph. Never
/// dereferenced here; every query goes back through [`SceneHost`].
pub type NodeId = u64;

/// Closed set of node subtypes the converter distinguishes. Mesh and
/// Visual nodes are both renderable; Mesh additionally exposes surface
/// vertices for portal and bound authoring geometry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Spatial,
    Mesh,
    Visual,
    Light(LightKind),
    Other,
}

impl NodeKind {
    pub fn is_visual_instance(&self) -> bool {
        matches!(self, NodeKind::Mesh | NodeKind::Visual)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Display)]
pub enum LightKind {
    Directional,
    Omni,
    Spot,
    /// A light subtype the converter does not understand; dropped with
    /// a warning at ingestion.
    Unsupported,
}

/// Shadow parameters read off a host light node.
#[derive(Debug, Copy, Clone, Default)]
pub struct LightParams {
    pub shadow_max_distance: f32,
    pub spot_spread: f32,
}

#[derive(Debug, Clone)]
pub struct HullFace {
    pub plane: Plane,
    /// Indices into [`HullMeshData::vertices`] of the points on this face.
    pub indices: Vec<usize>,
}

/// Result of the host convex hull primitive. Kept on the room bound as
/// debug mesh data.
#[derive(Debug, Clone)]
pub struct HullMeshData {
    pub vertices: Vec<Vector>,
    pub faces: Vec<HullFace>,
}

/// Everything the conversion core needs from the host 3D engine.
///
/// Node handles are opaque ids; the host resolves them. The converter
/// only ever walks downward from the manager node it is given, and the
/// only mutations it performs are visibility/layer changes and the
/// removal of authoring-only nodes (portal and bound meshes).
pub trait SceneHost {
    fn name(&self, node: NodeId) -> &str;
    fn kind(&self, node: NodeId) -> NodeKind;
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    fn global_transform(&self, node: NodeId) -> Transform;
    /// World-space box of a visual instance.
    fn transformed_aabb(&self, node: NodeId) -> Aabb;
    /// Local-space positions of the first surface of a mesh.
    fn surface_vertices(&self, node: NodeId) -> Vec<Vector>;

    fn light_params(&self, node: NodeId) -> LightParams;
    fn is_shadow_caster(&self, node: NodeId) -> bool;
    /// Geometry instances carry the extra-cull-margin quirk; plain
    /// visuals do not.
    fn is_geometry_instance(&self, node: NodeId) -> bool;

    fn is_visible(&self, node: NodeId) -> bool;
    fn set_visible(&mut self, node: NodeId, visible: bool);
    fn set_layer_mask(&mut self, node: NodeId, mask: u32);
    fn set_extra_cull_margin(&mut self, node: NodeId, margin: f32);
    /// Stores the converted room index on the host room node, for later
    /// object registration lookups.
    fn set_room_id_meta(&mut self, node: NodeId, room_id: usize);

    /// Detach from parent and schedule deletion of an authoring-only node.
    fn remove_node(&mut self, node: NodeId);

    fn quick_hull(&self, points: &[Vector]) -> Result<HullMeshData>;
}
