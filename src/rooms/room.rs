use crate::math::{Aabb, DotProduct, Plane, Vector};
use crate::scene::{HullMeshData, NodeId};

// fudge factors for how close two bound planes can be and still count
// as the same; caps the working set for downstream clipping
const PLANE_DIST_EPS: f32 = 0.08;
const PLANE_DOT_MIN: f32 = 0.98;

/// Convex bound of a room: the unique half-space planes harvested from
/// the authored bound mesh's hull. Points inside the room satisfy
/// `n . x + d <= 0` for every plane. The hull mesh is kept for debug
/// draws.
#[derive(Debug, Clone, Default)]
pub struct Bound {
    pub planes: Vec<Plane>,
    pub debug_mesh: Option<HullMeshData>,
}

impl Bound {
    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    /// Adds the plane unless a near-equal one is already present.
    /// Returns whether the plane was added.
    pub fn add_plane_if_unique(&mut self, plane: Plane) -> bool {
        for other in &self.planes {
            if (plane.d - other.d).abs() > PLANE_DIST_EPS {
                continue;
            }

            if plane.normal.dot(other.normal) < PLANE_DOT_MIN {
                continue;
            }

            return false;
        }

        self.planes.push(plane);
        true
    }
}

/// A spatial region authored by the designer. Everything a room owns in
/// the manager arrays is addressed by a `[first, num]` slice so runtime
/// traversal stays contiguous.
#[derive(Debug, Clone, Default)]
pub struct Room {
    /// Short name, the part after `room_`.
    pub name: String,
    /// Host id of the source room node.
    pub node: NodeId,
    pub room_id: usize,
    pub centre: Vector,
    pub aabb: Aabb,

    /// Indices of local lights that can reach this room.
    pub local_lights: Vec<usize>,

    pub first_sob: usize,
    pub num_sobs: usize,
    pub first_portal: usize,
    pub num_portals: usize,
    pub first_shadow_caster: usize,
    pub num_shadow_casters: usize,

    pub bound: Bound,
}
