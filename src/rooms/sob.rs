use crate::math::Aabb;
use crate::scene::{NodeId, SceneHost};

/// Static object: a visual instance registered with a room. The unit of
/// culling and shadow casting. Referenced positionally; each room owns a
/// contiguous slice of the manager array.
#[derive(Debug, Clone)]
pub struct Sob {
    /// Host id of the source visual instance.
    pub id: NodeId,
    /// World-space box at conversion time.
    pub aabb: Aabb,
}

impl Sob {
    pub fn new(id: NodeId, aabb: Aabb) -> Self {
        Self { id, aabb }
    }

    /// Queried live so a designer toggle on the host object wins.
    pub fn is_shadow_caster(&self, host: &impl SceneHost) -> bool {
        host.is_shadow_caster(self.id)
    }

    pub fn show(&self, host: &mut impl SceneHost, show: bool) {
        if host.is_visible(self.id) == show {
            return;
        }

        host.set_visible(self.id, show);

        if host.is_geometry_instance(self.id) {
            // upstream visibility caching quirk workaround
            host.set_extra_cull_margin(self.id, 0.0);
        }
    }
}
