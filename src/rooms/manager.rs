use super::bitfield::BitField;
use super::converter::RoomConverter;
use super::light::Light;
use super::pool::{PlanePool, PoolSlot};
use super::portal::Portal;
use super::room::Room;
use super::sob::Sob;
use crate::scene::{LightKind, NodeId, NodeKind, SceneHost};

/// Owns every converted array and the runtime bookkeeping sized against
/// them. The converter is the only writer; once [`RoomManager::convert`]
/// returns, runtime treats the arrays as immutable and drives the
/// per-frame bitfields only.
#[derive(Debug, Default)]
pub struct RoomManager {
    pub rooms: Vec<Room>,
    pub portals: Vec<Portal>,
    pub sobs: Vec<Sob>,
    pub lights: Vec<Light>,

    /// Per-light caster slices point into this.
    pub light_casters_sob: Vec<usize>,
    /// Per-room shadow caster slices point into this.
    pub shadow_casters_sob: Vec<usize>,

    pub pool: PlanePool,

    // runtime culling state, sized during conversion
    pub bf_visible_rooms: BitField,
    pub bf_caster_sobs: BitField,
    pub bf_visible_sobs: BitField,
    pub bf_master_sobs: BitField,
    pub bf_master_sobs_prev: BitField,
    pub bf_active_lights: BitField,
    pub bf_active_lights_prev: BitField,
}

impl RoomManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Smaller plane pools are mostly useful to force exhaustion in
    /// tests; the default is plenty for authored levels.
    pub fn with_pool_capacity(capacity: usize) -> Self {
        Self {
            pool: PlanePool::with_capacity(capacity),
            ..Default::default()
        }
    }

    /// One-shot conversion of the scene under `root`. Children of
    /// `root` named `room_*` become rooms; everything else is left
    /// alone.
    pub fn convert(&mut self, host: &mut impl SceneHost, root: NodeId) {
        RoomConverter::run(self, host, root);
    }

    /// Clears all converted data so conversion can run again on the
    /// same manager. Externally registered global lights survive;
    /// local lights are rediscovered from the scene.
    pub fn release_resources(&mut self) {
        self.rooms.clear();
        self.portals.clear();
        self.sobs.clear();
        self.light_casters_sob.clear();
        self.shadow_casters_sob.clear();

        self.lights.retain(|l| l.is_global());
        for light in &mut self.lights {
            light.first_caster = 0;
            light.num_casters = 0;
        }

        self.bf_visible_rooms.create(0);
        self.bf_caster_sobs.create(0);
        self.bf_visible_sobs.create(0);
        self.bf_master_sobs.create(0);
        self.bf_master_sobs_prev.create(0);
        self.bf_active_lights.create(0);
        self.bf_active_lights_prev.create(0);
    }

    pub fn find_room_by_name(&self, name: &str) -> Option<usize> {
        self.rooms.iter().position(|r| r.name == name)
    }

    /// Registers a light with the manager. Pass `room_id = None` for a
    /// global light authored outside any room. Returns false (with a
    /// warning) for light subtypes the converter does not understand.
    pub fn light_create(
        &mut self,
        host: &mut impl SceneHost,
        node: NodeId,
        room_id: Option<usize>,
    ) -> bool {
        let NodeKind::Light(kind) = host.kind(node) else {
            panic!("light_create called on a non-light node");
        };

        if kind == LightKind::Unsupported {
            warn!("light type unrecognised: {}", host.name(node));
            return false;
        }

        let transform = host.global_transform(node);
        let params = host.light_params(node);

        debug!("\t{} detected: {}", kind, host.name(node));

        self.lights.push(Light {
            id: node,
            kind,
            position: transform.origin,
            direction: (-transform.basis.forward).normalized(),
            spread: params.spot_spread,
            max_distance: params.shadow_max_distance,
            room_id,
            first_caster: 0,
            num_casters: 0,
        });

        // local lights start off; the runtime culler turns them on
        if room_id.is_some() {
            host.set_visible(node, false);
        }

        true
    }

    pub fn room_sobs(&self, room_id: usize) -> &[Sob] {
        let room = &self.rooms[room_id];
        &self.sobs[room.first_sob..room.first_sob + room.num_sobs]
    }

    pub fn room_portals(&self, room_id: usize) -> &[Portal] {
        let room = &self.rooms[room_id];
        &self.portals[room.first_portal..room.first_portal + room.num_portals]
    }

    /// Sob indices of everything that can cast a shadow into this room
    /// under any light affecting it.
    pub fn room_shadow_casters(&self, room_id: usize) -> &[usize] {
        let room = &self.rooms[room_id];
        &self.shadow_casters_sob
            [room.first_shadow_caster..room.first_shadow_caster + room.num_shadow_casters]
    }

    /// Sob indices within this light's reach.
    pub fn light_casters(&self, light_id: usize) -> &[usize] {
        let light = &self.lights[light_id];
        &self.light_casters_sob[light.first_caster..light.first_caster + light.num_casters]
    }

    pub(crate) fn push_sob(&mut self, room_id: usize, sob: Sob) {
        let end = self.sobs.len();
        let room = &mut self.rooms[room_id];

        if room.num_sobs == 0 {
            room.first_sob = end;
        }

        self.sobs.push(sob);
        room.num_sobs += 1;
    }

    pub(crate) fn add_portal(&mut self, room_id: usize, portal: Portal) {
        let end = self.portals.len();
        let room = &mut self.rooms[room_id];

        if room.num_portals == 0 {
            room.first_portal = end;
        }

        self.portals.push(portal);
        room.num_portals += 1;
    }

    /// Extends a borrowed plane list with the frustum planes of a
    /// portal crossing. Lives here so the portal, the light and the
    /// pool slot can be borrowed side by side.
    pub(crate) fn portal_add_light_planes(
        &mut self,
        portal_id: usize,
        light_id: usize,
        slot: PoolSlot,
        from_receiver_side: bool,
    ) {
        let portal = &self.portals[portal_id];
        let light = &self.lights[light_id];

        portal.add_light_planes(light, self.pool.planes_mut(slot), from_receiver_side);
    }
}
