//! The one-shot conversion pass. Walks the authored scene under the
//! manager node, builds the room/portal/object/light graph, and traces
//! lights through portals to precompute per-room shadow casters.

use super::manager::RoomManager;
use super::pool::PoolSlot;
use super::portal::{ClipResult, Portal};
use super::sob::Sob;
use super::MAX_TRACE_DEPTH;
use crate::math::{Aabb, DotProduct, Plane};
use crate::scene::name::{find_name_after, name_starts_with};
use crate::scene::{LightKind, NodeId, NodeKind, SceneHost};

/// Portal staging for one room during the three-pass portal build.
#[derive(Debug, Default)]
struct TempRoom {
    portals: Vec<Portal>,
}

pub struct RoomConverter<'a, H: SceneHost> {
    host: &'a mut H,
    manager: &'a mut RoomManager,
    temp_rooms: Vec<TempRoom>,
    warned_pool_exhausted: bool,
    warned_depth_limit: bool,
}

impl<'a, H: SceneHost> RoomConverter<'a, H> {
    pub fn run(manager: &'a mut RoomManager, host: &'a mut H, root: NodeId) {
        let mut converter = RoomConverter {
            host,
            manager,
            temp_rooms: Vec::new(),
            warned_pool_exhausted: false,
            warned_depth_limit: false,
        };

        converter.convert(root);
    }

    fn convert(&mut self, root: NodeId) {
        debug!("running convert");

        self.manager.release_resources();

        let room_nodes = self.collect_room_nodes(root);
        debug!("{} rooms found", room_nodes.len());

        self.manager.bf_visible_rooms.create(room_nodes.len());
        self.temp_rooms = (0..room_nodes.len())
            .map(|_| TempRoom::default())
            .collect();

        // rooms must all exist before portals can resolve their targets
        for (room_id, &node) in room_nodes.iter().enumerate() {
            let short = find_name_after(self.host.name(node), "room_").to_owned();
            self.manager.rooms.push(super::Room {
                name: short,
                node,
                room_id,
                ..Default::default()
            });
        }

        self.convert_rooms();
        self.convert_portals();
        self.convert_bounds();

        // size the runtime bitfields now the object count is final
        let num_sobs = self.manager.sobs.len();
        debug!("total sobs {}", num_sobs);
        self.manager.bf_caster_sobs.create(num_sobs);
        self.manager.bf_visible_sobs.create(num_sobs);
        self.manager.bf_master_sobs.create(num_sobs);
        self.manager.bf_master_sobs_prev.create(num_sobs);

        let num_lights = self.manager.lights.len();
        self.manager.bf_active_lights.create(num_lights);
        self.manager.bf_active_lights_prev.create(num_lights);

        // must run after the bitfields exist
        self.convert_lights();
        self.convert_shadow_casters();

        // hide everything in preparation for the first frame
        self.convert_hide_all();

        self.temp_rooms.clear();
    }

    // ------------------------------------------------------------------
    // classification

    fn collect_room_nodes(&self, root: NodeId) -> Vec<NodeId> {
        self.host
            .children(root)
            .into_iter()
            .filter(|&child| self.node_is_room(child))
            .collect()
    }

    fn node_is_room(&self, node: NodeId) -> bool {
        if !name_starts_with(self.host.name(node), "room_") {
            return false;
        }

        assert!(
            self.host.kind(node) != NodeKind::Other,
            "room node '{}' is not a spatial",
            self.host.name(node)
        );
        true
    }

    fn node_is_portal(&self, node: NodeId) -> bool {
        if !name_starts_with(self.host.name(node), "portal_") {
            return false;
        }

        assert!(
            self.host.kind(node) == NodeKind::Mesh,
            "portal node '{}' is not a mesh",
            self.host.name(node)
        );
        true
    }

    fn node_is_bound(&self, node: NodeId) -> bool {
        if !name_starts_with(self.host.name(node), "bound_") {
            return false;
        }

        assert!(
            self.host.kind(node) == NodeKind::Mesh,
            "bound node '{}' is not a mesh",
            self.host.name(node)
        );
        true
    }

    fn node_is_ignore(&self, node: NodeId) -> bool {
        name_starts_with(self.host.name(node), "ignore_")
    }

    // ------------------------------------------------------------------
    // room harvest

    fn convert_rooms(&mut self) {
        debug!("convert_rooms");

        for room_id in 0..self.manager.rooms.len() {
            self.convert_room(room_id);
        }
    }

    fn convert_room(&mut self, room_id: usize) {
        let node = self.manager.rooms[room_id].node;
        debug!("convert_room: {}", self.host.name(node));

        // the host room node keeps its index for later object lookups
        self.host.set_room_id_meta(node, room_id);

        // running bound over the visual instances to find the room centre
        let mut bb_room = Aabb::max_opposite();
        self.find_objects_recursive(node, room_id, &mut bb_room);

        if bb_room.is_inverted() {
            bb_room = Aabb::default();
        }

        let room = &mut self.manager.rooms[room_id];
        room.centre = bb_room.centre();
        room.aabb = bb_room;

        trace!("\t{} centre {:?}", room.name, room.centre);
    }

    fn find_objects_recursive(&mut self, parent: NodeId, room_id: usize, bb_room: &mut Aabb) {
        for child in self.host.children(parent) {
            // portal and bound meshes are authoring data, deleted later
            // in conversion; ignored nodes stay but are not indexed
            if self.node_is_portal(child) || self.node_is_ignore(child) || self.node_is_bound(child)
            {
                continue;
            }

            if matches!(self.host.kind(child), NodeKind::Light(_)) {
                self.manager.light_create(&mut *self.host, child, Some(room_id));
                continue;
            }

            if self.host.kind(child).is_visual_instance() {
                trace!("\t\tfound visual: {}", self.host.name(child));

                let bb = self.host.transformed_aabb(child);
                bb_room.merge_with(&bb);

                self.manager.push_sob(room_id, Sob::new(child, bb));

                // strip every layer so the culler has exclusive control
                self.host.set_layer_mask(child, 0);
            }

            self.find_objects_recursive(child, room_id, bb_room);
        }
    }

    // ------------------------------------------------------------------
    // portals

    fn convert_portals(&mut self) {
        for pass in 0..3 {
            debug!("convert_portals pass {}", pass);

            for room_id in 0..self.manager.rooms.len() {
                match pass {
                    0 => self.detect_portal_meshes(room_id),
                    1 => self.make_portals_two_way(room_id),
                    2 => self.make_portal_final_list(room_id),
                    _ => unreachable!(),
                }
            }
        }
    }

    fn detect_portal_meshes(&mut self, room_id: usize) {
        let room_node = self.manager.rooms[room_id].node;
        trace!("detect_portals from room {}", self.manager.rooms[room_id].name);

        let mut portal_meshes = Vec::new();

        for child in self.host.children(room_node) {
            if !self.node_is_portal(child) {
                continue;
            }

            portal_meshes.push(child);

            // the name ends with the target room, minus the 'room_'
            let link = find_name_after(self.host.name(child), "portal_").to_owned();
            self.detected_portal_mesh(room_id, child, &link);
        }

        // the meshes are no longer needed at runtime
        for mesh in portal_meshes {
            self.host.remove_node(mesh);
        }
    }

    fn detected_portal_mesh(&mut self, room_id: usize, mesh: NodeId, link: &str) {
        trace!("\tdetected to {}", link);

        let Some(link_room) = self.manager.find_room_by_name(link) else {
            warn!("portal to room {}, room not found", link);
            return;
        };

        let local_verts = self.host.surface_vertices(mesh);
        let transform = self.host.global_transform(mesh);

        let mut portal = Portal {
            name: link.to_owned(),
            room_num: link_room,
            ..Default::default()
        };
        portal.create_geometry(&local_verts, &transform);

        self.temp_rooms[room_id].portals.push(portal);
    }

    /// Designers author a portal facing one way only; the matching
    /// portal in the linked room is synthesised here.
    fn make_portals_two_way(&mut self, room_id: usize) {
        let num = self.temp_rooms[room_id].portals.len();

        for p in 0..num {
            // only originals spawn mirrors, or they would ping-pong
            if self.temp_rooms[room_id].portals[p].is_mirror() {
                continue;
            }

            let source_name = self.manager.rooms[room_id].name.clone();
            let portal = &self.temp_rooms[room_id].portals[p];
            let target = portal.room_num;
            let mirror = portal.create_mirror(&source_name, room_id);

            self.temp_rooms[target].portals.push(mirror);
        }
    }

    /// Moves the temp portals into their contiguous slice of the
    /// manager portal array.
    fn make_portal_final_list(&mut self, room_id: usize) {
        let portals = std::mem::take(&mut self.temp_rooms[room_id].portals);

        for portal in portals {
            self.manager.add_portal(room_id, portal);
        }
    }

    // ------------------------------------------------------------------
    // bounds

    fn convert_bounds(&mut self) {
        for room_id in 0..self.manager.rooms.len() {
            let room_node = self.manager.rooms[room_id].node;

            for child in self.host.children(room_node) {
                if self.node_is_bound(child) {
                    self.convert_bound(room_id, child);

                    // authoring data only, never rendered
                    self.host.remove_node(child);
                }
            }
        }
    }

    fn convert_bound(&mut self, room_id: usize, mesh: NodeId) -> bool {
        let mesh_name = self.host.name(mesh).to_owned();
        trace!(
            "\tconvert_bound: '{}' for room '{}'",
            mesh_name,
            self.manager.rooms[room_id].name
        );

        let local_verts = self.host.surface_vertices(mesh);
        let transform = self.host.global_transform(mesh);

        let mut points = Vec::with_capacity(local_verts.len());
        for v in local_verts {
            let world = transform.xform(v);
            points.push(world);

            // the room box must encompass the bound as well
            self.manager.rooms[room_id].aabb.expand_to(world);
        }

        if points.len() <= 3 {
            warn!("bound '{}' has too few vertices, dropped", mesh_name);
            return false;
        }

        match self.host.quick_hull(&points) {
            Ok(mesh_data) => {
                let bound = &mut self.manager.rooms[room_id].bound;

                for face in &mesh_data.faces {
                    bound.add_plane_if_unique(face.plane);
                }
                trace!("\t\tcontained {} planes", bound.planes.len());

                bound.debug_mesh = Some(mesh_data);
                true
            }
            Err(err) => {
                warn!("bound '{}' hull failed ({}), dropped", mesh_name, err);
                false
            }
        }
    }

    // ------------------------------------------------------------------
    // light tracing

    fn convert_lights(&mut self) {
        // globals affect every room and are never traced
        for light_id in 0..self.manager.lights.len() {
            if self.manager.lights[light_id].is_global() {
                continue;
            }

            self.light_trace(light_id);
        }
    }

    fn light_trace(&mut self, light_id: usize) {
        // the bitfield doubles as the per-trace dedup set
        self.manager.bf_caster_sobs.blank();

        let home = self.manager.lights[light_id]
            .room_id
            .expect("local light has a home room");

        debug!(
            "light_trace {} direction {:?}",
            light_id, self.manager.lights[light_id].direction
        );

        self.manager.pool.reset();

        // the first plane set is empty: no frustum inside the home room
        let slot = self
            .manager
            .pool
            .request()
            .expect("reset pool has a free slot");

        self.light_trace_recursive(0, home, light_id, slot);

        self.manager.pool.free(slot);
    }

    fn light_trace_recursive(
        &mut self,
        depth: usize,
        room_id: usize,
        light_id: usize,
        slot: PoolSlot,
    ) {
        if depth > MAX_TRACE_DEPTH {
            self.warn_depth_limit();
            return;
        }

        trace!("room {} affected by local light", room_id);

        {
            let room = &mut self.manager.rooms[room_id];
            if !room.local_lights.contains(&light_id) {
                room.local_lights.push(light_id);
            }
        }

        // every object within the planes becomes a caster of this light
        let (first_sob, num_sobs) = {
            let room = &self.manager.rooms[room_id];
            (room.first_sob, room.num_sobs)
        };

        for sob_id in first_sob..first_sob + num_sobs {
            let show = aabb_within_planes(
                &self.manager.sobs[sob_id].aabb,
                self.manager.pool.planes(slot),
            );

            if show {
                self.light_add_caster_sob(light_id, sob_id);
            }
        }

        let light_dir = self.manager.lights[light_id].direction;

        let (first_portal, num_portals) = {
            let room = &self.manager.rooms[room_id];
            (room.first_portal, room.num_portals)
        };

        for portal_id in first_portal..first_portal + num_portals {
            let (dot, clip, linked_room) = {
                let portal = &self.manager.portals[portal_id];
                (
                    portal.plane.normal.dot(light_dir),
                    portal.clip_with_planes(self.manager.pool.planes(slot)),
                    portal.room_num,
                )
            };

            // portal must face along the light to pass it onward
            if dot <= 0.0 {
                trace!("\tportal {} culled (wrong direction)", portal_id);
                continue;
            }

            if clip == ClipResult::Outside {
                trace!("\tportal {} culled (outside planes)", portal_id);
                continue;
            }

            let Some(new_slot) = self.manager.pool.request() else {
                self.warn_pool_exhausted();
                continue;
            };

            self.manager.pool.copy_from(new_slot, slot);
            self.manager
                .portal_add_light_planes(portal_id, light_id, new_slot, false);

            self.light_trace_recursive(depth + 1, linked_room, light_id, new_slot);

            self.manager.pool.free(new_slot);
        }
    }

    fn light_add_caster_sob(&mut self, light_id: usize, sob_id: usize) {
        let m = &mut *self.manager;

        if m.bf_caster_sobs.get_bit(sob_id) {
            return;
        }

        trace!("\t\tlight caster {}", sob_id);
        m.bf_caster_sobs.set_bit(sob_id, true);

        let light = &mut m.lights[light_id];
        if light.num_casters == 0 {
            light.first_caster = m.light_casters_sob.len();
        }

        m.light_casters_sob.push(sob_id);
        light.num_casters += 1;
    }

    // ------------------------------------------------------------------
    // shadow casters

    fn convert_shadow_casters(&mut self) {
        let num_lights = self.manager.lights.len();
        debug!("convert_shadow_casters, {} lights", num_lights);

        for light_id in 0..num_lights {
            for room_id in 0..self.manager.rooms.len() {
                let affects = {
                    let m = &self.manager;
                    m.lights[light_id].is_global()
                        || m.rooms[room_id].local_lights.contains(&light_id)
                };

                if affects {
                    trace!("\tlight {} affects room {}", light_id, room_id);
                    self.find_shadow_casters_from_light(room_id, light_id);
                }
            }
        }
    }

    fn find_shadow_casters_from_light(&mut self, room_id: usize, light_id: usize) {
        self.manager.bf_caster_sobs.blank();

        self.manager.pool.reset();
        let slot = self
            .manager
            .pool
            .request()
            .expect("reset pool has a free slot");

        // the depth budget is measured in hops from the affected room,
        // hence starting at 1 rather than 0
        self.find_shadow_casters_recursive(room_id, 1, room_id, light_id, slot);

        self.manager.pool.free(slot);
    }

    fn find_shadow_casters_recursive(
        &mut self,
        source_room_id: usize,
        depth: usize,
        room_id: usize,
        light_id: usize,
        slot: PoolSlot,
    ) {
        if depth > MAX_TRACE_DEPTH {
            self.warn_depth_limit();
            return;
        }

        let (first_sob, num_sobs) = {
            let room = &self.manager.rooms[room_id];
            (room.first_sob, room.num_sobs)
        };

        for sob_id in first_sob..first_sob + num_sobs {
            let show = {
                let sob = &self.manager.sobs[sob_id];

                // objects flagged as non-casting never enter the list
                sob.is_shadow_caster(&*self.host)
                    && aabb_within_planes(&sob.aabb, self.manager.pool.planes(slot))
            };

            if show {
                // registered against the room the walk started from
                self.room_add_shadow_caster_sob(source_room_id, sob_id);
            }
        }

        let (light_kind, light_dir, light_pos) = {
            let light = &self.manager.lights[light_id];
            (light.kind, light.direction, light.position)
        };

        let (first_portal, num_portals) = {
            let room = &self.manager.rooms[room_id];
            (room.first_portal, room.num_portals)
        };

        for portal_id in first_portal..first_portal + num_portals {
            let (dot, clip, linked_room) = {
                let portal = &self.manager.portals[portal_id];

                let dot = match light_kind {
                    LightKind::Directional => portal.plane.normal.dot(light_dir),
                    // cull against the direction from the light to the portal
                    _ => portal.plane.normal.dot(portal.centre - light_pos),
                };

                (
                    dot,
                    portal.clip_with_planes(self.manager.pool.planes(slot)),
                    portal.room_num,
                )
            };

            // inverted sign test versus the light trace: this walk runs
            // from the receiver toward the light, so passable portals
            // face against it
            if dot >= 0.0 {
                trace!("\tportal {} culled (wrong direction)", portal_id);
                continue;
            }

            if clip == ClipResult::Outside {
                trace!("\tportal {} culled (outside planes)", portal_id);
                continue;
            }

            let Some(new_slot) = self.manager.pool.request() else {
                self.warn_pool_exhausted();
                continue;
            };

            self.manager.pool.copy_from(new_slot, slot);
            self.manager
                .portal_add_light_planes(portal_id, light_id, new_slot, true);

            self.find_shadow_casters_recursive(
                source_room_id,
                depth + 1,
                linked_room,
                light_id,
                new_slot,
            );

            self.manager.pool.free(new_slot);
        }
    }

    fn room_add_shadow_caster_sob(&mut self, room_id: usize, sob_id: usize) {
        let m = &mut *self.manager;

        if m.bf_caster_sobs.get_bit(sob_id) {
            return;
        }

        trace!("\t\tshadow caster {}", sob_id);
        m.bf_caster_sobs.set_bit(sob_id, true);

        let room = &mut m.rooms[room_id];
        if room.num_shadow_casters == 0 {
            room.first_shadow_caster = m.shadow_casters_sob.len();
        }

        m.shadow_casters_sob.push(sob_id);
        room.num_shadow_casters += 1;
    }

    // ------------------------------------------------------------------

    fn convert_hide_all(&mut self) {
        for sob_id in 0..self.manager.sobs.len() {
            let sob = &self.manager.sobs[sob_id];
            sob.show(&mut *self.host, false);
        }
    }

    fn warn_pool_exhausted(&mut self) {
        if !self.warned_pool_exhausted {
            warn!("plane pool exhausted, branch pruned");
            self.warned_pool_exhausted = true;
        }
    }

    fn warn_depth_limit(&mut self) {
        if !self.warned_depth_limit {
            warn!("trace depth limit reached, branch pruned");
            self.warned_depth_limit = true;
        }
    }
}

/// The box survives when no plane puts it fully on the outside.
fn aabb_within_planes(aabb: &Aabb, planes: &[Plane]) -> bool {
    planes
        .iter()
        .all(|plane| aabb.project_range_in_plane(plane).0 <= 0.0)
}
