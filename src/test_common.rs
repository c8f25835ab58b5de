use std::sync::Once;

use env_logger::Env;

use crate::math::{Aabb, Basis, Transform, Vector};
use crate::scene::mock::{MockScene, NodeSpec};
use crate::scene::{LightKind, LightParams, NodeId, NodeKind};

static INIT: Once = Once::new();

pub fn setup() {
    INIT.call_once(|| {
        env_logger::Builder::from_env(Env::default().default_filter_or("debug"))
            .is_test(true)
            .init();
    });
}

pub fn add_room(scene: &mut MockScene, name: &str) -> NodeId {
    let root = scene.root();
    scene.add(
        root,
        NodeSpec::builder()
            .name(format!("room_{}", name))
            .kind(NodeKind::Spatial)
            .build(),
    )
}

pub fn add_object(scene: &mut MockScene, parent: NodeId, name: &str, min: Vector, max: Vector) -> NodeId {
    scene.add(
        parent,
        NodeSpec::builder()
            .name(name)
            .kind(NodeKind::Visual)
            .aabb(Aabb::new(min, max))
            .geometry_instance(true)
            .build(),
    )
}

pub fn add_portal(scene: &mut MockScene, room: NodeId, target: &str, verts: Vec<Vector>) -> NodeId {
    scene.add(
        room,
        NodeSpec::builder()
            .name(format!("portal_{}", target))
            .kind(NodeKind::Mesh)
            .vertices(verts)
            .build(),
    )
}

/// Square portal polygon in the `x = at` plane, spanning +-half in y
/// and z, wound so the normal faces +x.
pub fn portal_square_x(at: f32, half: f32) -> Vec<Vector> {
    vec![
        Vector::new(at, -half, -half),
        Vector::new(at, half, -half),
        Vector::new(at, half, half),
        Vector::new(at, -half, half),
    ]
}

pub fn box_verts(min: Vector, max: Vector) -> Vec<Vector> {
    let mut verts = Vec::with_capacity(8);
    for &x in &[min.x, max.x] {
        for &y in &[min.y, max.y] {
            for &z in &[min.z, max.z] {
                verts.push(Vector::new(x, y, z));
            }
        }
    }
    verts
}

pub fn add_bound_box(scene: &mut MockScene, room: NodeId, min: Vector, max: Vector) -> NodeId {
    scene.add(
        room,
        NodeSpec::builder()
            .name("bound_room")
            .kind(NodeKind::Mesh)
            .vertices(box_verts(min, max))
            .build(),
    )
}

fn light_transform(position: Vector, direction: Vector) -> Transform {
    // lights shine along -forward
    Transform {
        basis: Basis {
            forward: -direction.normalized(),
            ..Basis::default()
        },
        origin: position,
    }
}

pub fn add_light(
    scene: &mut MockScene,
    parent: NodeId,
    kind: LightKind,
    position: Vector,
    direction: Vector,
) -> NodeId {
    scene.add(
        parent,
        NodeSpec::builder()
            .name("light")
            .kind(NodeKind::Light(kind))
            .transform(light_transform(position, direction))
            .light_params(LightParams {
                shadow_max_distance: 50.0,
                spot_spread: 45.0,
            })
            .build(),
    )
}

pub fn add_directional_light(scene: &mut MockScene, room: NodeId, direction: Vector) -> NodeId {
    add_light(scene, room, LightKind::Directional, Vector::ZERO, direction)
}

pub fn add_omni_light(
    scene: &mut MockScene,
    room: NodeId,
    position: Vector,
    direction: Vector,
) -> NodeId {
    add_light(scene, room, LightKind::Omni, position, direction)
}
