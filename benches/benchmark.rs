use criterion::{black_box, criterion_group, criterion_main, Criterion};

use portalcull::math::{Aabb, Basis, Transform, Vector};
use portalcull::rooms::RoomManager;
use portalcull::scene::mock::{MockScene, NodeSpec};
use portalcull::scene::{LightKind, LightParams, NodeKind};

/// Chain of rooms along +x, each with a handful of objects and a portal
/// to the next, with a directional light in the first room.
fn build_chain(rooms: usize, objects_per_room: usize) -> MockScene {
    let mut scene = MockScene::new();
    let root = scene.root();

    let mut room_nodes = Vec::new();
    for i in 0..rooms {
        room_nodes.push(scene.add(
            root,
            NodeSpec::builder()
                .name(format!("room_r{}", i))
                .kind(NodeKind::Spatial)
                .build(),
        ));
    }

    for (i, &room) in room_nodes.iter().enumerate() {
        let x = i as f32;

        for o in 0..objects_per_room {
            let y = (o as f32) * 0.1 - 0.3;
            scene.add(
                room,
                NodeSpec::builder()
                    .name(format!("obj_{}_{}", i, o))
                    .kind(NodeKind::Visual)
                    .aabb(Aabb::new(
                        Vector::new(x - 0.7, y, -0.2),
                        Vector::new(x - 0.3, y + 0.05, 0.2),
                    ))
                    .build(),
            );
        }

        if i + 1 < rooms {
            scene.add(
                room,
                NodeSpec::builder()
                    .name(format!("portal_r{}", i + 1))
                    .kind(NodeKind::Mesh)
                    .vertices(vec![
                        Vector::new(x, -1.0, -1.0),
                        Vector::new(x, 1.0, -1.0),
                        Vector::new(x, 1.0, 1.0),
                        Vector::new(x, -1.0, 1.0),
                    ])
                    .build(),
            );
        }
    }

    scene.add(
        room_nodes[0],
        NodeSpec::builder()
            .name("light")
            .kind(NodeKind::Light(LightKind::Directional))
            .transform(Transform {
                basis: Basis {
                    forward: Vector::new(-1.0, 0.0, 0.0),
                    ..Basis::default()
                },
                origin: Vector::ZERO,
            })
            .light_params(LightParams {
                shadow_max_distance: 100.0,
                spot_spread: 0.0,
            })
            .build(),
    );

    scene
}

fn conversion_benchmark(c: &mut Criterion) {
    c.bench_function("convert 8 room chain", |b| {
        b.iter(|| {
            let mut scene = build_chain(8, 8);
            let root = scene.root();
            let mut manager = RoomManager::new();
            manager.convert(&mut scene, root);
            black_box(manager.shadow_casters_sob.len())
        })
    });

    c.bench_function("convert 32 room chain", |b| {
        b.iter(|| {
            let mut scene = build_chain(32, 4);
            let root = scene.root();
            let mut manager = RoomManager::new();
            manager.convert(&mut scene, root);
            black_box(manager.shadow_casters_sob.len())
        })
    });
}

criterion_group!(benches, conversion_benchmark);
criterion_main!(benches);
