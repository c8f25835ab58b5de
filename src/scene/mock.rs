//! In-memory [`SceneHost`] used by the test suite and benchmarks. Keeps
//! just enough of a scene tree to drive conversion: names, kinds,
//! transforms, boxes and mesh vertices, plus the mutable node state the
//! converter writes back (visibility, layer masks, cull margins).

use anyhow::Result;
use typed_builder::TypedBuilder;

use super::{HullFace, HullMeshData, LightParams, NodeId, NodeKind, SceneHost};
use crate::math::{Aabb, DotProduct, Plane, Transform, Vector};

#[derive(Debug, Clone, TypedBuilder)]
pub struct NodeSpec {
    #[builder(setter(into))]
    pub name: String,
    #[builder(default = NodeKind::Other)]
    pub kind: NodeKind,
    #[builder(default)]
    pub transform: Transform,
    #[builder(default)]
    pub aabb: Aabb,
    /// Local-space surface vertices, for Mesh nodes.
    #[builder(default)]
    pub vertices: Vec<Vector>,
    #[builder(default = true)]
    pub shadow_caster: bool,
    #[builder(default)]
    pub geometry_instance: bool,
    #[builder(default)]
    pub light_params: LightParams,
}

#[derive(Debug)]
struct MockNode {
    spec: NodeSpec,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    visible: bool,
    layer_mask: u32,
    extra_cull_margin: f32,
    room_id_meta: Option<usize>,
    removed: bool,
}

#[derive(Debug)]
pub struct MockScene {
    nodes: Vec<MockNode>,
}

impl Default for MockScene {
    fn default() -> Self {
        Self::new()
    }
}

impl MockScene {
    /// Creates the scene with a bare "manager" spatial as node 0.
    pub fn new() -> Self {
        let mut scene = Self { nodes: Vec::new() };

        scene.nodes.push(MockNode {
            spec: NodeSpec::builder()
                .name("manager")
                .kind(NodeKind::Spatial)
                .build(),
            parent: None,
            children: Vec::new(),
            visible: true,
            layer_mask: u32::MAX,
            extra_cull_margin: 0.0,
            room_id_meta: None,
            removed: false,
        });

        scene
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn add(&mut self, parent: NodeId, spec: NodeSpec) -> NodeId {
        let id = self.nodes.len() as NodeId;

        self.nodes.push(MockNode {
            spec,
            parent: Some(parent),
            children: Vec::new(),
            visible: true,
            layer_mask: u32::MAX,
            extra_cull_margin: 0.0,
            room_id_meta: None,
            removed: false,
        });

        self.node_mut(parent).children.push(id);
        id
    }

    pub fn is_removed(&self, node: NodeId) -> bool {
        self.nodes[node as usize].removed
    }

    pub fn layer_mask(&self, node: NodeId) -> u32 {
        self.nodes[node as usize].layer_mask
    }

    pub fn extra_cull_margin(&self, node: NodeId) -> f32 {
        self.nodes[node as usize].extra_cull_margin
    }

    pub fn room_id_meta(&self, node: NodeId) -> Option<usize> {
        self.nodes[node as usize].room_id_meta
    }

    fn node(&self, id: NodeId) -> &MockNode {
        &self.nodes[id as usize]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut MockNode {
        &mut self.nodes[id as usize]
    }
}

impl SceneHost for MockScene {
    fn name(&self, node: NodeId) -> &str {
        &self.node(node).spec.name
    }

    fn kind(&self, node: NodeId) -> NodeKind {
        self.node(node).spec.kind
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node).children.clone()
    }

    fn global_transform(&self, node: NodeId) -> Transform {
        self.node(node).spec.transform
    }

    fn transformed_aabb(&self, node: NodeId) -> Aabb {
        self.node(node).spec.aabb
    }

    fn surface_vertices(&self, node: NodeId) -> Vec<Vector> {
        self.node(node).spec.vertices.clone()
    }

    fn light_params(&self, node: NodeId) -> LightParams {
        self.node(node).spec.light_params
    }

    fn is_shadow_caster(&self, node: NodeId) -> bool {
        self.node(node).spec.shadow_caster
    }

    fn is_geometry_instance(&self, node: NodeId) -> bool {
        self.node(node).spec.geometry_instance
    }

    fn is_visible(&self, node: NodeId) -> bool {
        self.node(node).visible
    }

    fn set_visible(&mut self, node: NodeId, visible: bool) {
        self.node_mut(node).visible = visible;
    }

    fn set_layer_mask(&mut self, node: NodeId, mask: u32) {
        self.node_mut(node).layer_mask = mask;
    }

    fn set_extra_cull_margin(&mut self, node: NodeId, margin: f32) {
        self.node_mut(node).extra_cull_margin = margin;
    }

    fn set_room_id_meta(&mut self, node: NodeId, room_id: usize) {
        self.node_mut(node).room_id_meta = Some(room_id);
    }

    fn remove_node(&mut self, node: NodeId) {
        if let Some(parent) = self.node(node).parent {
            self.node_mut(parent).children.retain(|&c| c != node);
        }

        let n = self.node_mut(node);
        n.parent = None;
        n.removed = true;
    }

    fn quick_hull(&self, points: &[Vector]) -> Result<HullMeshData> {
        brute_hull(points)
    }
}

const HULL_EPS: f32 = 1.0e-4;

/// Exhaustive convex hull: every point triple whose plane has all points
/// on one side contributes a face. Cubic in the point count, which is
/// plenty for authored bound meshes.
fn brute_hull(points: &[Vector]) -> Result<HullMeshData> {
    if points.len() < 4 {
        bail!("hull needs at least 4 points, got {}", points.len());
    }

    let mut faces: Vec<HullFace> = Vec::new();

    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            for k in (j + 1)..points.len() {
                let Some(plane) = Plane::try_from_points(points[i], points[j], points[k]) else {
                    continue;
                };

                let mut d_min = f32::MAX;
                let mut d_max = -f32::MAX;
                for &p in points {
                    let d = plane.distance_to(p);
                    d_min = d_min.min(d);
                    d_max = d_max.max(d);
                }

                let plane = if d_max <= HULL_EPS {
                    plane
                } else if d_min >= -HULL_EPS {
                    -plane
                } else {
                    continue;
                };

                let duplicate = faces.iter().any(|f| {
                    f.plane.normal.dot(plane.normal) > 0.999 && (f.plane.d - plane.d).abs() < 1.0e-3
                });
                if duplicate {
                    continue;
                }

                let indices = points
                    .iter()
                    .enumerate()
                    .filter(|&(_, &p)| plane.distance_to(p).abs() <= HULL_EPS)
                    .map(|(n, _)| n)
                    .collect();

                faces.push(HullFace { plane, indices });
            }
        }
    }

    // a closed volume needs at least a tetrahedron
    if faces.len() < 4 {
        bail!("point set does not enclose a volume");
    }

    Ok(HullMeshData {
        vertices: points.to_vec(),
        faces,
    })
}
