use bitflags::bitflags;

use super::light::Light;
use crate::math::{Plane, ScalarDiv, Transform, Vector};
use crate::scene::LightKind;

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
    pub struct PortalFlags: u32 {
        /// Synthesised opposite-facing twin of an authored portal.
        const MIRROR = 0x0001;
    }
}

/// Polygon classification against a half space.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClipResult {
    Inside,
    Partial,
    Outside,
}

/// Convex planar polygon connecting two rooms. The plane faces away
/// from the room that owns the portal, toward the linked room; the
/// authored winding decides which way that is.
#[derive(Debug, Clone, Default)]
pub struct Portal {
    /// Short name of the linked room.
    pub name: String,
    /// Index of the linked room.
    pub room_num: usize,
    pub flags: PortalFlags,
    /// World-space vertices, in authored winding order.
    pub polygon: Vec<Vector>,
    pub plane: Plane,
    pub centre: Vector,
}

impl Portal {
    pub fn is_mirror(&self) -> bool {
        self.flags.contains(PortalFlags::MIRROR)
    }

    /// Builds the world-space polygon from mesh-local vertices. The
    /// supporting plane comes from the first non-collinear vertex triple.
    pub fn create_geometry(&mut self, local_verts: &[Vector], transform: &Transform) {
        assert!(local_verts.len() >= 3, "portal mesh needs 3+ vertices");

        self.polygon = local_verts.iter().map(|&v| transform.xform(v)).collect();

        let mut centre = Vector::ZERO;
        for &p in &self.polygon {
            centre += p;
        }
        self.centre = centre.div_scalar(self.polygon.len() as f32);

        self.plane = supporting_plane(&self.polygon);
    }

    /// Same polygon with reversed winding, linking back to the source
    /// room. Lets designers author one side only.
    pub fn create_mirror(&self, source_room_name: &str, source_room_id: usize) -> Portal {
        let mut polygon = self.polygon.clone();
        polygon.reverse();

        Portal {
            name: source_room_name.to_owned(),
            room_num: source_room_id,
            flags: PortalFlags::MIRROR,
            plane: supporting_plane(&polygon),
            centre: self.centre,
            polygon,
        }
    }

    pub fn clip_with_plane(&self, plane: &Plane) -> ClipResult {
        let outside = self
            .polygon
            .iter()
            .filter(|&&p| plane.distance_to(p) > 0.0)
            .count();

        if outside == self.polygon.len() {
            ClipResult::Outside
        } else if outside == 0 {
            ClipResult::Inside
        } else {
            ClipResult::Partial
        }
    }

    /// Overall classification against a plane set; Outside as soon as
    /// any single plane rejects the whole polygon.
    pub fn clip_with_planes(&self, planes: &[Plane]) -> ClipResult {
        let mut overall = ClipResult::Inside;

        for plane in planes {
            match self.clip_with_plane(plane) {
                ClipResult::Outside => return ClipResult::Outside,
                ClipResult::Partial => overall = ClipResult::Partial,
                ClipResult::Inside => {}
            }
        }

        overall
    }

    /// Appends the planes bounding the volume the light sweeps through
    /// this portal. One plane per polygon edge plus the portal's own
    /// plane, flipped so the room being entered is the interior.
    ///
    /// The interior convention matches the box test everywhere else:
    /// inside means `n . x + d <= 0`. When walking from the receiver
    /// room toward the light the polygon at hand is the mirror twin
    /// (reversed winding), so the edge planes are flipped to land on the
    /// same swept volume.
    pub fn add_light_planes(&self, light: &Light, planes: &mut Vec<Plane>, from_receiver_side: bool) {
        let n = self.polygon.len();

        for i in 0..n {
            let a = self.polygon[i];
            let b = self.polygon[(i + 1) % n];

            let plane = match light.kind {
                LightKind::Directional => Plane::try_from_points(a, b, a + light.direction),
                LightKind::Omni | LightKind::Spot => Plane::try_from_points(b, a, light.position),
                LightKind::Unsupported => unreachable!("unsupported lights are dropped at ingestion"),
            };

            // an edge parallel to the light sweeps no area
            let Some(plane) = plane else {
                continue;
            };

            planes.push(if from_receiver_side { -plane } else { plane });
        }

        planes.push(-self.plane);
    }
}

fn supporting_plane(polygon: &[Vector]) -> Plane {
    for i in 1..polygon.len() - 1 {
        if let Some(plane) = Plane::try_from_points(polygon[0], polygon[i], polygon[i + 1]) {
            return plane;
        }
    }

    panic!("portal polygon is degenerate");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::NodeId;

    // unit square in the x=0 plane, normal facing +x
    fn square_portal() -> Portal {
        let mut portal = Portal {
            name: "target".into(),
            room_num: 1,
            ..Default::default()
        };
        portal.create_geometry(
            &[
                Vector::new(0.0, -1.0, -1.0),
                Vector::new(0.0, 1.0, -1.0),
                Vector::new(0.0, 1.0, 1.0),
                Vector::new(0.0, -1.0, 1.0),
            ],
            &Transform::default(),
        );
        portal
    }

    fn directional(direction: Vector) -> Light {
        Light {
            id: 0 as NodeId,
            kind: LightKind::Directional,
            position: Vector::ZERO,
            direction,
            spread: 0.0,
            max_distance: 0.0,
            room_id: Some(0),
            first_caster: 0,
            num_casters: 0,
        }
    }

    fn omni(position: Vector) -> Light {
        Light {
            kind: LightKind::Omni,
            position,
            ..directional(Vector::ZERO)
        }
    }

    fn inside(planes: &[Plane], point: Vector) -> bool {
        planes.iter().all(|p| p.distance_to(point) <= 1.0e-5)
    }

    #[test]
    fn geometry_from_winding() {
        let portal = square_portal();

        assert!((portal.plane.normal.x - 1.0).abs() < 1.0e-6);
        assert!(portal.plane.d.abs() < 1.0e-6);
        assert_eq!(portal.centre, Vector::ZERO);
    }

    #[test]
    fn mirror_reverses_winding_and_plane() {
        let portal = square_portal();
        let mirror = portal.create_mirror("source", 0);

        assert!(mirror.is_mirror());
        assert!(!portal.is_mirror());
        assert_eq!(mirror.room_num, 0);
        assert_eq!(mirror.name, "source");

        assert!((mirror.plane.normal + portal.plane.normal).length() < 1.0e-6);
        assert!((mirror.plane.d + portal.plane.d).abs() < 1.0e-6);

        let mut expected = portal.polygon.clone();
        expected.reverse();
        assert_eq!(mirror.polygon, expected);
    }

    #[test]
    fn clip_classification() {
        let portal = square_portal();

        // portal entirely on the negative side
        let behind = Plane::new(Vector::new(0.0, 1.0, 0.0), -2.0);
        assert_eq!(portal.clip_with_plane(&behind), ClipResult::Inside);

        // entirely positive
        let front = Plane::new(Vector::new(0.0, 1.0, 0.0), 2.0);
        assert_eq!(portal.clip_with_plane(&front), ClipResult::Outside);

        // straddling
        let split = Plane::new(Vector::new(0.0, 1.0, 0.0), 0.5);
        assert_eq!(portal.clip_with_plane(&split), ClipResult::Partial);

        assert_eq!(
            portal.clip_with_planes(&[behind, split]),
            ClipResult::Partial
        );
        assert_eq!(
            portal.clip_with_planes(&[behind, front, split]),
            ClipResult::Outside
        );
    }

    #[test]
    fn directional_planes_bound_the_swept_prism() {
        let portal = square_portal();
        let light = directional(Vector::new(1.0, 0.0, 0.0));

        let mut planes = Vec::new();
        portal.add_light_planes(&light, &mut planes, false);
        assert_eq!(planes.len(), 5);

        // past the portal, inside the square cross-section
        assert!(inside(&planes, Vector::new(1.0, 0.0, 0.0)));
        assert!(inside(&planes, Vector::new(3.0, 0.9, -0.9)));
        // outside the cross-section
        assert!(!inside(&planes, Vector::new(1.0, 2.0, 0.0)));
        assert!(!inside(&planes, Vector::new(1.0, 0.0, -1.5)));
        // behind the portal plane
        assert!(!inside(&planes, Vector::new(-1.0, 0.0, 0.0)));
    }

    #[test]
    fn omni_planes_bound_the_cone() {
        let portal = square_portal();
        let light = omni(Vector::new(-1.0, 0.0, 0.0));

        let mut planes = Vec::new();
        portal.add_light_planes(&light, &mut planes, false);

        // the cone widens past the portal: at x=1 it spans y,z in (-3, 3)
        assert!(inside(&planes, Vector::new(1.0, 0.0, 0.0)));
        assert!(inside(&planes, Vector::new(1.0, 1.5, 0.0)));
        assert!(!inside(&planes, Vector::new(1.0, 3.5, 0.0)));
        assert!(!inside(&planes, Vector::new(-0.5, 0.0, 0.0)));
    }

    #[test]
    fn receiver_side_walk_recovers_the_same_volume() {
        // walking the mirror twin with from_receiver_side=true must
        // bound the upstream side of the same silhouette
        let portal = square_portal();
        let mirror = portal.create_mirror("source", 0);
        let light = directional(Vector::new(1.0, 0.0, 0.0));

        let mut planes = Vec::new();
        mirror.add_light_planes(&light, &mut planes, true);

        // casters upstream of the portal, within the cross-section
        assert!(inside(&planes, Vector::new(-2.0, 0.5, 0.5)));
        assert!(!inside(&planes, Vector::new(-2.0, 1.5, 0.0)));
        // downstream is excluded by the (flipped) portal plane
        assert!(!inside(&planes, Vector::new(1.0, 0.0, 0.0)));
    }
}
