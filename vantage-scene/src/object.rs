//! The owned scene object and its geometry.

use glam::{Affine3A, Quat, Vec3};
use tracing::debug;
use vantage_data::{Decoded, Mesh, PointCloud, PoseLocations, PoseTrack};

use crate::bounds::Aabb;

/// Identifier assigned to each installed object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

/// Geometry owned by a scene object.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectGeometry {
    Points(PointCloud),
    Poses(PoseTrack),
    Locations(PoseLocations),
    Mesh(Mesh),
}

impl ObjectGeometry {
    pub fn kind(&self) -> &'static str {
        match self {
            ObjectGeometry::Points(_) => "points",
            ObjectGeometry::Poses(_) => "poses",
            ObjectGeometry::Locations(_) => "locations",
            ObjectGeometry::Mesh(_) => "mesh",
        }
    }

    pub fn element_count(&self) -> usize {
        match self {
            ObjectGeometry::Points(cloud) => cloud.positions.len(),
            ObjectGeometry::Poses(track) => track.markers.len(),
            ObjectGeometry::Locations(locations) => locations.positions.len(),
            ObjectGeometry::Mesh(mesh) => mesh.positions.len(),
        }
    }

    /// Local-space bounds. Pose markers contribute their axis tips.
    pub fn local_bounds(&self, marker_axis_length: f32) -> Option<Aabb> {
        match self {
            ObjectGeometry::Points(cloud) => Aabb::from_points(cloud.positions.iter().copied()),
            ObjectGeometry::Poses(track) => Aabb::from_points(
                track
                    .markers
                    .iter()
                    .flat_map(|m| m.axis_points(marker_axis_length)),
            ),
            ObjectGeometry::Locations(locations) => {
                Aabb::from_points(locations.positions.iter().copied())
            }
            ObjectGeometry::Mesh(mesh) => Aabb::from_points(mesh.positions.iter().copied()),
        }
    }
}

impl From<Decoded> for ObjectGeometry {
    fn from(decoded: Decoded) -> Self {
        match decoded {
            Decoded::Points(cloud) => ObjectGeometry::Points(cloud),
            Decoded::Poses(track) => ObjectGeometry::Poses(track),
            Decoded::Locations(locations) => ObjectGeometry::Locations(locations),
            Decoded::Mesh(mesh) => ObjectGeometry::Mesh(mesh),
        }
    }
}

/// Placement of an object in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectTransform {
    pub translation: Vec3,
    pub rotation: Quat,
    /// Uniform scale.
    pub scale: f32,
}

impl ObjectTransform {
    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            self.rotation,
            self.translation,
        )
    }
}

impl Default for ObjectTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        }
    }
}

/// The single active object of a scene.
///
/// Geometry is freed through [`SceneObject::release`]; dropping the object
/// routes through the same path, so it is released exactly once on every exit.
#[derive(Debug)]
pub struct SceneObject {
    id: ObjectId,
    geometry: Option<ObjectGeometry>,
    local_bounds: Aabb,
    pub transform: ObjectTransform,
}

impl SceneObject {
    pub fn new(id: ObjectId, geometry: ObjectGeometry, marker_axis_length: f32) -> Self {
        let local_bounds = geometry
            .local_bounds(marker_axis_length)
            .unwrap_or(Aabb::point(Vec3::ZERO));
        Self {
            id,
            geometry: Some(geometry),
            local_bounds,
            transform: ObjectTransform::default(),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Geometry, or `None` once released.
    pub fn geometry(&self) -> Option<&ObjectGeometry> {
        self.geometry.as_ref()
    }

    pub fn is_released(&self) -> bool {
        self.geometry.is_none()
    }

    pub fn local_bounds(&self) -> Aabb {
        self.local_bounds
    }

    pub fn world_bounds(&self) -> Aabb {
        self.local_bounds.transformed(&self.transform.to_affine())
    }

    /// Free the geometry. Returns false if it was already released.
    pub fn release(&mut self) -> bool {
        match self.geometry.take() {
            Some(geometry) => {
                debug!(
                    "Released object {:?}: {} {}",
                    self.id,
                    geometry.element_count(),
                    geometry.kind()
                );
                true
            }
            None => false,
        }
    }
}

impl Drop for SceneObject {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vantage_data::{PointCloudMetadata, PointSource};

    fn cloud(points: Vec<Vec3>) -> ObjectGeometry {
        let n = points.len();
        ObjectGeometry::Points(PointCloud {
            positions: points,
            colors: None,
            metadata: PointCloudMetadata {
                source: PointSource::Binary,
                header_offset: 0,
                declared_count: None,
                record_count: n,
                downsample_step: 1,
                probe_float_hits: n,
                probe_int_hits: n,
                used_integer_mode: false,
                accepted_points: n,
            },
        })
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut object = SceneObject::new(ObjectId(1), cloud(vec![Vec3::ONE]), 0.1);
        assert!(!object.is_released());
        assert!(object.release());
        assert!(object.is_released());
        assert!(!object.release());
        assert!(object.geometry().is_none());
    }

    #[test]
    fn test_world_bounds_follow_transform() {
        let mut object = SceneObject::new(
            ObjectId(1),
            cloud(vec![Vec3::ZERO, Vec3::new(2.0, 1.0, 1.0)]),
            0.1,
        );
        object.transform.scale = 2.0;
        object.transform.translation = Vec3::new(0.0, 5.0, 0.0);
        let bounds = object.world_bounds();
        assert_eq!(bounds.min, Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(4.0, 7.0, 2.0));
    }

    #[test]
    fn test_pose_bounds_include_marker_axes() {
        use vantage_data::{PoseMarker, PoseTrack};
        let track = PoseTrack {
            poses: Vec::new(),
            markers: vec![PoseMarker {
                transform: glam::Mat4::IDENTITY,
            }],
            total_records: 1,
            downsample_step: 1,
        };
        let bounds = ObjectGeometry::Poses(track).local_bounds(0.5).unwrap();
        assert_eq!(bounds.max, Vec3::splat(0.5));
        assert_eq!(bounds.min, Vec3::ZERO);
    }
}
