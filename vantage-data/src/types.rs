//! Core decoded data types.
//!
//! These are CPU-side representations produced by the decoders. They carry no
//! rendering state; consumers wrap the buffers in whatever primitive they draw.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Upper bound on points kept from a single point-cloud file.
pub const MAX_POINTS: usize = 5_000_000;
/// Upper bound on pose markers kept from a single pose track.
pub const MAX_POSES: usize = 3000;
/// Upper bound on points kept from a pose-location file.
pub const MAX_POSE_LOC_POINTS: usize = 250_000;
/// Any coordinate with a larger magnitude marks a record as corrupt.
pub const MAX_COORDINATE_MAGNITUDE: f64 = 1e7;

/// Output budgets applied by every decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeLimits {
    pub max_points: usize,
    pub max_poses: usize,
    pub max_pose_location_points: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_points: MAX_POINTS,
            max_poses: MAX_POSES,
            max_pose_location_points: MAX_POSE_LOC_POINTS,
        }
    }
}

/// Which decoder produced a point cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointSource {
    Binary,
    Las,
}

/// Bookkeeping describing how a point cloud was decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCloudMetadata {
    pub source: PointSource,
    /// Byte offset where point records start.
    pub header_offset: usize,
    /// Record count announced by the file, if one was trusted.
    pub declared_count: Option<u64>,
    /// Records addressable in the buffer.
    pub record_count: usize,
    pub downsample_step: usize,
    pub probe_float_hits: usize,
    pub probe_int_hits: usize,
    /// Coordinates were stored as scaled integers: the fixed-point probe
    /// result for binary clouds, always true for LAS records.
    pub used_integer_mode: bool,
    pub accepted_points: usize,
}

/// A decoded point cloud with optional per-point colors.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    pub positions: Vec<Vec3>,
    /// RGB colors (0-1 range), parallel to `positions`.
    pub colors: Option<Vec<Vec3>>,
    pub metadata: PointCloudMetadata,
}

impl PointCloud {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Flat `[x, y, z, x, y, z, ...]` position buffer.
    pub fn flat_positions(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Interleave positions and colors for upload. Points without colors are light gray.
    pub fn to_vertices(&self) -> Vec<PointVertex> {
        let fallback = Vec3::splat(0.8);
        self.positions
            .iter()
            .enumerate()
            .map(|(i, &position)| {
                let color = self
                    .colors
                    .as_ref()
                    .and_then(|c| c.get(i).copied())
                    .unwrap_or(fallback);
                PointVertex::new(position, color)
            })
            .collect()
    }
}

/// GPU-ready interleaved point vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PointVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl PointVertex {
    pub fn new(position: Vec3, color: Vec3) -> Self {
        Self {
            position: position.to_array(),
            color: color.to_array(),
        }
    }
}

/// One camera pose: an index/time scalar plus a 3x4 row-major rigid transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseRecord {
    pub index: f32,
    /// Rows of the 3x4 matrix, rotation in the first three columns, translation in the last.
    pub rows: [[f32; 4]; 3],
}

impl PoseRecord {
    /// Build from 13 consecutive values: index followed by the 12 matrix entries.
    pub fn from_values(values: &[f32; 13]) -> Self {
        let mut rows = [[0.0; 4]; 3];
        for (r, row) in rows.iter_mut().enumerate() {
            row.copy_from_slice(&values[1 + r * 4..1 + r * 4 + 4]);
        }
        Self {
            index: values[0],
            rows,
        }
    }

    /// Whether the transform is usable. The index is not checked.
    pub fn is_finite(&self) -> bool {
        self.rows.iter().flatten().all(|v| v.is_finite())
    }

    /// Full 4x4 transform with the implicit `[0, 0, 0, 1]` last row.
    pub fn matrix(&self) -> Mat4 {
        let [r0, r1, r2] = self.rows;
        Mat4::from_cols(
            Vec4::new(r0[0], r1[0], r2[0], 0.0),
            Vec4::new(r0[1], r1[1], r2[1], 0.0),
            Vec4::new(r0[2], r1[2], r2[2], 0.0),
            Vec4::new(r0[3], r1[3], r2[3], 1.0),
        )
    }

    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.rows[0][3], self.rows[1][3], self.rows[2][3])
    }
}

/// Small three-axis marker placed at a pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseMarker {
    pub transform: Mat4,
}

impl PoseMarker {
    /// Axis colors for X, Y and Z.
    pub const AXIS_COLORS: [Vec3; 3] = [Vec3::X, Vec3::Y, Vec3::Z];

    /// Marker origin followed by the tips of its X, Y and Z axes.
    pub fn axis_points(&self, axis_length: f32) -> [Vec3; 4] {
        [
            self.transform.transform_point3(Vec3::ZERO),
            self.transform.transform_point3(Vec3::X * axis_length),
            self.transform.transform_point3(Vec3::Y * axis_length),
            self.transform.transform_point3(Vec3::Z * axis_length),
        ]
    }
}

/// A decoded camera-pose track.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseTrack {
    pub poses: Vec<PoseRecord>,
    pub markers: Vec<PoseMarker>,
    pub total_records: usize,
    pub downsample_step: usize,
}

impl PoseTrack {
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// Plain xyz positions sampled from a pose-location file.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseLocations {
    pub positions: Vec<Vec3>,
    pub record_count: usize,
    pub downsample_step: usize,
}

impl PoseLocations {
    pub fn flat_positions(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }
}

/// A mesh parsed by an external importer.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub colors: Option<Vec<Vec3>>,
    pub indices: Vec<[u32; 3]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(accepted: usize) -> PointCloudMetadata {
        PointCloudMetadata {
            source: PointSource::Binary,
            header_offset: 0,
            declared_count: None,
            record_count: accepted,
            downsample_step: 1,
            probe_float_hits: 0,
            probe_int_hits: 0,
            used_integer_mode: false,
            accepted_points: accepted,
        }
    }

    #[test]
    fn test_flat_positions_layout() {
        let cloud = PointCloud {
            positions: vec![Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)],
            colors: None,
            metadata: metadata(2),
        };
        assert_eq!(cloud.flat_positions(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(cloud.flat_positions().len(), 3 * cloud.metadata.accepted_points);
    }

    #[test]
    fn test_vertices_fall_back_to_gray() {
        let cloud = PointCloud {
            positions: vec![Vec3::ONE],
            colors: None,
            metadata: metadata(1),
        };
        let vertices = cloud.to_vertices();
        assert_eq!(vertices[0].color, [0.8, 0.8, 0.8]);
    }

    #[test]
    fn test_pose_matrix_is_row_major() {
        let mut values = [0.0f32; 13];
        values[0] = 7.0;
        // identity rotation with translation (1, 2, 3)
        values[1] = 1.0;
        values[4] = 1.0;
        values[6] = 1.0;
        values[8] = 2.0;
        values[11] = 1.0;
        values[12] = 3.0;
        let pose = PoseRecord::from_values(&values);
        assert_eq!(pose.index, 7.0);
        assert_eq!(pose.translation(), Vec3::new(1.0, 2.0, 3.0));
        let m = pose.matrix();
        assert_eq!(m.transform_point3(Vec3::ZERO), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(m.row(3), Vec4::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_marker_axis_points() {
        let marker = PoseMarker {
            transform: Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)),
        };
        let points = marker.axis_points(0.5);
        assert_eq!(points[0], Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(points[1], Vec3::new(0.5, 1.0, 0.0));
        assert_eq!(points[2], Vec3::new(0.0, 1.5, 0.0));
        assert_eq!(points[3], Vec3::new(0.0, 1.0, 0.5));
    }
}
