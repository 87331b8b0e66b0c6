//! Format discriminant and single-entry decode dispatch.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::binary::decode_binary_points;
use crate::error::DecodeError;
use crate::las::decode_las;
use crate::mesh::import_ply_mesh;
use crate::pose::{decode_pose_locations, decode_pose_track_auto};
use crate::types::{DecodeLimits, Mesh, PointCloud, PoseLocations, PoseTrack};

/// Which decoder a buffer should be handed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFormat {
    /// Custom 24-byte-stride point records, optionally prefixed by a count.
    BinaryPoints { has_header_count: bool },
    Las,
    PoseTrack,
    PoseLocations,
    PlyMesh,
}

impl DataFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "bin" => Some(DataFormat::BinaryPoints {
                has_header_count: true,
            }),
            "las" => Some(DataFormat::Las),
            "ply" => Some(DataFormat::PlyMesh),
            "pose" | "poses" => Some(DataFormat::PoseTrack),
            "loc" | "xyz" => Some(DataFormat::PoseLocations),
            _ => None,
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataFormat::BinaryPoints { .. } => write!(f, "binary points"),
            DataFormat::Las => write!(f, "LAS"),
            DataFormat::PoseTrack => write!(f, "pose track"),
            DataFormat::PoseLocations => write!(f, "pose locations"),
            DataFormat::PlyMesh => write!(f, "PLY mesh"),
        }
    }
}

/// Typed result of a successful decode.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Points(PointCloud),
    Poses(PoseTrack),
    Locations(PoseLocations),
    Mesh(Mesh),
}

impl Decoded {
    /// Number of primary elements (points, markers or vertices).
    pub fn element_count(&self) -> usize {
        match self {
            Decoded::Points(cloud) => cloud.positions.len(),
            Decoded::Poses(track) => track.markers.len(),
            Decoded::Locations(locations) => locations.positions.len(),
            Decoded::Mesh(mesh) => mesh.positions.len(),
        }
    }
}

/// Decode `data` with the decoder selected by `format`.
pub fn decode(data: &[u8], format: DataFormat, limits: &DecodeLimits) -> Result<Decoded, DecodeError> {
    match format {
        DataFormat::BinaryPoints { has_header_count } => {
            decode_binary_points(data, has_header_count, limits).map(Decoded::Points)
        }
        DataFormat::Las => decode_las(data, limits).map(Decoded::Points),
        DataFormat::PoseTrack => decode_pose_track_auto(data, limits).map(Decoded::Poses),
        DataFormat::PoseLocations => {
            let text = std::str::from_utf8(data)
                .map_err(|_| DecodeError::InvalidHeader("pose locations are not UTF-8 text".into()))?;
            decode_pose_locations(text, limits).map(Decoded::Locations)
        }
        DataFormat::PlyMesh => import_ply_mesh(data).map(Decoded::Mesh),
    }
}
