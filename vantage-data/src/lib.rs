//! Vantage Data Crate
//!
//! Decoders that turn opaque byte buffers into typed geometry: custom binary
//! point clouds, LAS point records, camera-pose tracks and pose-location point
//! sets, plus an adapter for externally imported PLY meshes.
//! This crate is GPU-agnostic; every decoder either returns a complete result or
//! a [`DecodeError`], never partial data.

pub mod binary;
pub mod error;
pub mod format;
pub mod las;
pub mod mesh;
pub mod pose;
pub mod sampling;
pub mod types;

pub use binary::decode_binary_points;
pub use error::DecodeError;
pub use format::{DataFormat, Decoded, decode};
pub use las::{LasHeader, decode_las};
pub use mesh::import_ply_mesh;
pub use pose::{decode_pose_locations, decode_pose_track_auto, decode_pose_track_text};
pub use types::{
    DecodeLimits, MAX_POINTS, MAX_POSE_LOC_POINTS, MAX_POSES, Mesh, PointCloud,
    PointCloudMetadata, PointSource, PointVertex, PoseLocations, PoseMarker, PoseRecord,
    PoseTrack,
};
