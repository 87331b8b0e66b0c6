//! Per-frame 3x4 camera-pose tracks.

use tracing::{debug, info};

use super::text::{is_plain_text, parse_numbers};
use crate::error::DecodeError;
use crate::sampling::{downsample_step, output_capacity, read_f32};
use crate::types::{DecodeLimits, PoseMarker, PoseRecord, PoseTrack};

/// Values per pose record: index/time followed by a 3x4 matrix.
pub const POSE_RECORD_VALUES: usize = 13;
/// Bytes per binary pose record.
pub const POSE_RECORD_STRIDE: usize = POSE_RECORD_VALUES * 4;

fn build_track(values: &[f32], limits: &DecodeLimits) -> Result<PoseTrack, DecodeError> {
    if values.len() < POSE_RECORD_VALUES {
        return Err(DecodeError::NotEnoughValues {
            needed: POSE_RECORD_VALUES,
            found: values.len(),
        });
    }

    let total_records = values.len() / POSE_RECORD_VALUES;
    let step = downsample_step(total_records, limits.max_poses);
    let capacity = output_capacity(total_records, step, limits.max_poses);

    let mut poses = Vec::with_capacity(capacity);
    let mut skipped = 0usize;
    for record in values
        .chunks_exact(POSE_RECORD_VALUES)
        .step_by(step)
        .take(capacity)
    {
        let Ok(record) = <&[f32; POSE_RECORD_VALUES]>::try_from(record) else {
            continue;
        };
        let pose = PoseRecord::from_values(record);
        if pose.is_finite() {
            poses.push(pose);
        } else {
            skipped += 1;
        }
    }

    if poses.is_empty() {
        return Err(DecodeError::NoRecords);
    }
    if skipped > 0 {
        debug!("Skipped {} pose records with non-finite entries", skipped);
    }

    let markers = poses
        .iter()
        .map(|pose| PoseMarker {
            transform: pose.matrix(),
        })
        .collect();
    info!(
        "Decoded {} poses from {} records (step {})",
        poses.len(),
        total_records,
        step
    );

    Ok(PoseTrack {
        poses,
        markers,
        total_records,
        downsample_step: step,
    })
}

/// Decode a pose track from whitespace-delimited text.
#[tracing::instrument(skip_all, fields(chars = text.len()))]
pub fn decode_pose_track_text(text: &str, limits: &DecodeLimits) -> Result<PoseTrack, DecodeError> {
    build_track(&parse_numbers(text), limits)
}

/// Decode a pose track from 52-byte little-endian `f32` records.
#[tracing::instrument(skip_all, fields(bytes = data.len()))]
pub fn decode_pose_track_binary(
    data: &[u8],
    limits: &DecodeLimits,
) -> Result<PoseTrack, DecodeError> {
    if data.len() < POSE_RECORD_STRIDE {
        return Err(DecodeError::TooShort {
            needed: POSE_RECORD_STRIDE,
            actual: data.len(),
        });
    }
    let usable = data.len() / POSE_RECORD_STRIDE * POSE_RECORD_STRIDE;
    let values: Vec<f32> = (0..usable)
        .step_by(4)
        .filter_map(|at| read_f32(data, at))
        .collect();
    build_track(&values, limits)
}

/// Decode a pose track from either representation.
pub fn decode_pose_track(source: PoseSource<'_>, limits: &DecodeLimits) -> Result<PoseTrack, DecodeError> {
    match source {
        PoseSource::Text(text) => decode_pose_track_text(text, limits),
        PoseSource::Binary(data) => decode_pose_track_binary(data, limits),
    }
}

/// Decode raw file bytes, treating printable UTF-8 with numbers in it as text.
pub fn decode_pose_track_auto(data: &[u8], limits: &DecodeLimits) -> Result<PoseTrack, DecodeError> {
    decode_pose_track(PoseSource::sniff(data), limits)
}

/// A pose track in one of its two encodings.
#[derive(Debug, Clone, Copy)]
pub enum PoseSource<'a> {
    Text(&'a str),
    Binary(&'a [u8]),
}

impl<'a> PoseSource<'a> {
    pub fn sniff(data: &'a [u8]) -> Self {
        match std::str::from_utf8(data) {
            Ok(text) if is_plain_text(text) => PoseSource::Text(text),
            _ => PoseSource::Binary(data),
        }
    }
}
