//! Decoder for the fixed-stride binary point-cloud layout.
//!
//! Each record is 24 bytes: three 4-byte coordinates followed by 12 reserved
//! bytes. Files carry no format tag, so the coordinate encoding (little-endian
//! `f32` or millimeter fixed-point `i32`) is decided by sampling records.

use glam::Vec3;
use tracing::{debug, info, warn};

use crate::error::DecodeError;
use crate::sampling::{
    downsample_step, is_valid_coordinate, output_capacity, read_f32, read_i32, read_u32,
};
use crate::types::{DecodeLimits, PointCloud, PointCloudMetadata, PointSource};

/// Bytes per point record.
pub const RECORD_STRIDE: usize = 24;
/// Records inspected when guessing the coordinate encoding.
pub const PROBE_SAMPLES: usize = 1000;
/// Fixed-point integers are millimeters.
const FIXED_POINT_DIVISOR: f64 = 1000.0;

/// How the first 12 bytes of a record are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateEncoding {
    Float,
    FixedPoint,
}

impl CoordinateEncoding {
    fn read(self, bytes: &[u8], at: usize) -> Option<[f64; 3]> {
        match self {
            CoordinateEncoding::Float => Some([
                read_f32(bytes, at)? as f64,
                read_f32(bytes, at + 4)? as f64,
                read_f32(bytes, at + 8)? as f64,
            ]),
            CoordinateEncoding::FixedPoint => Some([
                read_i32(bytes, at)? as f64 / FIXED_POINT_DIVISOR,
                read_i32(bytes, at + 4)? as f64 / FIXED_POINT_DIVISOR,
                read_i32(bytes, at + 8)? as f64 / FIXED_POINT_DIVISOR,
            ]),
        }
    }
}

/// Outcome of sampling records under both encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeResult {
    pub float_hits: usize,
    pub int_hits: usize,
}

impl ProbeResult {
    /// Fixed-point wins only on a strict majority; ties go to float.
    pub fn encoding(&self) -> CoordinateEncoding {
        if self.int_hits > self.float_hits {
            CoordinateEncoding::FixedPoint
        } else {
            CoordinateEncoding::Float
        }
    }
}

/// Trust a leading record count only if it describes the buffer exactly,
/// allowing less than one stride of trailing slack.
fn accept_header_count(data: &[u8]) -> Option<u64> {
    let candidate = read_u32(data, 0)? as u64;
    if candidate == 0 {
        return None;
    }
    let expected = 4u64.checked_add(candidate.checked_mul(RECORD_STRIDE as u64)?)?;
    let total = data.len() as u64;
    if expected <= total && total - expected < RECORD_STRIDE as u64 {
        Some(candidate)
    } else {
        None
    }
}

/// Sample up to [`PROBE_SAMPLES`] evenly spaced records and count how many
/// are plausible under each encoding.
pub fn probe_encoding(records: &[u8], record_count: usize) -> ProbeResult {
    let samples = record_count.min(PROBE_SAMPLES);
    let mut result = ProbeResult {
        float_hits: 0,
        int_hits: 0,
    };
    for i in 0..samples {
        let record = i * record_count / samples;
        let at = record * RECORD_STRIDE;
        if CoordinateEncoding::Float
            .read(records, at)
            .is_some_and(is_valid_coordinate)
        {
            result.float_hits += 1;
        }
        if CoordinateEncoding::FixedPoint
            .read(records, at)
            .is_some_and(is_valid_coordinate)
        {
            result.int_hits += 1;
        }
    }
    result
}

/// Decode a binary point cloud.
///
/// `has_header_count` is a hint that the buffer may start with a `u32` record
/// count; the count is only used when it matches the buffer size.
#[tracing::instrument(skip_all, fields(bytes = data.len(), has_header_count))]
pub fn decode_binary_points(
    data: &[u8],
    has_header_count: bool,
    limits: &DecodeLimits,
) -> Result<PointCloud, DecodeError> {
    let declared_count = if has_header_count {
        accept_header_count(data)
    } else {
        None
    };
    let header_offset = if declared_count.is_some() { 4 } else { 0 };
    if has_header_count && declared_count.is_none() {
        debug!("Leading count does not match buffer size; treating it as point data");
    }

    let records = &data[header_offset..];
    if records.len() < RECORD_STRIDE {
        return Err(DecodeError::TooShort {
            needed: header_offset + RECORD_STRIDE,
            actual: data.len(),
        });
    }

    let available = records.len() / RECORD_STRIDE;
    let record_count = match declared_count {
        Some(declared) => available.min(usize::try_from(declared).unwrap_or(usize::MAX)),
        None => available,
    };
    if record_count == 0 {
        return Err(DecodeError::NoRecords);
    }

    let step = downsample_step(record_count, limits.max_points);
    let probe = probe_encoding(records, record_count);
    let encoding = probe.encoding();
    debug!(
        "Probe: {} float hits, {} fixed-point hits -> {:?}",
        probe.float_hits, probe.int_hits, encoding
    );

    let capacity = output_capacity(record_count, step, limits.max_points);
    let mut positions = Vec::with_capacity(capacity);
    let mut rejected = 0usize;
    for record in (0..record_count).step_by(step) {
        if positions.len() >= capacity {
            break;
        }
        match encoding.read(records, record * RECORD_STRIDE) {
            Some(xyz) if is_valid_coordinate(xyz) => {
                positions.push(Vec3::new(xyz[0] as f32, xyz[1] as f32, xyz[2] as f32));
            }
            _ => rejected += 1,
        }
    }
    positions.shrink_to_fit();

    if positions.is_empty() {
        warn!("All {} sampled records failed the magnitude guard", rejected);
        return Err(DecodeError::NoValidPoints {
            records: record_count,
        });
    }

    info!(
        "Decoded {} points from {} records (step {}, {} rejected)",
        positions.len(),
        record_count,
        step,
        rejected
    );

    let accepted_points = positions.len();
    Ok(PointCloud {
        positions,
        colors: None,
        metadata: PointCloudMetadata {
            source: PointSource::Binary,
            header_offset,
            declared_count,
            record_count,
            downsample_step: step,
            probe_float_hits: probe.float_hits,
            probe_int_hits: probe.int_hits,
            used_integer_mode: encoding == CoordinateEncoding::FixedPoint,
            accepted_points,
        },
    })
}
