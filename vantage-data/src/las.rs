//! Decoder for LAS 1.x point records.
//!
//! Only the public header fields needed to locate and scale point records are
//! read. Variable length records, waveform packets and compressed LAZ data are
//! ignored.

use glam::{DVec3, Vec3};
use tracing::{debug, info, warn};

use crate::error::DecodeError;
use crate::sampling::{
    downsample_step, is_valid_coordinate, output_capacity, read_f64, read_i32, read_u16, read_u32,
    read_u64,
};
use crate::types::{DecodeLimits, PointCloud, PointCloudMetadata, PointSource};

pub const LAS_SIGNATURE: &[u8; 4] = b"LASF";
/// Smallest public header (LAS 1.0-1.2).
pub const MIN_HEADER_SIZE: usize = 227;

const OFFSET_TO_POINT_DATA: usize = 96;
const POINT_FORMAT: usize = 104;
const RECORD_LENGTH: usize = 105;
const LEGACY_POINT_COUNT: usize = 107;
const SCALE: usize = 131;
const OFFSET: usize = 155;
const EXTENDED_POINT_COUNT: usize = 247;

const COLOR_NORMALIZE: f32 = 1.0 / 65535.0;

/// Fields of the LAS public header used for decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct LasHeader {
    pub signature: [u8; 4],
    pub point_data_format: u8,
    pub record_stride: usize,
    pub offset_to_point_data: usize,
    pub point_count: u64,
    pub scale: DVec3,
    pub offset: DVec3,
}

impl LasHeader {
    /// Parse and validate the header against the buffer that holds it.
    pub fn parse(data: &[u8]) -> Result<Self, DecodeError> {
        if data.len() < MIN_HEADER_SIZE {
            return Err(DecodeError::TooShort {
                needed: MIN_HEADER_SIZE,
                actual: data.len(),
            });
        }
        if &data[0..4] != LAS_SIGNATURE {
            return Err(DecodeError::BadSignature { expected: "LASF" });
        }

        let truncated = || DecodeError::InvalidHeader("truncated public header".into());
        let record_stride = read_u16(data, RECORD_LENGTH).ok_or_else(truncated)? as usize;
        let point_data_format = data[POINT_FORMAT] & 0x0F;
        let offset_to_point_data =
            read_u32(data, OFFSET_TO_POINT_DATA).ok_or_else(truncated)? as usize;

        let mut point_count = read_u32(data, LEGACY_POINT_COUNT).ok_or_else(truncated)? as u64;
        if point_count == 0 {
            if let Some(extended) = read_u64(data, EXTENDED_POINT_COUNT).filter(|&c| c > 0) {
                debug!("Using extended point count {}", extended);
                point_count = extended;
            }
        }

        let axis = |base: usize| -> Result<DVec3, DecodeError> {
            Ok(DVec3::new(
                read_f64(data, base).ok_or_else(truncated)?,
                read_f64(data, base + 8).ok_or_else(truncated)?,
                read_f64(data, base + 16).ok_or_else(truncated)?,
            ))
        };
        let scale = axis(SCALE)?;
        let offset = axis(OFFSET)?;

        if record_stride == 0 {
            return Err(DecodeError::InvalidHeader(
                "point data record length is zero".into(),
            ));
        }
        if offset_to_point_data > data.len() {
            return Err(DecodeError::InvalidHeader(format!(
                "point data offset {} beyond buffer of {} bytes",
                offset_to_point_data,
                data.len()
            )));
        }

        Ok(Self {
            signature: *LAS_SIGNATURE,
            point_data_format,
            record_stride,
            offset_to_point_data,
            point_count,
            scale,
            offset,
        })
    }

    /// Byte offset of the RGB triple inside a record, for formats that carry one.
    pub fn color_offset(&self) -> Option<usize> {
        let offset = match self.point_data_format {
            2 => 20,
            3 => 28,
            _ => return None,
        };
        // Records too short to hold the triple are read without color.
        (offset + 6 <= self.record_stride).then_some(offset)
    }

    /// Records that are both declared and present in a buffer of `len` bytes.
    pub fn available_records(&self, len: usize) -> usize {
        let present = (len - self.offset_to_point_data) / self.record_stride;
        usize::try_from(self.point_count)
            .unwrap_or(usize::MAX)
            .min(present)
    }
}

fn read_color(record: &[u8], at: usize) -> Option<Vec3> {
    let channel = |i: usize| {
        read_u16(record, at + i * 2).map(|v| (v as f32 * COLOR_NORMALIZE).min(1.0))
    };
    Some(Vec3::new(channel(0)?, channel(1)?, channel(2)?))
}

/// Decode the point records of a LAS file.
#[tracing::instrument(skip_all, fields(bytes = data.len()))]
pub fn decode_las(data: &[u8], limits: &DecodeLimits) -> Result<PointCloud, DecodeError> {
    let header = LasHeader::parse(data)?;
    let total_records = header.available_records(data.len());
    if total_records == 0 {
        return Err(DecodeError::NoRecords);
    }
    debug!(
        "LAS format {}, stride {}, {} records at offset {}",
        header.point_data_format,
        header.record_stride,
        total_records,
        header.offset_to_point_data
    );

    let step = downsample_step(total_records, limits.max_points);
    let capacity = output_capacity(total_records, step, limits.max_points);
    let color_offset = header.color_offset();

    let mut positions = Vec::with_capacity(capacity);
    let mut colors = color_offset.map(|_| Vec::with_capacity(capacity));
    let points = &data[header.offset_to_point_data..];

    for record in (0..total_records).step_by(step) {
        if positions.len() >= capacity {
            break;
        }
        let start = record * header.record_stride;
        let bytes = &points[start..start + header.record_stride];
        let (Some(x), Some(y), Some(z)) =
            (read_i32(bytes, 0), read_i32(bytes, 4), read_i32(bytes, 8))
        else {
            continue;
        };
        let world = DVec3::new(x as f64, y as f64, z as f64) * header.scale + header.offset;
        if !is_valid_coordinate(world.to_array()) {
            continue;
        }
        let color = match color_offset {
            Some(at) => match read_color(bytes, at) {
                Some(c) => Some(c),
                None => continue,
            },
            None => None,
        };
        positions.push(world.as_vec3());
        if let (Some(colors), Some(color)) = (colors.as_mut(), color) {
            colors.push(color);
        }
    }

    if positions.is_empty() {
        warn!("No LAS record passed the magnitude guard");
        return Err(DecodeError::NoValidPoints {
            records: total_records,
        });
    }
    positions.shrink_to_fit();
    if let Some(colors) = colors.as_mut() {
        colors.shrink_to_fit();
    }

    info!(
        "Decoded {} LAS points from {} records (step {}, color: {})",
        positions.len(),
        total_records,
        step,
        colors.is_some()
    );

    let accepted_points = positions.len();
    Ok(PointCloud {
        positions,
        colors,
        metadata: PointCloudMetadata {
            source: PointSource::Las,
            header_offset: header.offset_to_point_data,
            declared_count: Some(header.point_count),
            record_count: total_records,
            downsample_step: step,
            probe_float_hits: 0,
            probe_int_hits: 0,
            // LAS always stores scaled integer coordinates.
            used_integer_mode: true,
            accepted_points,
        },
    })
}
