//! Pose-location point sets: four values per record, the fourth ignored.

use glam::Vec3;
use tracing::info;

use super::text::parse_numbers;
use crate::error::DecodeError;
use crate::sampling::{downsample_step, output_capacity};
use crate::types::{DecodeLimits, PoseLocations};

pub const POSE_LOCATION_VALUES: usize = 4;

/// Decode pose locations from whitespace-delimited text.
///
/// Unlike pose tracks, a single non-finite retained coordinate rejects the
/// whole file.
#[tracing::instrument(skip_all, fields(chars = text.len()))]
pub fn decode_pose_locations(
    text: &str,
    limits: &DecodeLimits,
) -> Result<PoseLocations, DecodeError> {
    let values = parse_numbers(text);
    if values.len() < POSE_LOCATION_VALUES {
        return Err(DecodeError::NotEnoughValues {
            needed: POSE_LOCATION_VALUES,
            found: values.len(),
        });
    }

    let record_count = values.len() / POSE_LOCATION_VALUES;
    if record_count == 0 {
        return Err(DecodeError::NoRecords);
    }
    let step = downsample_step(record_count, limits.max_pose_location_points);
    let capacity = output_capacity(record_count, step, limits.max_pose_location_points);

    let mut positions = Vec::with_capacity(capacity);
    for (i, record) in values
        .chunks_exact(POSE_LOCATION_VALUES)
        .enumerate()
        .step_by(step)
        .take(capacity)
    {
        let position = Vec3::new(record[0], record[1], record[2]);
        if !position.is_finite() {
            return Err(DecodeError::NonFinite { record: i });
        }
        positions.push(position);
    }

    info!(
        "Decoded {} pose locations from {} records (step {})",
        positions.len(),
        record_count,
        step
    );
    Ok(PoseLocations {
        positions,
        record_count,
        downsample_step: step,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twelve_numbers_make_three_points() {
        let text = "1 2 3 0\n4 5 6 0\n7 8 9 0\n";
        let locations = decode_pose_locations(text, &DecodeLimits::default()).unwrap();
        assert_eq!(locations.positions.len(), 3);
        assert!(locations.positions.iter().all(|p| p.is_finite()));
        assert_eq!(locations.positions[2], Vec3::new(7.0, 8.0, 9.0));
        assert_eq!(locations.flat_positions().len(), 9);
    }

    #[test]
    fn test_too_few_values_fails() {
        assert!(matches!(
            decode_pose_locations("1 2 3", &DecodeLimits::default()),
            Err(DecodeError::NotEnoughValues { found: 3, .. })
        ));
        assert!(decode_pose_locations("", &DecodeLimits::default()).is_err());
    }

    #[test]
    fn test_fourth_column_ignored() {
        let text = "1 2 3 nan";
        let locations = decode_pose_locations(text, &DecodeLimits::default()).unwrap();
        assert_eq!(locations.positions, vec![Vec3::new(1.0, 2.0, 3.0)]);
    }

    #[test]
    fn test_non_finite_coordinate_fails() {
        let text = "1 2 3 0\n4 inf 6 0";
        assert_eq!(
            decode_pose_locations(text, &DecodeLimits::default()),
            Err(DecodeError::NonFinite { record: 1 })
        );
    }

    #[test]
    fn test_skipped_records_are_not_checked() {
        let limits = DecodeLimits {
            max_pose_location_points: 2,
            ..DecodeLimits::default()
        };
        // Step 2 keeps records 0 and 2; the garbage in record 1 is never read.
        let text = "0 0 0 0\nx x x x\n2 2 2 0\n3 3 3 0";
        let locations = decode_pose_locations(text, &limits).unwrap();
        assert_eq!(locations.downsample_step, 2);
        assert_eq!(
            locations.positions,
            vec![Vec3::ZERO, Vec3::splat(2.0)]
        );
    }
}
