//! Shared budget and validity helpers used by every decoder.

use crate::types::MAX_COORDINATE_MAGNITUDE;

/// Record-skip factor keeping the output under `budget`.
pub fn downsample_step(records: usize, budget: usize) -> usize {
    (records / budget.max(1)).max(1)
}

/// Number of output slots reserved for a downsampled pass.
///
/// Never more than `budget`, and never more than `records / step`.
pub fn output_capacity(records: usize, step: usize, budget: usize) -> usize {
    (records / step.max(1)).min(budget)
}

/// Magnitude guard: finite on every axis and within the sanity bound.
pub fn is_valid_coordinate(xyz: [f64; 3]) -> bool {
    xyz.iter()
        .all(|v| v.is_finite() && v.abs() <= MAX_COORDINATE_MAGNITUDE)
}

pub(crate) fn read_u16(bytes: &[u8], at: usize) -> Option<u16> {
    bytes
        .get(at..at + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
}

pub(crate) fn read_u32(bytes: &[u8], at: usize) -> Option<u32> {
    bytes
        .get(at..at + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

pub(crate) fn read_i32(bytes: &[u8], at: usize) -> Option<i32> {
    bytes
        .get(at..at + 4)
        .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

pub(crate) fn read_f32(bytes: &[u8], at: usize) -> Option<f32> {
    bytes
        .get(at..at + 4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

pub(crate) fn read_u64(bytes: &[u8], at: usize) -> Option<u64> {
    let b: [u8; 8] = bytes.get(at..at + 8)?.try_into().ok()?;
    Some(u64::from_le_bytes(b))
}

pub(crate) fn read_f64(bytes: &[u8], at: usize) -> Option<f64> {
    let b: [u8; 8] = bytes.get(at..at + 8)?.try_into().ok()?;
    Some(f64::from_le_bytes(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_is_one_under_budget() {
        assert_eq!(downsample_step(0, 10), 1);
        assert_eq!(downsample_step(10, 10), 1);
        assert_eq!(downsample_step(19, 10), 1);
        assert_eq!(downsample_step(20, 10), 2);
        assert_eq!(downsample_step(95, 10), 9);
    }

    #[test]
    fn test_capacity_respects_budget() {
        assert_eq!(output_capacity(19, 1, 10), 10);
        assert_eq!(output_capacity(95, 9, 10), 10);
        assert_eq!(output_capacity(7, 1, 10), 7);
    }

    #[test]
    fn test_magnitude_guard() {
        assert!(is_valid_coordinate([0.0, -1e7, 1e7]));
        assert!(!is_valid_coordinate([1e7 + 1.0, 0.0, 0.0]));
        assert!(!is_valid_coordinate([f64::NAN, 0.0, 0.0]));
        assert!(!is_valid_coordinate([0.0, f64::INFINITY, 0.0]));
    }

    #[test]
    fn test_reads_past_end_are_none() {
        let bytes = [1u8, 0, 0];
        assert_eq!(read_u16(&bytes, 0), Some(1));
        assert_eq!(read_u32(&bytes, 0), None);
        assert_eq!(read_f64(&bytes, 0), None);
    }
}
