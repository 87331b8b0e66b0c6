//! Camera-pose tracks and pose-location point sets.

mod locations;
mod text;
mod track;

pub use locations::{POSE_LOCATION_VALUES, decode_pose_locations};
pub use text::parse_numbers;
pub use track::{
    POSE_RECORD_STRIDE, POSE_RECORD_VALUES, PoseSource, decode_pose_track, decode_pose_track_auto,
    decode_pose_track_binary, decode_pose_track_text,
};
