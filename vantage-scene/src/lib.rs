//! Vantage Scene Crate
//!
//! Owns the single displayed object: fits it to a fixed span on the ground
//! plane, applies quarter-turn rotations and user scale, and lands background
//! loads only when they belong to the latest request. [`Navigator`] ties the
//! scene to the flight camera for a host frame loop.

pub mod bounds;
pub mod config;
pub mod controller;
pub mod error;
pub mod loader;
pub mod navigator;
pub mod normalizer;
pub mod object;
pub mod rotation;

pub use bounds::Aabb;
pub use config::SceneConfig;
pub use controller::{SceneController, SceneEvent, SceneStats};
pub use error::LoadError;
pub use loader::{LoadCompletion, LoadGeneration, LoadSource, LoadTicket, Loader, load_blocking};
pub use navigator::Navigator;
pub use normalizer::SpatialNormalizer;
pub use object::{ObjectGeometry, ObjectId, ObjectTransform, SceneObject};
pub use rotation::{Axis, ModelRotationController, ModelTransformState};
