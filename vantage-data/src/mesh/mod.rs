//! Adapter for meshes parsed by third-party importers.
//!
//! The importer owns the file format; this module only reshapes its output
//! into a [`Mesh`](crate::types::Mesh) the scene can center and scale.

mod ply;

pub use ply::import_ply_mesh;
