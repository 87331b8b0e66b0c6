//! PLY meshes via `serde-ply`.

use glam::Vec3;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::error::DecodeError;
use crate::types::Mesh;

#[derive(Deserialize, Debug)]
struct PlyFace {
    #[serde(alias = "vertex_index")]
    vertex_indices: Vec<i64>,
}

#[derive(Deserialize, Debug)]
struct PlyFile {
    #[serde(rename = "vertex")]
    vertex: Vec<HashMap<String, JsonValue>>,
    #[serde(default, rename = "face")]
    face: Vec<PlyFace>,
}

fn get_f32(prop: Option<&JsonValue>) -> Option<f32> {
    prop.and_then(JsonValue::as_f64).map(|f| f as f32)
}

fn get_channel(prop: Option<&JsonValue>) -> Option<f32> {
    prop.and_then(JsonValue::as_u64)
        .map(|u| u.min(255) as f32 / 255.0)
}

fn vertex_color(vertex: &HashMap<String, JsonValue>) -> Option<Vec3> {
    ["red", "green", "blue"]
        .iter()
        .zip(["r", "g", "b"])
        .map(|(long, short)| get_channel(vertex.get(*long)).or_else(|| get_channel(vertex.get(short))))
        .collect::<Option<Vec<f32>>>()
        .map(|c| Vec3::new(c[0], c[1], c[2]))
}

/// Fan-triangulate a polygon, dropping faces with out-of-range indices.
fn triangulate_face(face: &PlyFace, vertex_count: usize) -> Option<Vec<[u32; 3]>> {
    let indices = face
        .vertex_indices
        .iter()
        .map(|&i| u32::try_from(i).ok().filter(|&i| (i as usize) < vertex_count))
        .collect::<Option<Vec<u32>>>()?;
    if indices.len() < 3 {
        return None;
    }
    Some(
        (1..indices.len() - 1)
            .map(|k| [indices[0], indices[k], indices[k + 1]])
            .collect(),
    )
}

/// Import a PLY mesh (ASCII or binary) from memory.
#[tracing::instrument(skip_all, fields(bytes = data.len()))]
pub fn import_ply_mesh(data: &[u8]) -> Result<Mesh, DecodeError> {
    let ply: PlyFile = serde_ply::from_reader(data).map_err(|e| {
        warn!("Failed to parse PLY file: {}", e);
        DecodeError::Mesh(e.to_string())
    })?;
    debug!(
        "PLY parsed: {} vertices, {} faces",
        ply.vertex.len(),
        ply.face.len()
    );

    let mut positions = Vec::with_capacity(ply.vertex.len());
    let mut colors = Vec::with_capacity(ply.vertex.len());
    for (i, vertex) in ply.vertex.iter().enumerate() {
        let (Some(x), Some(y), Some(z)) = (
            get_f32(vertex.get("x")),
            get_f32(vertex.get("y")),
            get_f32(vertex.get("z")),
        ) else {
            return Err(DecodeError::Mesh(format!("missing position at vertex {i}")));
        };
        positions.push(Vec3::new(x, y, z));
        colors.push(vertex_color(vertex));
    }
    if positions.is_empty() {
        return Err(DecodeError::NoRecords);
    }

    let colors = colors.into_iter().collect::<Option<Vec<Vec3>>>();
    let mut dropped = 0usize;
    let mut indices = Vec::new();
    for face in &ply.face {
        match triangulate_face(face, positions.len()) {
            Some(triangles) => indices.extend(triangles),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        warn!("Dropped {} degenerate or out-of-range faces", dropped);
    }

    info!(
        "Imported mesh: {} vertices, {} triangles, color: {}",
        positions.len(),
        indices.len(),
        colors.is_some()
    );
    Ok(Mesh {
        positions,
        colors,
        indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "ply
format ascii 1.0
element vertex 4
property float x
property float y
property float z
property uchar red
property uchar green
property uchar blue
element face 1
property list uchar int vertex_indices
end_header
0 0 0 255 0 0
1 0 0 0 255 0
1 1 0 0 0 255
0 1 0 255 255 255
4 0 1 2 3
";

    #[test]
    fn test_fan_triangulation() {
        let face = PlyFace {
            vertex_indices: vec![0, 1, 2, 3],
        };
        let triangles = triangulate_face(&face, 4).unwrap();
        assert_eq!(triangles, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_out_of_range_face_dropped() {
        let face = PlyFace {
            vertex_indices: vec![0, 1, 9],
        };
        assert!(triangulate_face(&face, 4).is_none());
        let face = PlyFace {
            vertex_indices: vec![0, 1],
        };
        assert!(triangulate_face(&face, 4).is_none());
    }

    #[test]
    fn test_import_ascii_quad() {
        let mesh = import_ply_mesh(QUAD.as_bytes()).unwrap();
        assert_eq!(mesh.positions.len(), 4);
        assert_eq!(mesh.indices.len(), 2);
        let colors = mesh.colors.unwrap();
        assert_eq!(colors[0], Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_garbage_fails() {
        assert!(import_ply_mesh(b"not a ply file").is_err());
    }
}
