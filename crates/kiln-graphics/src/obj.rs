//! Minimal Wavefront OBJ reader: positions and faces only.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObjError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Bytes per vertex in [`ObjMesh::vertex_bytes`]: three `f32`s.
pub const OBJ_VERTEX_STRIDE: u32 = 12;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ObjMesh {
    pub positions: Vec<[f32; 3]>,
    /// Triangle list. Polygons are fanned from their first vertex.
    pub indices: Vec<u32>,
}

impl ObjMesh {
    pub fn load(path: &Path) -> Result<Self, ObjError> {
        Self::parse(BufReader::new(File::open(path)?))
    }

    pub fn parse(reader: impl BufRead) -> Result<Self, ObjError> {
        let mut mesh = ObjMesh::default();

        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            let number = number + 1;
            let parse_error = |message: String| ObjError::Parse {
                line: number,
                message,
            };

            let mut parts = line.split_whitespace();
            match parts.next() {
                Some("v") => {
                    let mut position = [0.0f32; 3];
                    for axis in &mut position {
                        let value = parts
                            .next()
                            .ok_or_else(|| parse_error("vertex needs three coordinates".to_string()))?;
                        *axis = value
                            .parse()
                            .map_err(|_| parse_error(format!("invalid coordinate {:?}", value)))?;
                    }
                    mesh.positions.push(position);
                }
                Some("f") => {
                    let face = parts
                        .map(|vertex| resolve_index(vertex, mesh.positions.len()))
                        .collect::<Option<Vec<u32>>>()
                        .ok_or_else(|| parse_error(format!("invalid face {:?}", line)))?;
                    if face.len() < 3 {
                        return Err(parse_error("face needs at least three vertices".to_string()));
                    }
                    for i in 1..face.len() - 1 {
                        mesh.indices.extend_from_slice(&[face[0], face[i], face[i + 1]]);
                    }
                }
                // normals, texture coordinates, groups, materials and comments
                _ => {}
            }
        }

        Ok(mesh)
    }

    pub fn vertex_bytes(&self) -> Vec<u8> {
        self.positions
            .iter()
            .flatten()
            .flat_map(|v| v.to_ne_bytes())
            .collect()
    }
}

/// Resolves a face vertex like `3`, `3/1/2` or `-1` to a zero based index.
fn resolve_index(vertex: &str, count: usize) -> Option<u32> {
    let index: i64 = vertex.split('/').next()?.parse().ok()?;
    let resolved = match index {
        0 => return None,
        i if i > 0 => i - 1,
        i => count as i64 + i,
    };

    (0..count as i64)
        .contains(&resolved)
        .then_some(resolved as u32)
}
