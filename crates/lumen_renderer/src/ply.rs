//! Minimal ASCII PLY loader for triangle meshes.
//!
//! Reads per-vertex positions, optional normals (`nx ny nz`) and texture
//! coordinates (`u v` or `s t`), plus face index lists. Faces with more than
//! three vertices are triangulated as fans. Binary PLY is not supported.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::shape::Vertex;
use lumen_math::{Vec2, Vec3};
use thiserror::Error;

/// Errors raised while reading a PLY file.
#[derive(Error, Debug)]
pub enum PlyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a PLY file")]
    MissingMagic,

    #[error("unsupported PLY format '{0}' (only ascii 1.0)")]
    UnsupportedFormat(String),

    #[error("malformed PLY at line {line}: {message}")]
    Parse { line: usize, message: String },
}

pub type PlyResult<T> = Result<T, PlyError>;

#[derive(Default)]
struct VertexLayout {
    /// Column index of each known property, if declared.
    x: Option<usize>,
    y: Option<usize>,
    z: Option<usize>,
    nx: Option<usize>,
    ny: Option<usize>,
    nz: Option<usize>,
    u: Option<usize>,
    v: Option<usize>,
    count: usize,
}

/// Load a triangle mesh as `(triangles, vertices)`.
pub fn load_ply(path: impl AsRef<Path>) -> PlyResult<(Vec<[u32; 3]>, Vec<Vertex>)> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let mut lines = reader.lines().enumerate();

    let parse_err = |line: usize, message: &str| PlyError::Parse {
        line: line + 1,
        message: message.to_string(),
    };

    // --- header ---
    match lines.next() {
        Some((_, Ok(magic))) if magic.trim() == "ply" => {}
        _ => return Err(PlyError::MissingMagic),
    }

    let mut vertex_count = 0usize;
    let mut face_count = 0usize;
    let mut layout = VertexLayout::default();
    let mut current_element = String::new();

    for (line_no, line) in &mut lines {
        let line = line?;
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("comment") | None => continue,
            Some("format") => {
                let format: Vec<&str> = tokens.collect();
                if format.first() != Some(&"ascii") {
                    return Err(PlyError::UnsupportedFormat(format.join(" ")));
                }
            }
            Some("element") => {
                let name = tokens
                    .next()
                    .ok_or_else(|| parse_err(line_no, "element without name"))?;
                let count: usize = tokens
                    .next()
                    .and_then(|c| c.parse().ok())
                    .ok_or_else(|| parse_err(line_no, "element without count"))?;
                current_element = name.to_string();
                match name {
                    "vertex" => vertex_count = count,
                    "face" => face_count = count,
                    _ => {}
                }
            }
            Some("property") => {
                if current_element != "vertex" {
                    continue;
                }
                // property <type> <name>; list properties belong to faces.
                let tokens: Vec<&str> = tokens.collect();
                if tokens.first() == Some(&"list") {
                    continue;
                }
                if let Some(name) = tokens.last() {
                    let slot = layout.count;
                    match *name {
                        "x" => layout.x = Some(slot),
                        "y" => layout.y = Some(slot),
                        "z" => layout.z = Some(slot),
                        "nx" => layout.nx = Some(slot),
                        "ny" => layout.ny = Some(slot),
                        "nz" => layout.nz = Some(slot),
                        "u" | "s" => layout.u = Some(slot),
                        "v" | "t" => layout.v = Some(slot),
                        _ => {}
                    }
                }
                layout.count += 1;
            }
            Some("end_header") => break,
            Some(_) => continue,
        }
    }

    if layout.x.is_none() || layout.y.is_none() || layout.z.is_none() {
        return Err(PlyError::Parse {
            line: 0,
            message: "vertex element lacks x/y/z properties".to_string(),
        });
    }

    // --- vertex data ---
    let mut vertices = Vec::with_capacity(vertex_count);
    while vertices.len() < vertex_count {
        let (line_no, line) = lines
            .next()
            .ok_or_else(|| parse_err(0, "unexpected end of file in vertex data"))?;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<f32> = line
            .split_whitespace()
            .map(|t| t.parse::<f32>())
            .collect::<Result<_, _>>()
            .map_err(|_| parse_err(line_no, "non-numeric vertex data"))?;
        if fields.len() < layout.count {
            return Err(parse_err(line_no, "truncated vertex row"));
        }

        let fetch = |slot: Option<usize>| slot.map(|i| fields[i]).unwrap_or(0.0);
        vertices.push(Vertex {
            position: Vec3::new(
                fetch(layout.x),
                fetch(layout.y),
                fetch(layout.z),
            ),
            normal: Vec3::new(fetch(layout.nx), fetch(layout.ny), fetch(layout.nz)),
            uv: Vec2::new(fetch(layout.u), fetch(layout.v)),
        });
    }

    // --- face data ---
    let mut triangles = Vec::with_capacity(face_count);
    let mut faces_read = 0usize;
    while faces_read < face_count {
        let (line_no, line) = lines
            .next()
            .ok_or_else(|| parse_err(0, "unexpected end of file in face data"))?;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let indices: Vec<u32> = line
            .split_whitespace()
            .map(|t| t.parse::<u32>())
            .collect::<Result<_, _>>()
            .map_err(|_| parse_err(line_no, "non-integer face data"))?;
        let (&n, rest) = indices
            .split_first()
            .ok_or_else(|| parse_err(line_no, "empty face row"))?;
        if rest.len() != n as usize || n < 3 {
            return Err(parse_err(line_no, "face index count mismatch"));
        }
        if let Some(bad) = rest.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(parse_err(line_no, &format!("vertex index {bad} out of range")));
        }

        // Fan triangulation for quads and larger polygons.
        for i in 1..rest.len() - 1 {
            triangles.push([rest[0], rest[i], rest[i + 1]]);
        }
        faces_read += 1;
    }

    log::info!(
        "loaded ply {} with {} triangles, {} vertices",
        path.display(),
        triangles.len(),
        vertices.len()
    );
    Ok((triangles, vertices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "lumen_ply_test_{}_{}.ply",
            std::process::id(),
            content.len()
        ));
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    const QUAD: &str = "\
ply
format ascii 1.0
comment unit quad
element vertex 4
property float x
property float y
property float z
property float nx
property float ny
property float nz
property float u
property float v
element face 1
property list uchar int vertex_indices
end_header
0 0 0 0 0 1 0 0
1 0 0 0 0 1 1 0
1 1 0 0 0 1 1 1
0 1 0 0 0 1 0 1
4 0 1 2 3
";

    #[test]
    fn test_load_quad_triangulates() {
        let path = write_temp(QUAD);
        let (triangles, vertices) = load_ply(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(vertices.len(), 4);
        assert_eq!(triangles.len(), 2);
        assert_eq!(triangles[0], [0, 1, 2]);
        assert_eq!(triangles[1], [0, 2, 3]);
        assert_eq!(vertices[2].position, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(vertices[2].normal, Vec3::Z);
        assert_eq!(vertices[2].uv, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_positions_only() {
        let content = "\
ply
format ascii 1.0
element vertex 3
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
0 1 0
3 0 1 2
";
        let path = write_temp(content);
        let (triangles, vertices) = load_ply(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(triangles.len(), 1);
        assert_eq!(vertices[1].position, Vec3::X);
        assert_eq!(vertices[1].normal, Vec3::ZERO);
    }

    #[test]
    fn test_rejects_binary() {
        let content = "ply\nformat binary_little_endian 1.0\nend_header\n";
        let path = write_temp(content);
        let result = load_ply(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(PlyError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_rejects_non_ply() {
        let content = "obj\nv 0 0 0\n";
        let path = write_temp(content);
        let result = load_ply(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(PlyError::MissingMagic)));
    }

    #[test]
    fn test_rejects_out_of_range_index() {
        let content = "\
ply
format ascii 1.0
element vertex 3
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
0 1 0
3 0 1 9
";
        let path = write_temp(content);
        let result = load_ply(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(PlyError::Parse { .. })));
    }
}
