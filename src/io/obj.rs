//! Wavefront OBJ support.
//!
//! Reads `v`, `vt` and `f` records. Faces may be arbitrary polygons and each
//! corner may carry its own texture coordinate (`f 1/1 2/2 3/5`). Negative
//! indices count back from the most recent record. Normals, groups and
//! materials are ignored on load and not written on save.
//!
//! Faces without texture coordinates get zero UVs. Every loaded face is
//! visible and selected, and every loop is UV-selected.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::{Point2, Point3};

use crate::error::{Result, UvError};
use crate::mesh::{build_with_uvs, to_face_vertex, EditMesh, MeshIndex};

/// Load an OBJ file.
///
/// # Example
///
/// ```no_run
/// use pixel_uv::io::obj;
/// use pixel_uv::mesh::EditMesh;
///
/// let mesh: EditMesh = obj::load("model.obj").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<EditMesh<I>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    parse(&contents).map_err(|e| match e {
        UvError::LoadError { message, .. } => UvError::LoadError {
            path: path.to_path_buf(),
            message,
        },
        other => other,
    })
}

/// Parse OBJ text.
pub fn parse<I: MeshIndex>(contents: &str) -> Result<EditMesh<I>> {
    let mut positions: Vec<Point3<f64>> = Vec::new();
    let mut tex_coords: Vec<Point2<f64>> = Vec::new();
    let mut faces: Vec<Vec<usize>> = Vec::new();
    let mut face_uvs: Vec<Vec<Point2<f64>>> = Vec::new();

    for (line_num, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };
        let values: Vec<&str> = parts.collect();

        match keyword {
            "v" => {
                if values.len() < 3 {
                    return Err(parse_error(line_num, "vertex needs 3 coordinates"));
                }
                positions.push(Point3::new(
                    parse_float(values[0], line_num)?,
                    parse_float(values[1], line_num)?,
                    parse_float(values[2], line_num)?,
                ));
            }
            "vt" => {
                if values.len() < 2 {
                    return Err(parse_error(line_num, "texture coordinate needs 2 values"));
                }
                tex_coords.push(Point2::new(
                    parse_float(values[0], line_num)?,
                    parse_float(values[1], line_num)?,
                ));
            }
            "f" => {
                if values.len() < 3 {
                    return Err(parse_error(line_num, "face needs at least 3 corners"));
                }
                let mut corners = Vec::with_capacity(values.len());
                let mut uvs = Vec::with_capacity(values.len());
                for corner in &values {
                    let mut refs = corner.split('/');
                    let v = refs
                        .next()
                        .ok_or_else(|| parse_error(line_num, "empty face corner"))?;
                    corners.push(resolve(v, positions.len(), line_num)?);

                    let uv = match refs.next() {
                        Some(vt) if !vt.is_empty() => {
                            tex_coords[resolve(vt, tex_coords.len(), line_num)?]
                        }
                        _ => Point2::origin(),
                    };
                    uvs.push(uv);
                }
                faces.push(corners);
                face_uvs.push(uvs);
            }
            _ => {}
        }
    }

    if faces.is_empty() {
        return Err(UvError::EmptyMesh);
    }

    build_with_uvs(&positions, &faces, &face_uvs)
}

/// Save a mesh to an OBJ file, one `vt` per face corner.
///
/// # Example
///
/// ```no_run
/// use pixel_uv::io::obj;
/// use pixel_uv::mesh::EditMesh;
///
/// let mesh: EditMesh = obj::load("model.obj").unwrap();
/// obj::save(&mesh, "output.obj").unwrap();
/// ```
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &EditMesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write(mesh, &mut writer).map_err(|e| UvError::SaveError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Write a mesh as OBJ text.
pub fn write<I: MeshIndex, W: Write>(mesh: &EditMesh<I>, writer: &mut W) -> std::io::Result<()> {
    let (vertices, faces, uvs) = to_face_vertex(mesh);

    writeln!(writer, "# pixel-uv")?;
    for p in &vertices {
        writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
    }
    for uv in uvs.iter().flatten() {
        writeln!(writer, "vt {} {}", uv.x, uv.y)?;
    }

    let mut next_vt = 1;
    for face in &faces {
        write!(writer, "f")?;
        for &v in face {
            write!(writer, " {}/{}", v + 1, next_vt)?;
            next_vt += 1;
        }
        writeln!(writer)?;
    }
    writer.flush()
}

/// Turn a 1-based or negative OBJ reference into a 0-based index.
fn resolve(token: &str, count: usize, line_num: usize) -> Result<usize> {
    let index: i64 = token
        .parse()
        .map_err(|_| parse_error(line_num, "invalid index"))?;
    let resolved = if index > 0 {
        index - 1
    } else if index < 0 {
        count as i64 + index
    } else {
        return Err(parse_error(line_num, "index 0 is not valid"));
    };
    if resolved < 0 || resolved >= count as i64 {
        return Err(parse_error(line_num, "index out of range"));
    }
    Ok(resolved as usize)
}

fn parse_float(token: &str, line_num: usize) -> Result<f64> {
    token
        .parse()
        .map_err(|_| parse_error(line_num, "invalid number"))
}

fn parse_error(line_num: usize, message: &str) -> UvError {
    UvError::LoadError {
        path: Default::default(),
        message: format!("line {}: {}", line_num + 1, message),
    }
}
