//! PLY format support

use crate::{IoError, IoResult, LoadedAsset, LoadedMesh};
use ply_rs::{parser::Parser, ply::{DefaultElement, Property}};
use reconview_core::{Point3f, TriangleMesh, Vector3f};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Read a PLY file as a single mesh.
///
/// Faces with more than three corners are fan-triangulated; a file without
/// faces yields a mesh with vertices only, which still takes part in framing.
pub fn read_ply(path: &Path) -> IoResult<LoadedAsset> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let parser = Parser::<DefaultElement>::new();
    let ply = parser.read_ply(&mut reader)?;

    let mut vertices = Vec::new();
    let mut normals = Vec::new();
    let mut colors = Vec::new();
    if let Some(vertex_element) = ply.payload.get("vertex") {
        for vertex in vertex_element {
            let x = extract_property_value(vertex, "x")?;
            let y = extract_property_value(vertex, "y")?;
            let z = extract_property_value(vertex, "z")?;
            vertices.push(Point3f::new(x, y, z));

            if let (Ok(nx), Ok(ny), Ok(nz)) = (
                extract_property_value(vertex, "nx"),
                extract_property_value(vertex, "ny"),
                extract_property_value(vertex, "nz"),
            ) {
                normals.push(Vector3f::new(nx, ny, nz));
            }
            if let (Some(r), Some(g), Some(b)) = (
                extract_color(vertex, "red"),
                extract_color(vertex, "green"),
                extract_color(vertex, "blue"),
            ) {
                colors.push([r, g, b]);
            }
        }
    }

    let mut faces = Vec::new();
    if let Some(face_element) = ply.payload.get("face") {
        for face in face_element {
            let indices = extract_face_indices(face)?;
            for k in 1..indices.len().saturating_sub(1) {
                faces.push([indices[0], indices[k], indices[k + 1]]);
            }
        }
    }

    let mut mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
    mesh.set_normals(normals);
    mesh.set_colors(colors);

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("ply")
        .to_string();
    Ok(LoadedAsset {
        meshes: vec![LoadedMesh::new(name, mesh)],
    })
}

/// Extract a property value as f32 from a PLY element
fn extract_property_value(element: &DefaultElement, name: &str) -> IoResult<f32> {
    match element.get(name) {
        Some(Property::Float(val)) => Ok(*val),
        Some(Property::Double(val)) => Ok(*val as f32),
        Some(Property::Int(val)) => Ok(*val as f32),
        Some(Property::UInt(val)) => Ok(*val as f32),
        Some(Property::Short(val)) => Ok(*val as f32),
        Some(Property::UShort(val)) => Ok(*val as f32),
        _ => Err(IoError::ParseError {
            message: format!("Property '{}' not found or invalid type", name),
        }),
    }
}

fn extract_color(element: &DefaultElement, name: &str) -> Option<u8> {
    match element.get(name) {
        Some(Property::UChar(val)) => Some(*val),
        Some(Property::Float(val)) => Some((val.clamp(0.0, 1.0) * 255.0).round() as u8),
        _ => None,
    }
}

/// Extract face indices from a PLY face element
fn extract_face_indices(element: &DefaultElement) -> IoResult<Vec<usize>> {
    match element.get("vertex_indices").or_else(|| element.get("vertex_index")) {
        Some(Property::ListInt(indices)) => Ok(indices.iter().map(|&idx| idx as usize).collect()),
        Some(Property::ListUInt(indices)) => Ok(indices.iter().map(|&idx| idx as usize).collect()),
        _ => Err(IoError::ParseError {
            message: "Face indices not found".to_string(),
        }),
    }
}
