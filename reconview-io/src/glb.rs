//! glTF / GLB support
//!
//! Every triangle primitive reachable from the default scene becomes one
//! [`LoadedMesh`], carrying the world transform composed along its node path.

use crate::{IoError, IoResult, LoadedAsset, LoadedMesh};
use gltf::mesh::{util::ReadIndices, Mode};
use reconview_core::{Point3f, Transform3D, TriangleMesh, Vector3f};
use std::path::Path;

/// Read a `.glb` or `.gltf` file
pub fn read_gltf(path: &Path) -> IoResult<LoadedAsset> {
    let (doc, buffers, _images) = gltf::import(path)?;

    let mut meshes = Vec::new();
    match doc.default_scene().or_else(|| doc.scenes().next()) {
        Some(scene) => {
            for node in scene.nodes() {
                collect_node(&node, Transform3D::identity(), &buffers, &mut meshes)?;
            }
        }
        None => {
            // Scene-less files: take the meshes as they are.
            for mesh in doc.meshes() {
                collect_mesh(&mesh, Transform3D::identity(), &buffers, &mut meshes)?;
            }
        }
    }

    Ok(LoadedAsset { meshes })
}

fn collect_node(
    node: &gltf::Node,
    parent: Transform3D,
    buffers: &[gltf::buffer::Data],
    out: &mut Vec<LoadedMesh>,
) -> IoResult<()> {
    let world = parent * Transform3D::from_column_major(node.transform().matrix());
    if let Some(mesh) = node.mesh() {
        collect_mesh(&mesh, world, buffers, out)?;
    }
    for child in node.children() {
        collect_node(&child, world, buffers, out)?;
    }
    Ok(())
}

fn collect_mesh(
    mesh: &gltf::Mesh,
    world: Transform3D,
    buffers: &[gltf::buffer::Data],
    out: &mut Vec<LoadedMesh>,
) -> IoResult<()> {
    let name = mesh.name().unwrap_or("mesh").to_string();
    for prim in mesh.primitives() {
        if prim.mode() != Mode::Triangles {
            log::debug!("Skipping non-triangle primitive in mesh '{}'", name);
            continue;
        }

        let reader = prim.reader(|b| buffers.get(b.index()).map(|bb| bb.0.as_slice()));
        let vertices: Vec<Point3f> = match reader.read_positions() {
            Some(it) => it.map(|[x, y, z]| Point3f::new(x, y, z)).collect(),
            None => continue,
        };
        let indices: Vec<u32> = match reader.read_indices() {
            Some(ReadIndices::U8(it)) => it.map(u32::from).collect(),
            Some(ReadIndices::U16(it)) => it.map(u32::from).collect(),
            Some(ReadIndices::U32(it)) => it.collect(),
            None => (0..vertices.len() as u32).collect(),
        };
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(IoError::ParseError {
                message: format!("index {} out of range in mesh '{}'", bad, name),
            });
        }
        let faces = indices
            .chunks_exact(3)
            .map(|f| [f[0] as usize, f[1] as usize, f[2] as usize])
            .collect();

        let mut tri = TriangleMesh::from_vertices_and_faces(vertices, faces);
        if let Some(it) = reader.read_normals() {
            tri.set_normals(it.map(|[x, y, z]| Vector3f::new(x, y, z)).collect());
        }

        let [r, g, b, _] = prim.material().pbr_metallic_roughness().base_color_factor();
        out.push(LoadedMesh {
            name: name.clone(),
            mesh: tri,
            transform: world,
            base_color: Some([r, g, b]),
        });
    }
    Ok(())
}
