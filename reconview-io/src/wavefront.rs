//! Wavefront OBJ support

use crate::{IoError, IoResult, LoadedAsset, LoadedMesh};
use obj::{IndexTuple, Obj, SimplePolygon};
use reconview_core::{Point3f, TriangleMesh};
use std::collections::HashMap;
use std::path::Path;

/// Read an OBJ file, producing one mesh per `o` object.
///
/// Polygons are fan-triangulated. Positions are shared across objects in
/// the file, so each object gets its own compacted vertex list.
pub fn read_obj(path: &Path) -> IoResult<LoadedAsset> {
    let obj = Obj::load(path).map_err(|e| IoError::ParseError {
        message: e.to_string(),
    })?;
    let positions = &obj.data.position;

    let mut meshes = Vec::new();
    for object in &obj.data.objects {
        let mut remap: HashMap<usize, usize> = HashMap::new();
        let mut vertices = Vec::new();
        let mut faces = Vec::new();

        for group in &object.groups {
            for SimplePolygon(corners) in &group.polys {
                let mut local = Vec::with_capacity(corners.len());
                for IndexTuple(position, _, _) in corners {
                    let [x, y, z] = *positions.get(*position).ok_or_else(|| IoError::ParseError {
                        message: format!("vertex index {} out of range", position),
                    })?;
                    let index = *remap.entry(*position).or_insert_with(|| {
                        vertices.push(Point3f::new(x, y, z));
                        vertices.len() - 1
                    });
                    local.push(index);
                }
                for k in 1..local.len().saturating_sub(1) {
                    faces.push([local[0], local[k], local[k + 1]]);
                }
            }
        }

        if vertices.is_empty() {
            continue;
        }
        meshes.push(LoadedMesh::new(
            object.name.clone(),
            TriangleMesh::from_vertices_and_faces(vertices, faces),
        ));
    }

    Ok(LoadedAsset { meshes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_objects_become_separate_meshes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two.obj");
        let content = "\
v 0 0 -1
v 1 0 -1
v 1 1 -1
v 0 1 -1
v 5 5 -4
v 6 5 -4
v 5 6 -4
o quad
f 1 2 3 4
o tri
f 5 6 7
";
        std::fs::write(&path, content).unwrap();

        let asset = read_obj(&path).unwrap();
        assert_eq!(asset.meshes.len(), 2);

        let quad = &asset.meshes[0];
        assert_eq!(quad.name, "quad");
        assert_eq!(quad.mesh.vertex_count(), 4);
        assert_eq!(quad.mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);

        let tri = &asset.meshes[1];
        assert_eq!(tri.mesh.vertices[0], Point3f::new(5.0, 5.0, -4.0));
        assert_eq!(tri.mesh.faces, vec![[0, 1, 2]]);
    }
}
