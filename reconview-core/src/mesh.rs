//! Mesh data structures and primitive builders

use crate::point::*;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// A triangle mesh with vertices and faces in local space
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[usize; 3]>,
    pub normals: Option<Vec<Vector3f>>,
    pub colors: Option<Vec<[u8; 3]>>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            faces,
            normals: None,
            colors: None,
        }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Set vertex normals
    pub fn set_normals(&mut self, normals: Vec<Vector3f>) {
        if normals.len() == self.vertices.len() {
            self.normals = Some(normals);
        }
    }

    /// Set vertex colors
    pub fn set_colors(&mut self, colors: Vec<[u8; 3]>) {
        if colors.len() == self.vertices.len() {
            self.colors = Some(colors);
        }
    }

    /// Iterate over the corner positions of every face.
    ///
    /// Faces referencing vertices that do not exist are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3f; 3]> + '_ {
        self.faces.iter().filter_map(move |face| {
            Some([
                *self.vertices.get(face[0])?,
                *self.vertices.get(face[1])?,
                *self.vertices.get(face[2])?,
            ])
        })
    }

    /// Build a UV sphere centred on `center`.
    ///
    /// `segments` is the number of latitude rings; longitude uses twice as many.
    pub fn uv_sphere(center: Point3f, diameter: f32, segments: usize) -> Self {
        let rings = segments.max(2);
        let sectors = rings * 2;
        let radius = diameter * 0.5;

        let mut vertices = Vec::with_capacity((rings + 1) * (sectors + 1));
        let mut normals = Vec::with_capacity((rings + 1) * (sectors + 1));
        for i in 0..=rings {
            let phi = PI * i as f32 / rings as f32;
            for j in 0..=sectors {
                let theta = 2.0 * PI * j as f32 / sectors as f32;
                let n = Vector3f::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
                vertices.push(center + n * radius);
                normals.push(n);
            }
        }

        let stride = sectors + 1;
        let mut faces = Vec::with_capacity(rings * sectors * 2);
        for i in 0..rings {
            for j in 0..sectors {
                let a = i * stride + j;
                let b = a + stride;
                faces.push([a, b, a + 1]);
                faces.push([a + 1, b, b + 1]);
            }
        }

        let mut mesh = Self::from_vertices_and_faces(vertices, faces);
        mesh.set_normals(normals);
        mesh
    }

    /// Build an open tube of constant `radius` from `start` to `end`.
    ///
    /// Returns an empty mesh when the two endpoints coincide.
    pub fn tube(start: Point3f, end: Point3f, radius: f32, tessellation: usize) -> Self {
        let axis = end - start;
        let length = axis.norm();
        if length <= f32::EPSILON {
            return Self::new();
        }
        let dir = axis / length;
        let helper = if dir.x.abs() < 0.9 { Vector3f::x() } else { Vector3f::y() };
        let u = dir.cross(&helper).normalize();
        let v = dir.cross(&u);

        let sides = tessellation.max(3);
        let mut vertices = Vec::with_capacity(sides * 2);
        let mut normals = Vec::with_capacity(sides * 2);
        for cap in [start, end] {
            for k in 0..sides {
                let angle = 2.0 * PI * k as f32 / sides as f32;
                let n = u * angle.cos() + v * angle.sin();
                vertices.push(cap + n * radius);
                normals.push(n);
            }
        }

        let mut faces = Vec::with_capacity(sides * 2);
        for k in 0..sides {
            let next = (k + 1) % sides;
            faces.push([k, next, sides + k]);
            faces.push([next, sides + next, sides + k]);
        }

        let mut mesh = Self::from_vertices_and_faces(vertices, faces);
        mesh.set_normals(normals);
        mesh
    }
}
