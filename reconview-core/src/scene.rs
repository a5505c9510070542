//! Scene graph owned by a viewer
//!
//! A [`Scene`] holds the renderable nodes and the materials they reference.
//! Cameras and lights are not part of it; they belong to the viewer, which
//! lets an asset load wipe the scene wholesale without touching either.

use crate::{mesh::TriangleMesh, point::*, transform::Transform3D};
use serde::{Deserialize, Serialize};

/// Handle to a node in a [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u64);

/// Handle to a material in a [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialId(u64);

/// Neutral grey used by the untextured display mode
pub const PLAIN_DIFFUSE: Color3 = [0.4, 0.4, 0.4];

/// Orange `#f08f35` used for measurement markers
pub const ANNOTATION_EMISSIVE: Color3 = [240.0 / 255.0, 143.0 / 255.0, 53.0 / 255.0];

/// How a node's vertices are assembled into primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Topology {
    /// Faces index triangles
    #[default]
    Triangles,
    /// Consecutive vertices form a polyline; faces are ignored
    Lines,
}

/// How a material shades its surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MaterialKind {
    /// Asset-provided appearance (base color factor, textures owned by the renderer)
    Textured { base_color: Color3 },
    /// Lit, untextured surface
    Plain { diffuse: Color3, ambient: Color3, specular: Color3 },
    /// Unlit, self-illuminated surface
    Emissive { color: Color3 },
}

/// A named material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub kind: MaterialKind,
}

impl Material {
    pub fn textured(name: impl Into<String>, base_color: Color3) -> Self {
        Self {
            name: name.into(),
            kind: MaterialKind::Textured { base_color },
        }
    }

    /// Neutral grey material for inspecting geometry without textures
    pub fn plain() -> Self {
        Self {
            name: "plainMaterial".to_string(),
            kind: MaterialKind::Plain {
                diffuse: PLAIN_DIFFUSE,
                ambient: [0.5, 0.5, 0.5],
                specular: [0.2, 0.2, 0.2],
            },
        }
    }

    /// Self-lit, unshaded material
    pub fn emissive(name: impl Into<String>, color: Color3) -> Self {
        Self {
            name: name.into(),
            kind: MaterialKind::Emissive { color },
        }
    }
}

/// A renderable mesh placed in the world
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub mesh: TriangleMesh,
    pub topology: Topology,
    pub transform: Transform3D,
    pub visible: bool,
    pub pickable: bool,
    pub material: Option<MaterialId>,
}

impl SceneNode {
    /// Create a visible, pickable node with an identity transform
    pub fn new(name: impl Into<String>, mesh: TriangleMesh) -> Self {
        Self {
            name: name.into(),
            mesh,
            topology: Topology::Triangles,
            transform: Transform3D::identity(),
            visible: true,
            pickable: true,
            material: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform3D) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = Some(material);
        self
    }

    /// A polyline through `points`
    pub fn polyline(name: impl Into<String>, points: Vec<Point3f>) -> Self {
        let mut node = Self::new(name, TriangleMesh::from_vertices_and_faces(points, Vec::new()));
        node.topology = Topology::Lines;
        node
    }

    pub fn with_pickable(mut self, pickable: bool) -> Self {
        self.pickable = pickable;
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    /// Vertex positions transformed into world space
    pub fn world_vertices(&self) -> impl Iterator<Item = Point3f> + '_ {
        self.mesh
            .vertices
            .iter()
            .map(move |v| self.transform.transform_point(v))
    }

    /// Face corners transformed into world space; empty for line nodes
    pub fn world_triangles(&self) -> impl Iterator<Item = [Point3f; 3]> + '_ {
        let has_faces = self.topology == Topology::Triangles;
        self.mesh.triangles().filter(move |_| has_faces).map(move |[a, b, c]| {
            [
                self.transform.transform_point(&a),
                self.transform.transform_point(&b),
                self.transform.transform_point(&c),
            ]
        })
    }
}

/// Ownership container for everything a viewer draws
#[derive(Debug, Default)]
pub struct Scene {
    nodes: Vec<(NodeId, SceneNode)>,
    materials: Vec<(MaterialId, Material)>,
    // Never reset, so handles from before a clear cannot alias new objects.
    next_node: u64,
    next_material: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, returning its handle
    pub fn add_node(&mut self, node: SceneNode) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.push((id, node));
        id
    }

    /// Remove a node; `None` if it was already gone
    pub fn remove_node(&mut self, id: NodeId) -> Option<SceneNode> {
        let index = self.nodes.iter().position(|(nid, _)| *nid == id)?;
        Some(self.nodes.remove(index).1)
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.iter().find(|(nid, _)| *nid == id).map(|(_, n)| n)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.iter_mut().find(|(nid, _)| *nid == id).map(|(_, n)| n)
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().map(|(id, n)| (*id, n))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        let id = MaterialId(self.next_material);
        self.next_material += 1;
        self.materials.push((id, material));
        id
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.iter().find(|(mid, _)| *mid == id).map(|(_, m)| m)
    }

    pub fn remove_material(&mut self, id: MaterialId) -> Option<Material> {
        let index = self.materials.iter().position(|(mid, _)| *mid == id)?;
        Some(self.materials.remove(index).1)
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Destroy every node
    pub fn clear_nodes(&mut self) {
        self.nodes.clear();
    }

    /// Destroy every material; nodes keep dangling handles until replaced
    pub fn clear_materials(&mut self) {
        self.materials.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// World-space bounds of the visible nodes that have vertices
    pub fn bounding_box(&self) -> Option<(Point3f, Point3f)> {
        let mut bounds: Option<(Point3f, Point3f)> = None;
        for (_, node) in self.nodes.iter().filter(|(_, n)| n.visible) {
            for p in node.world_vertices() {
                bounds = Some(match bounds {
                    None => (p, p),
                    Some((min, max)) => (min.inf(&p), max.sup(&p)),
                });
            }
        }
        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn triangle() -> TriangleMesh {
        TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn test_ids_are_not_reused_after_clear() {
        let mut scene = Scene::new();
        let first = scene.add_node(SceneNode::new("a", triangle()));
        scene.clear_nodes();
        let second = scene.add_node(SceneNode::new("b", triangle()));

        assert_ne!(first, second);
        assert!(scene.node(first).is_none());
        assert!(scene.remove_node(first).is_none());
        assert_eq!(scene.node(second).map(|n| n.name.as_str()), Some("b"));
    }

    #[test]
    fn test_world_vertices_use_transform() {
        let node = SceneNode::new("t", triangle())
            .with_transform(Transform3D::translation(Vector3::new(0.0, 0.0, -3.0)));
        let zs: Vec<f32> = node.world_vertices().map(|p| p.z).collect();
        assert_eq!(zs, vec![-3.0, -3.0, -3.0]);
    }

    #[test]
    fn test_bounding_box_ignores_hidden_nodes() {
        let mut scene = Scene::new();
        assert!(scene.bounding_box().is_none());

        scene.add_node(SceneNode::new("visible", triangle()));
        let mut hidden = SceneNode::new("hidden", triangle())
            .with_transform(Transform3D::translation(Vector3::new(10.0, 10.0, 10.0)));
        hidden.visible = false;
        scene.add_node(hidden);

        let (min, max) = scene.bounding_box().unwrap();
        assert_eq!(min, Point3f::new(0.0, 0.0, 0.0));
        assert_eq!(max, Point3f::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_polyline_has_no_pickable_faces() {
        let node = SceneNode::polyline(
            "line",
            vec![Point3f::new(0.0, 0.0, 0.0), Point3f::new(0.0, 0.0, -2.0)],
        );
        assert_eq!(node.topology, Topology::Lines);
        assert_eq!(node.vertex_count(), 2);
        assert_eq!(node.world_triangles().count(), 0);
        assert_eq!(SceneNode::new("t", triangle()).world_triangles().count(), 1);
    }

    #[test]
    fn test_materials_clear_independently() {
        let mut scene = Scene::new();
        let mat = scene.add_material(Material::plain());
        scene.add_node(SceneNode::new("n", triangle()).with_material(mat));

        scene.clear_materials();
        assert_eq!(scene.material_count(), 0);
        assert_eq!(scene.node_count(), 1);
        assert!(scene.material(mat).is_none());
    }
}
