//! Resolving screen positions to points on scene geometry

use crate::camera::OrbitCamera;
use nalgebra::{Point3, Vector3};
use reconview_core::{NodeId, Point3f, Scene};

/// A half-line in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    /// Unit length
    pub direction: Vector3<f32>,
}

/// The nearest surface hit along a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub node: NodeId,
    pub point: Point3f,
    pub distance: f32,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Ray through pixel `(x, y)` of a `width` x `height` viewport.
    ///
    /// `None` when the camera matrices are singular or the viewport is empty.
    pub fn from_screen(camera: &OrbitCamera, x: f32, y: f32, width: f32, height: f32) -> Option<Self> {
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        let ndc_x = 2.0 * x / width - 1.0;
        let ndc_y = 1.0 - 2.0 * y / height;

        let inverse = (camera.projection_matrix() * camera.view_matrix()).try_inverse()?;
        let near = inverse.transform_point(&Point3::new(ndc_x, ndc_y, -1.0));
        let far = inverse.transform_point(&Point3::new(ndc_x, ndc_y, 1.0));
        let direction = far - near;
        if direction.norm_squared() <= f32::EPSILON {
            return None;
        }
        Some(Self::new(near, direction))
    }

    /// Point at parameter `t` along the ray
    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }

    /// Möller–Trumbore intersection; returns the hit distance
    pub fn intersect_triangle(&self, triangle: &[Point3<f32>; 3]) -> Option<f32> {
        const EPS: f32 = 1e-7;
        let [a, b, c] = *triangle;
        let edge1 = b - a;
        let edge2 = c - a;
        let h = self.direction.cross(&edge2);
        let det = edge1.dot(&h);
        if det.abs() < EPS {
            return None;
        }
        let inv_det = 1.0 / det;
        let s = self.origin - a;
        let u = inv_det * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(&edge1);
        let v = inv_det * self.direction.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = inv_det * edge2.dot(&q);
        (t > EPS).then_some(t)
    }
}

/// Nearest hit on any visible, pickable node
pub fn pick(scene: &Scene, ray: &Ray) -> Option<PickHit> {
    let mut best: Option<PickHit> = None;
    for (id, node) in scene.nodes() {
        if !node.visible || !node.pickable {
            continue;
        }
        for triangle in node.world_triangles() {
            if let Some(t) = ray.intersect_triangle(&triangle) {
                if best.map_or(true, |b| t < b.distance) {
                    best = Some(PickHit {
                        node: id,
                        point: ray.at(t),
                        distance: t,
                    });
                }
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use reconview_core::{SceneNode, TriangleMesh};

    fn wall(z: f32) -> TriangleMesh {
        TriangleMesh::from_vertices_and_faces(
            vec![
                Point3::new(-10.0, -10.0, z),
                Point3::new(10.0, -10.0, z),
                Point3::new(10.0, 10.0, z),
                Point3::new(-10.0, 10.0, z),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn test_nearest_hit_wins() {
        let mut scene = Scene::new();
        scene.add_node(SceneNode::new("far", wall(-5.0)));
        let near = scene.add_node(SceneNode::new("near", wall(-2.0)));

        let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));
        let hit = pick(&scene, &ray).unwrap();
        assert_eq!(hit.node, near);
        assert_relative_eq!(hit.distance, 2.0, epsilon = 1e-5);
        assert_relative_eq!(hit.point, Point3::new(0.0, 0.0, -2.0), epsilon = 1e-5);
    }

    #[test]
    fn test_unpickable_and_hidden_nodes_are_ignored() {
        let mut scene = Scene::new();
        scene.add_node(SceneNode::new("marker", wall(-1.0)).with_pickable(false));
        let mut hidden = SceneNode::new("hidden", wall(-2.0));
        hidden.visible = false;
        scene.add_node(hidden);

        let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));
        assert!(pick(&scene, &ray).is_none());
    }

    #[test]
    fn test_miss_behind_origin() {
        let mut scene = Scene::new();
        scene.add_node(SceneNode::new("behind", wall(3.0)));
        let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));
        assert!(pick(&scene, &ray).is_none());
    }

    #[test]
    fn test_screen_center_ray_hits_target() {
        let camera = OrbitCamera::default();
        let ray = Ray::from_screen(&camera, 400.0, 300.0, 800.0, 600.0).unwrap();

        let mut scene = Scene::new();
        scene.add_node(SceneNode::new("wall", wall(0.0)));
        let hit = pick(&scene, &ray).unwrap();
        assert_relative_eq!(hit.point, Point3::new(0.0, 0.0, 0.0), epsilon = 1e-3);
    }

    #[test]
    fn test_empty_viewport_has_no_ray() {
        assert!(Ray::from_screen(&OrbitCamera::default(), 0.0, 0.0, 0.0, 600.0).is_none());
    }
}
