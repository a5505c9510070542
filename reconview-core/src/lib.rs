//! Core data structures for reconview
//! 
//! This crate provides the fundamental types shared by the loaders and the
//! viewer: points, transforms, triangle meshes and the scene graph that
//! holds everything a viewer currently displays.

pub mod point;
pub mod mesh;
pub mod transform;
pub mod scene;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use transform::*;
pub use scene::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, Matrix4, Isometry3, UnitQuaternion};
