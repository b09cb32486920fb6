//! # Tiny3D Scene Core
//!
//! The scene graph core of the Tiny3D engine: a tree of scene nodes with
//! hierarchical transforms, bounding volumes, frustum culling and a grouped
//! render queue handed to an external renderer.
//!
//! ## Features
//!
//! - **Scene Graph**: reference-counted node tree with weak parent links
//! - **Hierarchical Transforms**: cached world transforms with dirty tracking
//! - **Bounding Volumes**: spheres, axis-aligned and oriented boxes, frustums
//! - **Frustum Culling**: conservative visibility tests per camera
//! - **Render Queue**: ordered render groups batched by material
//! - **Configuration**: TOML/RON scene configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tiny3d::prelude::*;
//!
//! fn build() -> Result<(), SceneError> {
//!     let mut scene = SceneManager::from_config_file("scene.toml")?;
//!     tiny3d::foundation::logging::init_from_config(&scene.config().logging);
//!
//!     let camera = scene.create_camera(None)?;
//!     camera.set_position(Vec3::new(0.0, 0.0, 10.0))?;
//!     scene.set_active_camera(&camera)?;
//!
//!     let ball = SceneNode::new_sphere(1.0);
//!     scene.root().add_child(&ball)?;
//!
//!     scene.update()?;
//!     scene.cull(&camera)?;
//!     assert_eq!(scene.queue().len(), 1);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core modules
pub mod core;
pub mod config;
pub mod foundation;

// Scene graph
pub mod bound;
pub mod scene;

// External collaborator contracts
pub mod render;

/// Common imports for scene users
pub mod prelude {
    pub use crate::{
        bound::{Aabb, Bound, Frustum, Obb, Plane, Sphere},
        core::config::{Config, SceneConfig},
        foundation::{
            math::{Mat4, Quat, Vec3},
            Transform,
        },
        render::{RenderMode, Renderer, Viewport},
        scene::{
            Camera, CameraMask, Light, MaterialId, NodeId, NodeKind, NodeType, RenderGroupId, RenderQueue,
            SceneError, SceneManager, SceneNode,
        },
    };
}
