//! Scene graph core
//!
//! Turns a tree of scene nodes into an ordered sequence of draw calls per
//! frame.
//!
//! ## Architecture
//!
//! ```text
//! SceneNode tree (Transform, Camera, Light, Visual nodes)
//!      ↓  update_transform   (world transforms, bounds, camera frustum)
//!      ↓  frustum_culling    (bound vs frustum, camera masks)
//! RenderQueue (groups → material batches → items)
//!      ↓  Renderer::render
//! Draw calls
//! ```
//!
//! The [`SceneManager`] runs these steps for the active camera or for every
//! registered viewport.

mod camera;
mod error;
mod node;
mod node_kind;
mod render_queue;
mod scene_manager;
mod traversal;

#[cfg(test)]
mod tests;

pub use camera::{Camera, ProjectionType};
pub use error::{SceneError, SceneResult};
pub use node::{CameraMask, NodeId, SceneNode, WeakSceneNode};
pub use node_kind::{Geometry, Light, LightType, NodeKind, NodeType, PrimitiveType, Visual, VisualKind};
pub use render_queue::{MaterialId, RenderGroup, RenderGroupId, RenderItem, RenderQueue};
pub use scene_manager::{SceneManager, ViewportKey};
pub use traversal::{frustum_culling, update_transform, FrameStats};
