//! Scene Manager - per-frame pipeline over one scene tree
//!
//! The scene manager is an explicit context object owned by the application:
//! it holds the root node, the active camera, the render queue, the viewports
//! and the configuration. A frame runs synchronously in four steps:
//!
//! 1. Refresh world transforms, bounds and cameras (root to leaves)
//! 2. Clear the render queue
//! 3. Cull the tree against the camera frustum, filling the queue
//! 4. Hand the queue to a [`Renderer`] in group order
//!
//! The queue keeps the last culled frame until the next cull, so it can be
//! inspected after rendering.

use std::path::Path;

use log::{debug, error, info, warn};
use slotmap::{new_key_type, SlotMap};

use crate::core::config::{Config, SceneConfig};
use crate::render::{Renderer, Viewport};

use super::camera::Camera;
use super::error::{SceneError, SceneResult};
use super::node::{NodeId, SceneNode, WeakSceneNode};
use super::node_kind::{NodeKind, NodeType};
use super::render_queue::RenderQueue;
use super::traversal::{self, FrameStats};

new_key_type! {
    /// Handle to a viewport registered with a [`SceneManager`]
    pub struct ViewportKey;
}

/// Scene Manager - owns a scene tree and drives its frames
pub struct SceneManager {
    /// Configuration
    config: SceneConfig,

    /// Root of the scene tree
    root: SceneNode,

    /// Camera used by `render_frame`
    active_camera: WeakSceneNode,

    /// Items that survived the last cull
    queue: RenderQueue,

    /// Registered viewports
    viewports: SlotMap<ViewportKey, Viewport>,

    /// Counters of the last frame
    stats: FrameStats,
}

impl SceneManager {
    /// Create a scene manager with the default configuration
    pub fn new() -> Self {
        Self::with_valid_config(SceneConfig::default())
    }

    /// Create a scene manager with a custom configuration
    pub fn from_config(config: SceneConfig) -> SceneResult<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    /// Create a scene manager from a TOML or RON configuration file
    pub fn from_config_file(path: impl AsRef<Path>) -> SceneResult<Self> {
        let config = SceneConfig::load_from_file(path)?;
        Self::from_config(config)
    }

    fn with_valid_config(config: SceneConfig) -> Self {
        let root = SceneNode::new_node().with_name("root");
        info!("Scene manager created (root node {})", root.id());
        Self {
            config,
            root,
            active_camera: WeakSceneNode::default(),
            queue: RenderQueue::new(),
            viewports: SlotMap::with_key(),
            stats: FrameStats::default(),
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Root node of the scene tree
    pub fn root(&self) -> &SceneNode {
        &self.root
    }

    /// Render queue as of the last cull
    pub fn queue(&self) -> &RenderQueue {
        &self.queue
    }

    /// Counters of the last frame
    pub fn last_frame_stats(&self) -> FrameStats {
        self.stats
    }

    /// Node anywhere in the tree with the given id
    pub fn find(&self, id: NodeId) -> Option<SceneNode> {
        self.root.find(id)
    }

    // ===== Node creation =====

    /// Create a node and attach it under `parent`, or under the root
    pub fn create_node(&self, parent: Option<&SceneNode>, kind: impl Into<NodeKind>) -> SceneResult<SceneNode> {
        let node = SceneNode::new(kind);
        parent.unwrap_or(&self.root).add_child(&node)?;
        Ok(node)
    }

    /// Create a camera with the configured default projection
    pub fn create_camera(&self, parent: Option<&SceneNode>) -> SceneResult<SceneNode> {
        let camera = Camera::from_defaults(&self.config.camera)?;
        self.create_node(parent, camera)
    }

    // ===== Cameras =====

    /// Choose the camera used by [`SceneManager::render_frame`]
    pub fn set_active_camera(&mut self, camera: &SceneNode) -> SceneResult<()> {
        let node_type = camera.node_type();
        if node_type != NodeType::Camera {
            return Err(SceneError::WrongNodeType {
                node: camera.id(),
                expected: "a camera",
                actual: node_type,
            });
        }
        self.active_camera = camera.downgrade();
        debug!("Active camera is now node {}", camera.id());
        Ok(())
    }

    /// The active camera, if one is set and still alive
    pub fn active_camera(&self) -> Option<SceneNode> {
        self.active_camera.upgrade()
    }

    // ===== Frame pipeline =====

    /// Refresh world transforms, bounds and cameras
    ///
    /// Starts a new frame: the frame counters are reset.
    pub fn update(&mut self) -> SceneResult<()> {
        self.stats = FrameStats::default();
        traversal::update_transform(&self.root, &self.config.traversal, &mut self.stats).map_err(|err| {
            error!("Transform pass aborted: {}", err);
            err
        })
    }

    /// Rebuild the render queue for `camera`
    pub fn cull(&mut self, camera: &SceneNode) -> SceneResult<()> {
        self.queue.clear();
        let frustum = camera.frustum_bound()?;
        let object_mask = camera.object_mask()?;
        traversal::frustum_culling(
            &self.root,
            &frustum,
            object_mask,
            &self.config.culling,
            &self.config.traversal,
            &mut self.queue,
            &mut self.stats,
        )
        .map_err(|err| {
            error!("Culling pass aborted: {}", err);
            err
        })
    }

    /// Run a full frame for the active camera
    ///
    /// The caller brackets the pass with `begin_render`/`end_render`; use
    /// [`SceneManager::render_viewports`] to have that done per viewport.
    pub fn render_frame<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> SceneResult<FrameStats> {
        let camera = self.active_camera().ok_or(SceneError::NoActiveCamera)?;
        self.update()?;
        self.cull(&camera)?;
        self.submit(&camera, renderer)?;

        debug!("Frame done: {:?}", self.stats);
        Ok(self.stats)
    }

    /// Render every viewport in ascending z-order
    ///
    /// Viewports whose camera has been dropped are skipped.
    pub fn render_viewports<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> SceneResult<FrameStats> {
        self.update()?;

        let mut order: Vec<(i32, ViewportKey)> =
            self.viewports.iter().map(|(key, viewport)| (viewport.z_order(), key)).collect();
        order.sort();

        for (_, key) in order {
            let Some(camera) = self.viewports.get(key).and_then(Viewport::camera) else {
                warn!("Viewport {:?} has no live camera, skipping it", key);
                continue;
            };
            self.cull(&camera)?;

            if let Some(viewport) = self.viewports.get(key) {
                renderer.begin_render(viewport)?;
            }
            let submitted = self.submit(&camera, renderer);
            renderer.end_render()?;
            submitted?;
        }

        debug!("Frame done over {} viewports: {:?}", self.viewports.len(), self.stats);
        Ok(self.stats)
    }

    fn submit<R: Renderer + ?Sized>(&self, camera: &SceneNode, renderer: &mut R) -> SceneResult<()> {
        renderer.set_view_transform(&camera.view_matrix()?);
        renderer.set_projection_transform(&camera.projection_matrix()?);
        self.queue.render(renderer)?;
        Ok(())
    }

    // ===== Viewports =====

    /// Register a viewport
    pub fn add_viewport(&mut self, viewport: Viewport) -> ViewportKey {
        self.viewports.insert(viewport)
    }

    /// Unregister a viewport
    pub fn remove_viewport(&mut self, key: ViewportKey) -> Option<Viewport> {
        self.viewports.remove(key)
    }

    /// Registered viewport
    pub fn viewport(&self, key: ViewportKey) -> Option<&Viewport> {
        self.viewports.get(key)
    }

    /// Registered viewport, mutably
    pub fn viewport_mut(&mut self, key: ViewportKey) -> Option<&mut Viewport> {
        self.viewports.get_mut(key)
    }

    /// Number of registered viewports
    pub fn viewport_count(&self) -> usize {
        self.viewports.len()
    }
}

impl Default for SceneManager {
    fn default() -> Self {
        Self::new()
    }
}
