//! # Scene Traversals
//!
//! The two per-frame passes over the node tree:
//!
//! 1. [`update_transform`] walks root to leaves, composing each stale node's
//!    local transform with its parent's world transform, then refreshing its
//!    bound and, for cameras, the view matrix and frustum.
//! 2. [`frustum_culling`] walks the refreshed tree and queues every enabled,
//!    visible drawable or light whose world bound meets the camera frustum.
//!
//! ## Failure Isolation
//!
//! A node whose world transform comes out non-finite, or whose camera cannot
//! be refreshed, is logged and its subtree skipped for the frame; siblings
//! continue. Reaching a node twice or descending past the configured depth
//! limit aborts the pass, since either means the tree can no longer be walked
//! safely.

use std::collections::HashSet;

use log::{trace, warn};

use crate::bound::{self, Bound, BoundShape, Sphere};
use crate::core::config::{CullingConfig, TraversalConfig};
use crate::foundation::Transform;

use super::error::{SceneError, SceneResult};
use super::node::{CameraMask, SceneNode};
use super::node_kind::{NodeKind, NodeType};
use super::render_queue::{RenderGroupId, RenderItem, RenderQueue};

/// Counters collected over one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Nodes whose world transform was recomputed
    pub nodes_refreshed: usize,
    /// Nodes visited by culling
    pub nodes_visited: usize,
    /// Drawables and lights rejected by culling
    pub nodes_culled: usize,
    /// Items placed in the render queue
    pub items_queued: usize,
    /// Subtrees skipped because a node failed
    pub subtrees_skipped: usize,
}

/// Guards a traversal against cycles and runaway depth
struct Walk {
    visited: HashSet<usize>,
    max_depth: usize,
}

impl Walk {
    fn new(max_depth: usize) -> Self {
        Self { visited: HashSet::new(), max_depth }
    }

    fn enter(&mut self, node: &SceneNode, depth: usize) -> SceneResult<()> {
        if depth > self.max_depth {
            return Err(SceneError::DepthLimitExceeded { node: node.id(), max_depth: self.max_depth });
        }
        if !self.visited.insert(node.as_ptr() as usize) {
            return Err(SceneError::CycleDetected(node.id()));
        }
        Ok(())
    }
}

/// Refresh world transforms, bounds and cameras below `root`
///
/// After a successful pass every node that was not skipped is clean.
pub fn update_transform(root: &SceneNode, config: &TraversalConfig, stats: &mut FrameStats) -> SceneResult<()> {
    let mut walk = Walk::new(config.max_depth);
    refresh_node(root, None, false, 0, &mut walk, stats)
}

fn refresh_node(
    node: &SceneNode,
    parent_world: Option<&Transform>,
    parent_changed: bool,
    depth: usize,
    walk: &mut Walk,
    stats: &mut FrameStats,
) -> SceneResult<()> {
    walk.enter(node, depth)?;

    let (world, changed) = {
        let mut data = node.data_mut();
        let changed = data.dirty || parent_changed;

        if changed {
            let world = match (data.kind.node_type().has_transform(), parent_world) {
                (true, Some(parent)) => data.local.compose_with(parent),
                (true, None) => data.local.clone(),
                (false, Some(parent)) => parent.clone(),
                (false, None) => Transform::identity(),
            };
            if !world.is_finite() {
                warn!("Node {} has a non-finite world transform, skipping its subtree", data.id);
                stats.subtrees_skipped += 1;
                return Ok(());
            }

            if let Some(bound) = data.bound.as_mut() {
                bound.update_bound(&world);
            }
            data.world = world;
            stats.nodes_refreshed += 1;
        }

        let id = data.id;
        let world = data.world.clone();
        if let NodeKind::Camera(camera) = &mut data.kind {
            if changed {
                camera.mark_view_dirty();
            }
            // Projection changes do not dirty the node, so cameras always get a chance
            if let Err(err) = camera.update(&world) {
                warn!("Camera {} could not be refreshed ({}), skipping it", id, err);
                stats.subtrees_skipped += 1;
                return Ok(());
            }
        }

        data.dirty = false;
        (world, changed)
    };

    for child in node.children() {
        refresh_node(&child, Some(&world), changed, depth + 1, walk, stats)?;
    }
    Ok(())
}

/// Queue every visible drawable and light below `root` that meets `frustum`
///
/// `frustum` is normally a camera's frustum bound, and `object_mask` that
/// camera's object mask. The queue is appended to, not cleared.
pub fn frustum_culling(
    root: &SceneNode,
    frustum: &Bound,
    object_mask: CameraMask,
    culling: &CullingConfig,
    traversal: &TraversalConfig,
    queue: &mut RenderQueue,
    stats: &mut FrameStats,
) -> SceneResult<()> {
    let mut pass = CullPass {
        frustum,
        object_mask,
        culling,
        queue,
        stats,
        walk: Walk::new(traversal.max_depth),
    };
    pass.visit(root, 0)
}

struct CullPass<'a> {
    frustum: &'a Bound,
    object_mask: CameraMask,
    culling: &'a CullingConfig,
    queue: &'a mut RenderQueue,
    stats: &'a mut FrameStats,
    walk: Walk,
}

impl CullPass<'_> {
    fn visit(&mut self, node: &SceneNode, depth: usize) -> SceneResult<()> {
        self.walk.enter(node, depth)?;
        self.stats.nodes_visited += 1;

        {
            let data = node.data();
            if !data.enabled {
                trace!("Node {} is disabled, skipping its subtree", data.id);
                return Ok(());
            }
            if data.dirty {
                warn!("Node {} has stale world data, skipping its subtree", data.id);
                self.stats.subtrees_skipped += 1;
                return Ok(());
            }
        }

        self.consider(node);

        for child in node.children() {
            self.visit(&child, depth + 1)?;
        }
        Ok(())
    }

    /// Queue the node itself if it is drawable and visible
    fn consider(&mut self, node: &SceneNode) {
        let data = node.data();
        let node_type = data.kind.node_type();
        if !node_type.is_visual() && node_type != NodeType::Light {
            return;
        }
        if !data.visible {
            return;
        }
        if self.culling.respect_camera_masks && !data.camera_mask.intersects(self.object_mask) {
            trace!("Node {} is not on this camera's layers", data.id);
            return;
        }

        let placement = match &data.kind {
            NodeKind::Visual(visual) => {
                let visible = !self.culling.enabled
                    || !visual.bounding_test()
                    || data.bound.as_ref().map_or(true, |b| self.frustum.test(b));
                visible.then(|| (visual.render_group(), visual.material()))
            }
            NodeKind::Light(light) => {
                let visible = !self.culling.enabled || light.is_unbounded() || {
                    let reach = BoundShape::Sphere(Sphere::new(data.world.translation(), light.range));
                    bound::intersects(self.frustum.world_shape(), &reach).unwrap_or(false)
                };
                visible.then_some((RenderGroupId::Light, None))
            }
            _ => None,
        };

        match placement {
            Some((group, material)) => {
                trace!("Queued node {} in {:?}", data.id, group);
                drop(data);
                self.queue.add_renderable(group, material, RenderItem::from_node(node));
                self.stats.items_queued += 1;
            }
            None => {
                trace!("Culled node {}", data.id);
                self.stats.nodes_culled += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::utils::deg_to_rad;
    use crate::foundation::math::Vec3;
    use crate::scene::{Camera, Light};
    use approx::assert_relative_eq;

    fn refresh(root: &SceneNode) -> FrameStats {
        let mut stats = FrameStats::default();
        update_transform(root, &TraversalConfig::default(), &mut stats).unwrap();
        stats
    }

    /// Camera at the origin looking down -Z with a 90 degree field of view
    fn camera_frustum(root: &SceneNode) -> Bound {
        let camera = SceneNode::new_camera(Camera::perspective(deg_to_rad(90.0), 1.0, 1.0, 100.0).unwrap());
        root.add_child(&camera).unwrap();
        refresh(root);
        camera.frustum_bound().unwrap()
    }

    fn cull(root: &SceneNode, frustum: &Bound, culling: &CullingConfig) -> (RenderQueue, FrameStats) {
        let mut queue = RenderQueue::new();
        let mut stats = FrameStats::default();
        frustum_culling(
            root,
            frustum,
            CameraMask::all(),
            culling,
            &TraversalConfig::default(),
            &mut queue,
            &mut stats,
        )
        .unwrap();
        (queue, stats)
    }

    #[test]
    fn test_refresh_cleans_every_node() {
        let root = SceneNode::new_node();
        let a = SceneNode::new_transform();
        let b = SceneNode::new_sphere(1.0);
        root.add_child(&a).unwrap();
        a.add_child(&b).unwrap();

        let stats = refresh(&root);
        assert_eq!(stats.nodes_refreshed, 3);
        assert!(!root.is_dirty() && !a.is_dirty() && !b.is_dirty());

        // A clean tree refreshes nothing
        assert_eq!(refresh(&root).nodes_refreshed, 0);
    }

    #[test]
    fn test_refresh_moves_world_bound() {
        let root = SceneNode::new_transform();
        let ball = SceneNode::new_sphere(1.0);
        root.add_child(&ball).unwrap();
        root.set_position(Vec3::new(0.0, 0.0, -5.0)).unwrap();
        ball.set_scale(Vec3::new(2.0, 2.0, 2.0)).unwrap();
        refresh(&root);

        match ball.bound().unwrap().world_shape() {
            BoundShape::Sphere(sphere) => {
                assert_relative_eq!(sphere.center, Vec3::new(0.0, 0.0, -5.0), epsilon = 1e-5);
                assert_relative_eq!(sphere.radius, 2.0, epsilon = 1e-5);
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_non_finite_subtree_is_skipped() {
        let root = SceneNode::new_node();
        let broken = SceneNode::new_transform();
        let below = SceneNode::new_transform();
        let sibling = SceneNode::new_transform();
        root.add_child(&broken).unwrap();
        broken.add_child(&below).unwrap();
        root.add_child(&sibling).unwrap();
        broken.set_position(Vec3::new(f32::NAN, 0.0, 0.0)).unwrap();

        let stats = refresh(&root);
        assert_eq!(stats.subtrees_skipped, 1);
        assert!(broken.is_dirty());
        assert!(below.is_dirty());
        assert!(!sibling.is_dirty());
    }

    #[test]
    fn test_depth_limit_aborts() {
        let root = SceneNode::new_transform();
        let mut tip = root.clone();
        for _ in 0..4 {
            let next = SceneNode::new_transform();
            tip.add_child(&next).unwrap();
            tip = next;
        }

        let config = TraversalConfig { max_depth: 2 };
        let result = update_transform(&root, &config, &mut FrameStats::default());
        assert!(matches!(result, Err(SceneError::DepthLimitExceeded { max_depth: 2, .. })));
    }

    #[test]
    fn test_cycle_is_detected() {
        let root = SceneNode::new_transform();
        let child = SceneNode::new_transform();
        root.add_child(&child).unwrap();
        // Forge a cycle that the public API would have rejected
        child.data_mut().children.push(root.clone());

        let result = update_transform(&root, &TraversalConfig::default(), &mut FrameStats::default());
        assert!(matches!(result, Err(SceneError::CycleDetected(_))));

        child.data_mut().children.clear();
    }

    #[test]
    fn test_culling_keeps_inside_and_drops_outside() {
        let root = SceneNode::new_transform();
        let inside = SceneNode::new_sphere(1.0);
        let outside = SceneNode::new_sphere(1.0);
        root.add_child(&inside).unwrap();
        root.add_child(&outside).unwrap();
        inside.set_position(Vec3::new(0.0, 0.0, -10.0)).unwrap();
        outside.set_position(Vec3::new(0.0, 0.0, 10.0)).unwrap();
        let frustum = camera_frustum(&root);

        let (queue, stats) = cull(&root, &frustum, &CullingConfig::default());
        assert!(queue.contains(inside.id()));
        assert!(!queue.contains(outside.id()));
        assert_eq!(stats.nodes_culled, 1);
        assert_eq!(queue.group_len(RenderGroupId::Wireframe), 1);
    }

    #[test]
    fn test_disabled_culling_queues_everything() {
        let root = SceneNode::new_transform();
        let behind = SceneNode::new_box(Vec3::new(1.0, 1.0, 1.0));
        root.add_child(&behind).unwrap();
        behind.set_position(Vec3::new(0.0, 0.0, 50.0)).unwrap();
        let frustum = camera_frustum(&root);

        let culling = CullingConfig { enabled: false, ..CullingConfig::default() };
        let (queue, _) = cull(&root, &frustum, &culling);
        assert!(queue.contains(behind.id()));
    }

    #[test]
    fn test_visibility_is_not_inherited() {
        let root = SceneNode::new_transform();
        let hidden = SceneNode::new_quad(1.0, 1.0);
        let child = SceneNode::new_quad(1.0, 1.0);
        root.add_child(&hidden).unwrap();
        hidden.add_child(&child).unwrap();
        hidden.set_position(Vec3::new(0.0, 0.0, -5.0)).unwrap();
        hidden.set_visible(false);
        let frustum = camera_frustum(&root);

        let (queue, _) = cull(&root, &frustum, &CullingConfig::default());
        assert!(!queue.contains(hidden.id()));
        assert!(queue.contains(child.id()));
    }

    #[test]
    fn test_disabled_subtree_and_camera_mask() {
        let root = SceneNode::new_transform();
        let disabled = SceneNode::new_transform();
        let under_disabled = SceneNode::new_quad(1.0, 1.0);
        let masked = SceneNode::new_quad(1.0, 1.0);
        root.add_child(&disabled).unwrap();
        disabled.add_child(&under_disabled).unwrap();
        root.add_child(&masked).unwrap();
        disabled.set_position(Vec3::new(0.0, 0.0, -5.0)).unwrap();
        masked.set_position(Vec3::new(0.0, 0.0, -5.0)).unwrap();
        disabled.set_enabled(false);
        masked.set_camera_mask(CameraMask::LAYER_3);
        let frustum = camera_frustum(&root);

        let mut queue = RenderQueue::new();
        frustum_culling(
            &root,
            &frustum,
            CameraMask::LAYER_0,
            &CullingConfig::default(),
            &TraversalConfig::default(),
            &mut queue,
            &mut FrameStats::default(),
        )
        .unwrap();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_lights_are_culled_by_range() {
        let root = SceneNode::new_transform();
        let near = SceneNode::new_light(Light::point(5.0));
        let far = SceneNode::new_light(Light::point(5.0));
        let sun = SceneNode::new_light(Light::directional());
        for light in [&near, &far, &sun] {
            root.add_child(light).unwrap();
        }
        near.set_position(Vec3::new(0.0, 0.0, 3.0)).unwrap();
        far.set_position(Vec3::new(0.0, 0.0, 50.0)).unwrap();
        sun.set_position(Vec3::new(0.0, 0.0, 500.0)).unwrap();
        let frustum = camera_frustum(&root);

        let (queue, _) = cull(&root, &frustum, &CullingConfig::default());
        assert!(queue.contains(near.id()));
        assert!(!queue.contains(far.id()));
        assert!(queue.contains(sun.id()));
        assert_eq!(queue.group_len(RenderGroupId::Light), 2);
    }

    #[test]
    fn test_cameras_are_never_queued() {
        let root = SceneNode::new_transform();
        let frustum = camera_frustum(&root);
        let (queue, stats) = cull(&root, &frustum, &CullingConfig::default());
        assert!(queue.is_empty());
        assert_eq!(stats.nodes_visited, 2);
    }

    #[test]
    fn test_orthographic_camera_under_rotated_rig() {
        let root = SceneNode::new_transform();
        let rig = SceneNode::new_transform();
        root.add_child(&rig).unwrap();
        rig.rotate(&Vec3::y_axis(), deg_to_rad(90.0)).unwrap();
        let camera = SceneNode::new_camera(Camera::orthographic(10.0, 10.0, 0.1, 50.0).unwrap());
        rig.add_child(&camera).unwrap();

        // The rig turns the view direction from -Z to -X
        let place = |position: Vec3| {
            let ball = SceneNode::new_sphere(1.0);
            root.add_child(&ball).unwrap();
            ball.set_position(position).unwrap();
            ball
        };
        let ahead = place(Vec3::new(-10.0, 0.0, 0.0));
        let behind = place(Vec3::new(10.0, 0.0, 0.0));
        let beside = place(Vec3::new(-10.0, 0.0, 20.0));
        let above = place(Vec3::new(-10.0, 20.0, 0.0));

        refresh(&root);
        let frustum = camera.frustum_bound().unwrap();
        let (queue, stats) = cull(&root, &frustum, &CullingConfig::default());

        assert!(queue.contains_node(&ahead));
        assert!(!queue.contains_node(&behind));
        assert!(!queue.contains_node(&beside));
        assert!(!queue.contains_node(&above));
        assert_eq!(stats.nodes_culled, 3);
    }
}
