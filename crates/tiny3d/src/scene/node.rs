//! # Scene Nodes
//!
//! A [`SceneNode`] is a cheap, clonable handle to one node of the scene tree.
//! Parents own their children; the back-reference to the parent is weak, so
//! dropping the last handle to a subtree root releases the whole subtree.
//!
//! ## Dirty State
//!
//! Every node carries a `dirty` flag meaning "my cached world transform and
//! bound are stale". It is set on creation, on attach and detach, and by any
//! transform mutation (which also dirties every descendant, since their world
//! transforms depend on this one). The transform pass clears it top-down.
//!
//! ## Structural Changes
//!
//! [`SceneNode::add_child`] and the `remove_*` family validate first and only
//! then mutate, so a failed call leaves the tree exactly as it was. Adding a
//! node that already has a parent moves it.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU32, Ordering};

use bitflags::bitflags;
use log::trace;

use crate::bound::{Aabb, Bound, Obb, Sphere};
use crate::foundation::math::{Axis3, Mat4, Quat, Vec3};
use crate::foundation::Transform;

use super::camera::Camera;
use super::error::{SceneError, SceneResult};
use super::node_kind::{Geometry, Light, NodeKind, NodeType, Visual};
use super::render_queue::{MaterialId, RenderGroupId};

static NEXT_NODE_ID: AtomicU32 = AtomicU32::new(1);

/// Node identifier
///
/// Auto-generated ids are unique within a session. Explicit ids are the
/// caller's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Wrap an explicit id
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Next auto-generated id
    pub fn generate() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags! {
    /// Camera layers a node is visible to
    ///
    /// A node is queued for a camera only if its mask intersects the camera's
    /// object mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CameraMask: u32 {
        /// Layer 0
        const LAYER_0 = 1 << 0;
        /// Layer 1
        const LAYER_1 = 1 << 1;
        /// Layer 2
        const LAYER_2 = 1 << 2;
        /// Layer 3
        const LAYER_3 = 1 << 3;
        /// Layer 4
        const LAYER_4 = 1 << 4;
        /// Layer 5
        const LAYER_5 = 1 << 5;
        /// Layer 6
        const LAYER_6 = 1 << 6;
        /// Layer 7
        const LAYER_7 = 1 << 7;
    }
}

impl Default for CameraMask {
    fn default() -> Self {
        Self::all()
    }
}

/// Node state behind the handle
pub(crate) struct NodeData {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) kind: NodeKind,

    pub(crate) local: Transform,
    pub(crate) world: Transform,
    pub(crate) bound: Option<Bound>,

    pub(crate) parent: Option<Weak<RefCell<NodeData>>>,
    pub(crate) children: Vec<SceneNode>,

    pub(crate) dirty: bool,
    pub(crate) enabled: bool,
    pub(crate) visible: bool,
    pub(crate) camera_mask: CameraMask,
}

/// Handle to a scene node
///
/// Cloning the handle does not copy the node; use [`SceneNode::clone_node`]
/// or [`SceneNode::clone_subtree`] for that. Two handles compare equal when
/// they refer to the same node.
#[derive(Clone)]
pub struct SceneNode {
    data: Rc<RefCell<NodeData>>,
}

/// Non-owning reference to a scene node
#[derive(Clone, Default)]
pub struct WeakSceneNode {
    data: Weak<RefCell<NodeData>>,
}

impl WeakSceneNode {
    /// Handle to the node if it is still alive
    pub fn upgrade(&self) -> Option<SceneNode> {
        self.data.upgrade().map(|data| SceneNode { data })
    }

    /// Address of the referenced node, `None` for a reference that never had one
    ///
    /// Matches [`SceneNode::as_ptr`] and stays unique while this reference is held.
    pub(crate) fn address(&self) -> Option<usize> {
        if self.data.ptr_eq(&Weak::new()) {
            None
        } else {
            Some(self.data.as_ptr() as usize)
        }
    }
}

impl fmt::Debug for WeakSceneNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(node) => write!(f, "WeakSceneNode({})", node.id()),
            None => f.write_str("WeakSceneNode(<dropped>)"),
        }
    }
}

impl PartialEq for SceneNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

impl Eq for SceneNode {}

impl fmt::Debug for SceneNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data.borrow();
        f.debug_struct("SceneNode")
            .field("id", &data.id)
            .field("type", &data.kind.node_type())
            .field("name", &data.name)
            .field("children", &data.children.len())
            .field("dirty", &data.dirty)
            .finish()
    }
}

impl SceneNode {
    // ===== Construction =====

    /// Create a detached node with an auto-generated id
    pub fn new(kind: impl Into<NodeKind>) -> Self {
        Self::with_id(NodeId::generate(), kind)
    }

    /// Create a detached node with an explicit id
    pub fn with_id(id: NodeId, kind: impl Into<NodeKind>) -> Self {
        let kind = kind.into();
        trace!("Created {:?} node {}", kind.node_type(), id);
        Self {
            data: Rc::new(RefCell::new(NodeData {
                id,
                name: String::new(),
                kind,
                local: Transform::identity(),
                world: Transform::identity(),
                bound: None,
                parent: None,
                children: Vec::new(),
                dirty: true,
                enabled: true,
                visible: true,
                camera_mask: CameraMask::default(),
            })),
        }
    }

    /// Grouping node
    pub fn new_node() -> Self {
        Self::new(NodeKind::Group)
    }

    /// Transform node
    pub fn new_transform() -> Self {
        Self::new(NodeKind::Transform)
    }

    /// Camera node
    pub fn new_camera(camera: Camera) -> Self {
        Self::new(camera)
    }

    /// Light node
    pub fn new_light(light: Light) -> Self {
        Self::new(light)
    }

    /// Wireframe box with an oriented-box bound
    pub fn new_box(half_extents: Vec3) -> Self {
        let aabb = Aabb::from_center_extents(Vec3::zeros(), half_extents);
        Self::new(Visual::wire_box()).with_bound(Bound::obb(Obb::from_aabb(&aabb)))
    }

    /// Wireframe sphere with a sphere bound
    pub fn new_sphere(radius: f32) -> Self {
        Self::new(Visual::wire_sphere()).with_bound(Bound::sphere(Sphere::new(Vec3::zeros(), radius)))
    }

    /// Rectangle in the local XY plane with a flat box bound
    pub fn new_quad(width: f32, height: f32) -> Self {
        let aabb = Aabb::from_center_extents(Vec3::zeros(), Vec3::new(width * 0.5, height * 0.5, 0.0));
        Self::new(Visual::quad()).with_bound(Bound::aabb(aabb))
    }

    /// Axis indicator with lines of the given length
    pub fn new_axis(length: f32) -> Self {
        let aabb = Aabb::new(Vec3::zeros(), Vec3::new(length, length, length));
        Self::new(Visual::axis()).with_bound(Bound::aabb(aabb))
    }

    /// Mesh node
    pub fn new_mesh(geometry: Geometry, bound: Option<Bound>) -> Self {
        let node = Self::new(Visual::mesh(geometry));
        node.set_bound(bound);
        node
    }

    /// Procedural shape node
    pub fn new_shape(geometry: Geometry, bound: Option<Bound>) -> Self {
        let node = Self::new(Visual::shape(geometry));
        node.set_bound(bound);
        node
    }

    /// Builder pattern: set the name
    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.set_name(name);
        self
    }

    /// Builder pattern: attach a bound
    pub fn with_bound(self, bound: Bound) -> Self {
        self.set_bound(Some(bound));
        self
    }

    // ===== Identity and flags =====

    /// Node id
    pub fn id(&self) -> NodeId {
        self.data.borrow().id
    }

    /// Node name (empty by default)
    pub fn name(&self) -> String {
        self.data.borrow().name.clone()
    }

    /// Rename the node
    pub fn set_name(&self, name: impl Into<String>) {
        self.data.borrow_mut().name = name.into();
    }

    /// Type tag
    pub fn node_type(&self) -> NodeType {
        self.data.borrow().kind.node_type()
    }

    /// Copy of the node payload
    pub fn kind(&self) -> NodeKind {
        self.data.borrow().kind.clone()
    }

    /// Run `f` against the node payload without copying it
    pub fn with_kind<R>(&self, f: impl FnOnce(&NodeKind) -> R) -> R {
        f(&self.data.borrow().kind)
    }

    /// Whether cached world data is stale
    pub fn is_dirty(&self) -> bool {
        self.data.borrow().dirty
    }

    /// Set the dirty flag, optionally on every descendant too
    pub fn set_dirty(&self, dirty: bool, recursive: bool) {
        {
            let mut data = self.data.borrow_mut();
            data.dirty = dirty;
            if dirty {
                if let NodeKind::Camera(camera) = &mut data.kind {
                    camera.mark_view_dirty();
                }
            }
        }

        if recursive {
            let data = self.data.borrow();
            for child in &data.children {
                child.set_dirty(dirty, true);
            }
        }
    }

    /// Whether the node (and its subtree) takes part in culling
    pub fn is_enabled(&self) -> bool {
        self.data.borrow().enabled
    }

    /// Enable or disable the node and its subtree
    pub fn set_enabled(&self, enabled: bool) {
        self.data.borrow_mut().enabled = enabled;
    }

    /// Whether this node itself is drawn; children are unaffected
    pub fn is_visible(&self) -> bool {
        self.data.borrow().visible
    }

    /// Show or hide this node without affecting its children
    pub fn set_visible(&self, visible: bool) {
        self.data.borrow_mut().visible = visible;
    }

    /// Camera layers this node belongs to
    pub fn camera_mask(&self) -> CameraMask {
        self.data.borrow().camera_mask
    }

    /// Move this node to other camera layers
    pub fn set_camera_mask(&self, mask: CameraMask) {
        self.data.borrow_mut().camera_mask = mask;
    }

    /// Copy of the node's bound
    pub fn bound(&self) -> Option<Bound> {
        self.data.borrow().bound.clone()
    }

    /// Attach, replace or remove the node's bound
    ///
    /// The node becomes dirty so the world-space shape is rebuilt.
    pub fn set_bound(&self, bound: Option<Bound>) {
        let mut data = self.data.borrow_mut();
        data.bound = bound;
        data.dirty = true;
    }

    // ===== Handles =====

    /// Non-owning reference to this node
    pub fn downgrade(&self) -> WeakSceneNode {
        WeakSceneNode { data: Rc::downgrade(&self.data) }
    }

    /// Address of the shared node, stable for the node's lifetime
    pub(crate) fn as_ptr(&self) -> *const RefCell<NodeData> {
        Rc::as_ptr(&self.data)
    }

    pub(crate) fn data(&self) -> Ref<'_, NodeData> {
        self.data.borrow()
    }

    pub(crate) fn data_mut(&self) -> RefMut<'_, NodeData> {
        self.data.borrow_mut()
    }

    // ===== Tree structure =====

    /// Parent node, if attached
    pub fn parent(&self) -> Option<SceneNode> {
        self.data
            .borrow()
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|data| SceneNode { data })
    }

    /// True if the node has no parent
    pub fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    /// Handles to the children, in order
    pub fn children(&self) -> Vec<SceneNode> {
        self.data.borrow().children.clone()
    }

    /// Number of children
    pub fn child_count(&self) -> usize {
        self.data.borrow().children.len()
    }

    /// Direct child with the given id
    pub fn child(&self, id: NodeId) -> Option<SceneNode> {
        self.data.borrow().children.iter().find(|c| c.id() == id).cloned()
    }

    /// First direct child with the given name
    pub fn child_by_name(&self, name: &str) -> Option<SceneNode> {
        self.data
            .borrow()
            .children
            .iter()
            .find(|c| c.data.borrow().name == name)
            .cloned()
    }

    /// This node or the first descendant (depth-first) with the given id
    pub fn find(&self, id: NodeId) -> Option<SceneNode> {
        if self.id() == id {
            return Some(self.clone());
        }
        self.data.borrow().children.iter().find_map(|c| c.find(id))
    }

    /// True if `self` is `other` or one of its ancestors
    pub fn is_ancestor_of(&self, other: &SceneNode) -> bool {
        let mut current = Some(other.clone());
        while let Some(node) = current {
            if node == *self {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// Append `child` as the last child
    ///
    /// A child that already has a parent is moved. Fails without changing
    /// anything if this node refuses children or if `child` is this node or
    /// one of its ancestors.
    pub fn add_child(&self, child: &SceneNode) -> SceneResult<()> {
        let node_type = self.node_type();
        if !node_type.accepts_children() {
            return Err(SceneError::ChildrenForbidden { parent: self.id(), node_type });
        }
        if child.is_ancestor_of(self) {
            return Err(SceneError::Cycle { parent: self.id(), child: child.id() });
        }

        if let Some(old_parent) = child.parent() {
            old_parent.detach(child);
        }

        self.data.borrow_mut().children.push(child.clone());
        child.data.borrow_mut().parent = Some(Rc::downgrade(&self.data));
        child.set_dirty(true, true);

        trace!("Attached node {} under node {}", child.id(), self.id());
        Ok(())
    }

    /// Detach `child` from this node
    pub fn remove_child(&self, child: &SceneNode) -> SceneResult<()> {
        if self.detach(child) {
            trace!("Detached node {} from node {}", child.id(), self.id());
            Ok(())
        } else {
            Err(SceneError::ChildNotFound { parent: self.id(), child: child.id() })
        }
    }

    /// Detach the direct child with the given id and return it
    pub fn remove_child_by_id(&self, id: NodeId) -> SceneResult<SceneNode> {
        let child = self
            .child(id)
            .ok_or(SceneError::ChildNotFound { parent: self.id(), child: id })?;
        self.remove_child(&child)?;
        Ok(child)
    }

    /// Detach every child and return them in order
    pub fn remove_all_children(&self) -> Vec<SceneNode> {
        let children = std::mem::take(&mut self.data.borrow_mut().children);
        for child in &children {
            child.data.borrow_mut().parent = None;
            child.set_dirty(true, true);
        }
        children
    }

    /// Detach this node from its parent; a root is left alone
    pub fn remove_from_parent(&self) -> SceneResult<()> {
        match self.parent() {
            Some(parent) => parent.remove_child(self),
            None => Ok(()),
        }
    }

    /// Unlink `child` if it is a direct child. Returns whether it was.
    fn detach(&self, child: &SceneNode) -> bool {
        let position = self.data.borrow().children.iter().position(|c| c == child);
        match position {
            Some(index) => {
                self.data.borrow_mut().children.remove(index);
                child.data.borrow_mut().parent = None;
                child.set_dirty(true, true);
                true
            }
            None => false,
        }
    }

    // ===== Local transform =====

    fn modify_local(&self, modify: impl FnOnce(&mut Transform)) -> SceneResult<()> {
        let node_type = self.node_type();
        if !node_type.has_transform() {
            return Err(SceneError::WrongNodeType {
                node: self.id(),
                expected: "a node with a transform",
                actual: node_type,
            });
        }
        modify(&mut self.data.borrow_mut().local);
        self.set_dirty(true, true);
        Ok(())
    }

    /// Copy of the local transform
    pub fn local_transform(&self) -> Transform {
        self.data.borrow().local.clone()
    }

    /// Replace the local transform
    pub fn set_local_transform(&self, transform: Transform) -> SceneResult<()> {
        self.modify_local(|local| *local = transform)
    }

    /// Local position
    pub fn position(&self) -> Vec3 {
        self.data.borrow().local.translation()
    }

    /// Local orientation
    pub fn orientation(&self) -> Quat {
        self.data.borrow().local.orientation()
    }

    /// Local scale
    pub fn scale(&self) -> Vec3 {
        self.data.borrow().local.scale()
    }

    /// Set the local position
    pub fn set_position(&self, position: Vec3) -> SceneResult<()> {
        self.modify_local(|local| local.set_translation(position))
    }

    /// Set the local orientation
    pub fn set_orientation(&self, orientation: Quat) -> SceneResult<()> {
        self.modify_local(|local| local.set_orientation(orientation))
    }

    /// Set the local scale
    pub fn set_scale(&self, scale: Vec3) -> SceneResult<()> {
        self.modify_local(|local| local.set_scale(scale))
    }

    /// Move relative to the current position
    pub fn translate(&self, offset: Vec3) -> SceneResult<()> {
        self.modify_local(|local| local.translate(offset))
    }

    /// Rotate around a local axis
    pub fn rotate(&self, axis: &Axis3, angle: f32) -> SceneResult<()> {
        self.modify_local(|local| local.rotate(axis, angle))
    }

    /// Multiply the current scale
    pub fn scale_by(&self, factor: Vec3) -> SceneResult<()> {
        self.modify_local(|local| local.scale_by(factor))
    }

    /// Place the node at `position` with its local -Z axis facing `target`
    ///
    /// Both points are in the parent's space.
    pub fn look_at(&self, position: Vec3, target: Vec3, up: Vec3) -> SceneResult<()> {
        let orientation = Transform::look_rotation(&position, &target, &up)?;
        self.modify_local(|local| {
            local.set_translation(position);
            local.set_orientation(orientation);
        })
    }

    // ===== World transform =====

    /// World transform, recomputed through the parent chain if stale
    ///
    /// Does not clear the dirty flag; only the transform pass does that.
    pub fn world_transform(&self) -> Transform {
        let data = self.data.borrow();
        if !data.dirty {
            return data.world.clone();
        }

        let parent = data.parent.as_ref().and_then(Weak::upgrade).map(|data| SceneNode { data });
        let has_transform = data.kind.node_type().has_transform();
        match parent {
            Some(parent) => {
                let parent_world = parent.world_transform();
                if has_transform {
                    data.local.compose_with(&parent_world)
                } else {
                    parent_world
                }
            }
            None if has_transform => data.local.clone(),
            None => Transform::identity(),
        }
    }

    /// World matrix
    pub fn world_matrix(&self) -> Mat4 {
        self.world_transform().affine_matrix()
    }

    /// World position
    pub fn world_position(&self) -> Vec3 {
        self.world_transform().translation()
    }

    // ===== Camera =====

    fn camera_type_error(node: NodeId, kind: &NodeKind) -> SceneError {
        SceneError::WrongNodeType {
            node,
            expected: "a camera",
            actual: kind.node_type(),
        }
    }

    /// Run `f` against the camera payload
    pub fn with_camera<R>(&self, f: impl FnOnce(&Camera) -> R) -> SceneResult<R> {
        let data = self.data.borrow();
        match &data.kind {
            NodeKind::Camera(camera) => Ok(f(camera)),
            other => Err(Self::camera_type_error(data.id, other)),
        }
    }

    /// Run `f` against the mutable camera payload
    pub fn with_camera_mut<R>(&self, f: impl FnOnce(&mut Camera) -> R) -> SceneResult<R> {
        let mut data = self.data.borrow_mut();
        let id = data.id;
        match &mut data.kind {
            NodeKind::Camera(camera) => Ok(f(camera)),
            other => Err(Self::camera_type_error(id, other)),
        }
    }

    /// Set a perspective projection (`fov_y` in radians)
    pub fn set_perspective(&self, fov_y: f32, aspect: f32, near: f32, far: f32) -> SceneResult<()> {
        self.with_camera_mut(|camera| camera.set_perspective(fov_y, aspect, near, far))?
    }

    /// Set an orthographic projection
    pub fn set_orthographic(&self, width: f32, height: f32, near: f32, far: f32) -> SceneResult<()> {
        self.with_camera_mut(|camera| camera.set_orthographic(width, height, near, far))?
    }

    /// Change the camera's aspect ratio
    pub fn set_aspect_ratio(&self, aspect: f32) -> SceneResult<()> {
        self.with_camera_mut(|camera| camera.set_aspect_ratio(aspect))?
    }

    /// Camera object mask
    pub fn object_mask(&self) -> SceneResult<CameraMask> {
        self.with_camera(Camera::object_mask)
    }

    /// Choose which camera layers this camera renders
    pub fn set_object_mask(&self, mask: CameraMask) -> SceneResult<()> {
        self.with_camera_mut(|camera| camera.set_object_mask(mask))
    }

    /// View matrix, recomputed from the world transform if the camera moved
    pub fn view_matrix(&self) -> SceneResult<Mat4> {
        let stale = self.with_camera(Camera::is_view_dirty)?;
        if stale {
            let world = self.world_transform();
            self.with_camera_mut(|camera| camera.refresh_view(&world))??;
        }
        self.with_camera(Camera::cached_view_matrix)
    }

    /// Projection matrix, recomputed if the parameters changed
    pub fn projection_matrix(&self) -> SceneResult<Mat4> {
        self.with_camera_mut(Camera::projection_matrix)
    }

    /// Frustum bound for the current view and projection
    pub fn frustum_bound(&self) -> SceneResult<Bound> {
        let stale = self.with_camera(Camera::is_view_dirty)?;
        let world = if stale { self.world_transform() } else { Transform::identity() };
        self.with_camera_mut(|camera| -> SceneResult<Bound> {
            camera.update(&world)?;
            Ok(camera.frustum_bound().clone())
        })?
    }

    // ===== Lights and drawables =====

    /// Copy of the light payload
    pub fn light(&self) -> Option<Light> {
        match &self.data.borrow().kind {
            NodeKind::Light(light) => Some(*light),
            _ => None,
        }
    }

    /// Replace the light payload
    pub fn set_light(&self, light: Light) -> SceneResult<()> {
        let mut data = self.data.borrow_mut();
        let id = data.id;
        match &mut data.kind {
            NodeKind::Light(current) => {
                *current = light;
                Ok(())
            }
            other => Err(SceneError::WrongNodeType {
                node: id,
                expected: "a light",
                actual: other.node_type(),
            }),
        }
    }

    /// Copy of the drawable payload
    pub fn visual(&self) -> Option<Visual> {
        match &self.data.borrow().kind {
            NodeKind::Visual(visual) => Some(visual.clone()),
            _ => None,
        }
    }

    /// Run `f` against the mutable drawable payload
    pub fn with_visual_mut<R>(&self, f: impl FnOnce(&mut Visual) -> R) -> SceneResult<R> {
        let mut data = self.data.borrow_mut();
        let id = data.id;
        match &mut data.kind {
            NodeKind::Visual(visual) => Ok(f(visual)),
            other => Err(SceneError::WrongNodeType {
                node: id,
                expected: "a drawable",
                actual: other.node_type(),
            }),
        }
    }

    /// Bind a material to a drawable
    pub fn set_material(&self, material: Option<MaterialId>) -> SceneResult<()> {
        self.with_visual_mut(|visual| visual.set_material(material))
    }

    /// Move a drawable to another render group
    pub fn set_render_group(&self, group: RenderGroupId) -> SceneResult<()> {
        self.with_visual_mut(|visual| visual.set_render_group(group))
    }

    /// Enable or disable bound testing for a drawable
    pub fn set_bounding_test(&self, enabled: bool) -> SceneResult<()> {
        self.with_visual_mut(|visual| visual.set_bounding_test(enabled))
    }

    // ===== Cloning =====

    /// Copy of this node's own state
    ///
    /// The copy gets a fresh id, starts detached and dirty, and has no
    /// children.
    pub fn clone_node(&self) -> SceneNode {
        let data = self.data.borrow();
        let mut kind = data.kind.clone();
        if let NodeKind::Camera(camera) = &mut kind {
            camera.mark_view_dirty();
        }

        let copy = SceneNode::new(kind);
        {
            let mut copy_data = copy.data.borrow_mut();
            copy_data.name = data.name.clone();
            copy_data.local = data.local.clone();
            copy_data.bound = data.bound.as_ref().map(Bound::duplicate);
            copy_data.enabled = data.enabled;
            copy_data.visible = data.visible;
            copy_data.camera_mask = data.camera_mask;
        }
        trace!("Cloned node {} as {}", data.id, copy.id());
        copy
    }

    /// Deep copy of this node and all its descendants
    pub fn clone_subtree(&self) -> SceneNode {
        let copy = self.clone_node();
        for child in self.children() {
            let child_copy = child.clone_subtree();
            // The copy has the same type as `self`, which already held these children
            copy.data.borrow_mut().children.push(child_copy.clone());
            child_copy.data.borrow_mut().parent = Some(Rc::downgrade(&copy.data));
        }
        copy
    }
}
