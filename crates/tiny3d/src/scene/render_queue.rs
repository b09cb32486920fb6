//! Render queue for batched rendering
//!
//! Collects the drawables and lights that survived culling for one frame and
//! hands them to a [`Renderer`] in group order.
//!
//! Groups are visited by ascending [`RenderGroupId`]; inside a group, items
//! are batched by material so each material is bound once. A node appears at
//! most once per frame: adding it again replaces the earlier entry.

use std::collections::{BTreeMap, HashMap};

use log::trace;

use crate::foundation::math::Mat4;
use crate::render::{RenderResult, Renderer};

use super::node::{NodeId, SceneNode, WeakSceneNode};
use super::node_kind::{Geometry, Light, NodeKind, NodeType};

/// Opaque material handle, used only as a batching key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MaterialId(pub u32);

/// Render group, in submission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u32)]
pub enum RenderGroupId {
    /// Drawn first, behind everything
    Background = 0,
    /// Dynamic lights, registered rather than drawn
    Light = 10,
    /// Sky box
    SkyBox = 20,
    /// Helper geometry drawn in wireframe
    Indicator = 30,
    /// Group chosen by the node type
    Automatic = 40,
    /// Opaque geometry
    Solid = 50,
    /// Wireframe geometry
    Wireframe = 60,
    /// Alpha-blended geometry
    Transparent = 70,
    /// Blended effects drawn after transparent geometry
    TransparentEffect = 80,
    /// Shadow volumes
    Shadow = 90,
    /// Drawn last, on top of everything
    Overlay = 100,
}

impl RenderGroupId {
    /// Every group in submission order
    pub const ALL: [RenderGroupId; 11] = [
        Self::Background,
        Self::Light,
        Self::SkyBox,
        Self::Indicator,
        Self::Automatic,
        Self::Solid,
        Self::Wireframe,
        Self::Transparent,
        Self::TransparentEffect,
        Self::Shadow,
        Self::Overlay,
    ];
}

/// Per-frame snapshot of a queued node
#[derive(Debug, Clone)]
pub struct RenderItem {
    /// The queued node; the queue does not keep it alive
    pub node: WeakSceneNode,
    /// Node id, as reported to the renderer
    pub node_id: NodeId,
    /// Node type at the time of queueing
    pub node_type: NodeType,
    /// World matrix at the time of queueing
    pub world_matrix: Mat4,
    /// Geometry to draw, if any
    pub geometry: Option<Geometry>,
    /// Light parameters for light nodes
    pub light: Option<Light>,
}

impl RenderItem {
    /// Bare item with an identity world matrix and nothing to draw
    ///
    /// Items without a node are told apart by `node_id`.
    pub fn new(node_id: NodeId, node_type: NodeType) -> Self {
        Self {
            node: WeakSceneNode::default(),
            node_id,
            node_type,
            world_matrix: Mat4::identity(),
            geometry: None,
            light: None,
        }
    }

    /// Snapshot a node's cached world state
    pub fn from_node(node: &SceneNode) -> Self {
        let data = node.data();
        let (geometry, light) = match &data.kind {
            NodeKind::Visual(visual) => (Some(*visual.geometry()), None),
            NodeKind::Light(light) => (None, Some(*light)),
            _ => (None, None),
        };
        Self {
            node: node.downgrade(),
            node_id: data.id,
            node_type: data.kind.node_type(),
            world_matrix: data.world.affine_matrix(),
            geometry,
            light,
        }
    }

    /// Builder pattern: set the world matrix
    pub fn with_world_matrix(mut self, world_matrix: Mat4) -> Self {
        self.world_matrix = world_matrix;
        self
    }

    /// Builder pattern: set the geometry
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Builder pattern: set the light parameters
    pub fn with_light(mut self, light: Light) -> Self {
        self.light = Some(light);
        self
    }

    /// The queued node, if it is still alive
    pub fn node(&self) -> Option<SceneNode> {
        self.node.upgrade()
    }

    fn key(&self) -> ItemKey {
        self.node.address().map_or(ItemKey::Detached(self.node_id), ItemKey::Node)
    }
}

/// Identity of a queued item
///
/// Nodes are keyed by address, so two nodes sharing a `NodeId` stay distinct.
/// The weak reference held by the item keeps the address from being reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ItemKey {
    Node(usize),
    Detached(NodeId),
}

/// Items of one render group, batched by material
#[derive(Debug, Clone, Default)]
pub struct RenderGroup {
    batches: BTreeMap<Option<MaterialId>, Vec<RenderItem>>,
}

impl RenderGroup {
    /// Iterate batches in material order; `None` (default material) first
    pub fn batches(&self) -> impl Iterator<Item = (Option<MaterialId>, &[RenderItem])> {
        self.batches.iter().map(|(material, items)| (*material, items.as_slice()))
    }

    /// Number of items in this group
    pub fn len(&self) -> usize {
        self.batches.values().map(Vec::len).sum()
    }

    /// True if the group holds no items
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Number of material batches
    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    fn push(&mut self, material: Option<MaterialId>, item: RenderItem) {
        self.batches.entry(material).or_default().push(item);
    }

    fn remove(&mut self, material: Option<MaterialId>, key: ItemKey) {
        if let Some(items) = self.batches.get_mut(&material) {
            items.retain(|item| item.key() != key);
            if items.is_empty() {
                self.batches.remove(&material);
            }
        }
    }
}

/// Render queue for one frame
#[derive(Debug, Default)]
pub struct RenderQueue {
    groups: BTreeMap<RenderGroupId, RenderGroup>,
    index: HashMap<ItemKey, (RenderGroupId, Option<MaterialId>)>,
}

impl RenderQueue {
    /// Create an empty render queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an item under a group and material
    ///
    /// Replaces any entry already queued for the same node, wherever it was.
    pub fn add_renderable(&mut self, group: RenderGroupId, material: Option<MaterialId>, item: RenderItem) {
        let key = item.key();
        if let Some((old_group, old_material)) = self.index.insert(key, (group, material)) {
            trace!("Replacing queued node {} ({:?} -> {:?})", item.node_id, old_group, group);
            if let Some(old) = self.groups.get_mut(&old_group) {
                old.remove(old_material, key);
                if old.is_empty() {
                    self.groups.remove(&old_group);
                }
            }
        }
        self.groups.entry(group).or_default().push(material, item);
    }

    /// Remove every item
    pub fn clear(&mut self) {
        self.groups.clear();
        self.index.clear();
    }

    /// Visit every item in ascending group order, batch by batch
    pub fn for_each_in_order<F>(&self, mut visitor: F)
    where
        F: FnMut(RenderGroupId, Option<MaterialId>, &RenderItem),
    {
        for (group_id, group) in &self.groups {
            for (material, items) in group.batches() {
                for item in items {
                    visitor(*group_id, material, item);
                }
            }
        }
    }

    /// Like [`RenderQueue::for_each_in_order`], stopping at the first error
    pub fn try_for_each_in_order<E, F>(&self, mut visitor: F) -> Result<(), E>
    where
        F: FnMut(RenderGroupId, Option<MaterialId>, &RenderItem) -> Result<(), E>,
    {
        for (group_id, group) in &self.groups {
            for (material, items) in group.batches() {
                for item in items {
                    visitor(*group_id, material, item)?;
                }
            }
        }
        Ok(())
    }

    /// Submit the queue to a renderer
    pub fn render<R: Renderer + ?Sized>(&self, renderer: &mut R) -> RenderResult<()> {
        renderer.render(self)
    }

    /// Items in a single group
    pub fn group(&self, group: RenderGroupId) -> Option<&RenderGroup> {
        self.groups.get(&group)
    }

    /// True if any item with this node id is queued
    pub fn contains(&self, node_id: NodeId) -> bool {
        self.groups
            .values()
            .flat_map(|group| group.batches.values())
            .any(|items| items.iter().any(|item| item.node_id == node_id))
    }

    /// True if this exact node is queued
    pub fn contains_node(&self, node: &SceneNode) -> bool {
        self.index.contains_key(&ItemKey::Node(node.as_ptr() as usize))
    }

    /// Total number of queued items
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// True if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of items in a group
    pub fn group_len(&self, group: RenderGroupId) -> usize {
        self.groups.get(&group).map_or(0, RenderGroup::len)
    }

    /// Total number of material batches across all groups
    pub fn batch_count(&self) -> usize {
        self.groups.values().map(RenderGroup::batch_count).sum()
    }
}
