//! Scene graph errors

use thiserror::Error;

use crate::config::ConfigError;
use crate::foundation::math::MathError;
use crate::render::RenderError;

use super::node::NodeId;
use super::node_kind::NodeType;

/// Errors raised by scene graph operations
///
/// Structural errors leave the tree untouched: every mutation is validated
/// before anything is changed.
#[derive(Error, Debug)]
pub enum SceneError {
    /// Attaching the child would make a node its own ancestor
    #[error("adding node {child} under node {parent} would create a cycle")]
    Cycle {
        /// Prospective parent
        parent: NodeId,
        /// Rejected child
        child: NodeId,
    },

    /// The parent's node type does not accept children
    #[error("{node_type:?} node {parent} does not accept children")]
    ChildrenForbidden {
        /// Node that refused the child
        parent: NodeId,
        /// Its type
        node_type: NodeType,
    },

    /// The node to remove is not a child of this node
    #[error("node {child} is not a child of node {parent}")]
    ChildNotFound {
        /// Node asked to remove the child
        parent: NodeId,
        /// Missing child
        child: NodeId,
    },

    /// Operation needs a different kind of node
    #[error("node {node} is a {actual:?} node, expected {expected}")]
    WrongNodeType {
        /// Offending node
        node: NodeId,
        /// What the operation needed
        expected: &'static str,
        /// What it got
        actual: NodeType,
    },

    /// Projection parameters rejected at call time
    #[error("invalid projection: {0}")]
    InvalidProjection(String),

    /// A traversal reached the same node twice
    #[error("cycle detected during traversal at node {0}")]
    CycleDetected(NodeId),

    /// A traversal went deeper than the configured limit
    #[error("traversal exceeded max depth {max_depth} at node {node}")]
    DepthLimitExceeded {
        /// Node at which the limit was hit
        node: NodeId,
        /// Configured limit
        max_depth: usize,
    },

    /// Rendering was requested without an active camera
    #[error("no active camera")]
    NoActiveCamera,

    /// Math failure (degenerate transform, non-finite result)
    #[error(transparent)]
    Math(#[from] MathError),

    /// Renderer failure
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Configuration failure
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for scene operations
pub type SceneResult<T> = Result<T, SceneError>;
