//! # Bounding Volumes
//!
//! Geometric proxies used for visibility tests. A [`Bound`] owns two copies of
//! its shape: the model-space shape it was built with and the world-space
//! shape derived from the owning node's world transform. Only the world copy
//! takes part in intersection tests.
//!
//! Unsupported shape pairs fail closed: [`Bound::test`] reports them as not
//! intersecting, so culling can only ever under-draw, never crash.

pub mod intersection;
pub mod primitives;

use std::sync::atomic::{AtomicU64, Ordering};

use crate::foundation::Transform;

pub use primitives::{Aabb, Frustum, FrustumPlane, Obb, Plane, Side, Sphere};

static NEXT_BOUND_ID: AtomicU64 = AtomicU64::new(1);

/// Session-unique bound identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoundId(u64);

impl BoundId {
    fn next() -> Self {
        Self(NEXT_BOUND_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Variant tag of a bound shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundKind {
    /// Sphere
    Sphere,
    /// Axis-aligned box
    Aabb,
    /// Oriented box
    Obb,
    /// Six-plane frustum
    Frustum,
}

/// Geometric shape of a bound
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundShape {
    /// Sphere
    Sphere(Sphere),
    /// Axis-aligned box
    Aabb(Aabb),
    /// Oriented box
    Obb(Obb),
    /// Six-plane frustum
    Frustum(Frustum),
}

impl BoundShape {
    /// Variant tag
    pub fn kind(&self) -> BoundKind {
        match self {
            Self::Sphere(_) => BoundKind::Sphere,
            Self::Aabb(_) => BoundKind::Aabb,
            Self::Obb(_) => BoundKind::Obb,
            Self::Frustum(_) => BoundKind::Frustum,
        }
    }

    /// Enclosing sphere, used as a quick rejection test.
    /// A frustum has none.
    pub fn bounding_sphere(&self) -> Option<Sphere> {
        match self {
            Self::Sphere(sphere) => Some(*sphere),
            Self::Aabb(aabb) => Some(aabb.bounding_sphere()),
            Self::Obb(obb) => Some(obb.bounding_sphere()),
            Self::Frustum(_) => None,
        }
    }

    /// Shape moved into the space described by `transform`.
    /// A frustum is returned unchanged; its camera rebuilds it.
    pub fn transformed(&self, transform: &Transform) -> Self {
        match self {
            Self::Sphere(sphere) => Self::Sphere(sphere.transformed(transform)),
            Self::Aabb(aabb) => Self::Aabb(aabb.transformed(transform)),
            Self::Obb(obb) => Self::Obb(obb.transformed(transform)),
            Self::Frustum(frustum) => Self::Frustum(*frustum),
        }
    }
}

/// Pairwise intersection dispatch
///
/// Returns `None` for a pair with no test (frustum vs frustum).
pub fn intersects(a: &BoundShape, b: &BoundShape) -> Option<bool> {
    use intersection as ix;
    use BoundShape as S;

    let hit = match (a, b) {
        (S::Sphere(a), S::Sphere(b)) => ix::sphere_sphere(a, b),
        (S::Sphere(s), S::Aabb(x)) | (S::Aabb(x), S::Sphere(s)) => ix::sphere_aabb(s, x),
        (S::Sphere(s), S::Obb(o)) | (S::Obb(o), S::Sphere(s)) => ix::sphere_obb(s, o),
        (S::Aabb(a), S::Aabb(b)) => ix::aabb_aabb(a, b),
        (S::Aabb(x), S::Obb(o)) | (S::Obb(o), S::Aabb(x)) => ix::aabb_obb(x, o),
        (S::Obb(a), S::Obb(b)) => ix::obb_obb(a, b),
        (S::Frustum(f), S::Sphere(s)) | (S::Sphere(s), S::Frustum(f)) => ix::frustum_sphere(f, s),
        (S::Frustum(f), S::Aabb(x)) | (S::Aabb(x), S::Frustum(f)) => ix::frustum_aabb(f, x),
        (S::Frustum(f), S::Obb(o)) | (S::Obb(o), S::Frustum(f)) => ix::frustum_obb(f, o),
        (S::Frustum(_), S::Frustum(_)) => return None,
    };
    Some(hit)
}

/// Bounding volume owned by a scene node
#[derive(Debug, Clone)]
pub struct Bound {
    id: BoundId,
    collision_group: u32,
    enabled: bool,
    local: BoundShape,
    world: BoundShape,
    world_sphere: Option<Sphere>,
}

impl Bound {
    /// Create a bound whose world shape starts equal to its model shape
    pub fn new(shape: BoundShape) -> Self {
        Self {
            id: BoundId::next(),
            collision_group: 0,
            enabled: true,
            local: shape,
            world: shape,
            world_sphere: shape.bounding_sphere(),
        }
    }

    /// Sphere bound
    pub fn sphere(sphere: Sphere) -> Self {
        Self::new(BoundShape::Sphere(sphere))
    }

    /// Axis-aligned box bound
    pub fn aabb(aabb: Aabb) -> Self {
        Self::new(BoundShape::Aabb(aabb))
    }

    /// Oriented box bound
    pub fn obb(obb: Obb) -> Self {
        Self::new(BoundShape::Obb(obb))
    }

    /// Frustum bound
    pub fn frustum(frustum: Frustum) -> Self {
        Self::new(BoundShape::Frustum(frustum))
    }

    /// Copy with a fresh identifier
    pub fn duplicate(&self) -> Self {
        Self { id: BoundId::next(), ..self.clone() }
    }

    /// Identifier
    pub fn id(&self) -> BoundId {
        self.id
    }

    /// Variant tag
    pub fn kind(&self) -> BoundKind {
        self.local.kind()
    }

    /// Collision group; 0 means "no group"
    pub fn collision_group(&self) -> u32 {
        self.collision_group
    }

    /// Put this bound in a collision group. Bounds sharing a non-zero group never intersect.
    pub fn set_collision_group(&mut self, group: u32) {
        self.collision_group = group;
    }

    /// Whether the bound takes part in tests
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the bound
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Model-space shape
    pub fn local_shape(&self) -> &BoundShape {
        &self.local
    }

    /// World-space shape
    pub fn world_shape(&self) -> &BoundShape {
        &self.world
    }

    /// Recompute the world-space shape from the owner's world transform
    pub fn update_bound(&mut self, world: &Transform) {
        if let BoundShape::Frustum(_) = self.local {
            return;
        }
        self.world = self.local.transformed(world);
        self.world_sphere = self.world.bounding_sphere();
    }

    /// Replace the frustum of a frustum bound (both copies)
    pub fn set_frustum(&mut self, frustum: Frustum) {
        self.local = BoundShape::Frustum(frustum);
        self.world = self.local;
        self.world_sphere = None;
    }

    /// Intersection test against another bound
    ///
    /// Disabled bounds and bounds sharing a non-zero collision group never
    /// intersect. Unsupported shape pairs report `false`.
    pub fn test(&self, other: &Bound) -> bool {
        if !self.enabled || !other.enabled {
            return false;
        }
        if self.collision_group != 0 && self.collision_group == other.collision_group {
            return false;
        }

        if let (Some(a), Some(b)) = (&self.world_sphere, &other.world_sphere) {
            if !a.intersects(b) {
                return false;
            }
        }

        match intersects(&self.world, &other.world) {
            Some(hit) => hit,
            None => {
                log::warn!(
                    "No intersection test for {:?} vs {:?} (bounds {} and {}); treating as disjoint",
                    self.kind(),
                    other.kind(),
                    self.id.raw(),
                    other.id.raw()
                );
                false
            }
        }
    }
}
