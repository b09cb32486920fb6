//! Node variants
//!
//! A scene node is one struct with a tagged payload. [`NodeType`] is the
//! stable tag consumed by type checks; [`NodeKind`] carries the per-variant
//! data.

use super::camera::Camera;
use super::render_queue::{MaterialId, RenderGroupId};

/// Stable node type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Plain grouping node without a transform of its own
    Node,
    /// Node with a local transform
    Transform,
    /// Camera
    Camera,
    /// Light source
    Light,
    /// Wireframe box
    Box,
    /// Wireframe sphere
    Sphere,
    /// Arbitrary mesh
    Mesh,
    /// Procedural shape
    Shape,
    /// Flat rectangle
    Quad,
    /// Coordinate axis indicator
    Axis,
}

impl NodeType {
    /// Whether nodes of this type may have children
    pub fn accepts_children(self) -> bool {
        !matches!(self, Self::Camera)
    }

    /// Whether nodes of this type carry a local transform
    pub fn has_transform(self) -> bool {
        !matches!(self, Self::Node)
    }

    /// Whether nodes of this type produce draw calls
    pub fn is_visual(self) -> bool {
        matches!(
            self,
            Self::Box | Self::Sphere | Self::Mesh | Self::Shape | Self::Quad | Self::Axis
        )
    }
}

/// Primitive topology of a geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// Independent points
    PointList,
    /// Independent line segments
    LineList,
    /// Connected line segments
    LineStrip,
    /// Independent triangles
    TriangleList,
    /// Triangles sharing an edge with the previous one
    TriangleStrip,
    /// Triangles sharing the first vertex
    TriangleFan,
}

impl PrimitiveType {
    /// Number of primitives formed by `count` vertices or indices
    pub fn primitive_count(self, count: usize) -> usize {
        match self {
            Self::PointList => count,
            Self::LineList => count / 2,
            Self::LineStrip => count.saturating_sub(1),
            Self::TriangleList => count / 3,
            Self::TriangleStrip | Self::TriangleFan => count.saturating_sub(2),
        }
    }
}

/// Vertex layout summary of a drawable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Topology
    pub primitive: PrimitiveType,
    /// Number of vertices
    pub vertex_count: usize,
    /// Number of indices when drawn indexed
    pub index_count: Option<usize>,
}

impl Geometry {
    /// Non-indexed geometry
    pub fn new(primitive: PrimitiveType, vertex_count: usize) -> Self {
        Self { primitive, vertex_count, index_count: None }
    }

    /// Indexed geometry
    pub fn indexed(primitive: PrimitiveType, vertex_count: usize, index_count: usize) -> Self {
        Self { primitive, vertex_count, index_count: Some(index_count) }
    }

    /// Primitives drawn, counted from indices when present
    pub fn primitive_count(&self) -> usize {
        self.primitive
            .primitive_count(self.index_count.unwrap_or(self.vertex_count))
    }
}

/// Kind of drawable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualKind {
    /// Wireframe box
    Box,
    /// Wireframe sphere
    Sphere,
    /// Flat rectangle
    Quad,
    /// Arbitrary mesh
    Mesh,
    /// Procedural shape
    Shape,
    /// Coordinate axis indicator
    Axis,
}

impl VisualKind {
    /// Matching node type tag
    pub fn node_type(self) -> NodeType {
        match self {
            Self::Box => NodeType::Box,
            Self::Sphere => NodeType::Sphere,
            Self::Quad => NodeType::Quad,
            Self::Mesh => NodeType::Mesh,
            Self::Shape => NodeType::Shape,
            Self::Axis => NodeType::Axis,
        }
    }

    /// Render group used unless overridden
    pub fn default_group(self) -> RenderGroupId {
        match self {
            Self::Axis => RenderGroupId::Indicator,
            Self::Box | Self::Sphere => RenderGroupId::Wireframe,
            Self::Quad => RenderGroupId::Solid,
            Self::Mesh | Self::Shape => RenderGroupId::Automatic,
        }
    }
}

/// Segments per circle of the built-in wire sphere
const WIRE_SPHERE_SEGMENTS: usize = 32;

/// Drawable payload
#[derive(Debug, Clone, PartialEq)]
pub struct Visual {
    kind: VisualKind,
    geometry: Geometry,
    material: Option<MaterialId>,
    render_group: RenderGroupId,
    bounding_test: bool,
}

impl Visual {
    /// Drawable of the given kind in its default render group
    pub fn new(kind: VisualKind, geometry: Geometry) -> Self {
        Self {
            kind,
            geometry,
            material: None,
            render_group: kind.default_group(),
            bounding_test: true,
        }
    }

    /// Box outline: 8 corners, 12 edges
    pub fn wire_box() -> Self {
        Self::new(VisualKind::Box, Geometry::indexed(PrimitiveType::LineList, 8, 24))
    }

    /// Sphere outline: three great circles
    pub fn wire_sphere() -> Self {
        let vertices = 3 * WIRE_SPHERE_SEGMENTS;
        Self::new(VisualKind::Sphere, Geometry::indexed(PrimitiveType::LineList, vertices, vertices * 2))
    }

    /// Two-triangle rectangle
    pub fn quad() -> Self {
        Self::new(VisualKind::Quad, Geometry::new(PrimitiveType::TriangleStrip, 4))
    }

    /// X, Y and Z axis lines
    pub fn axis() -> Self {
        Self::new(VisualKind::Axis, Geometry::new(PrimitiveType::LineList, 6))
    }

    /// Mesh with caller-provided geometry
    pub fn mesh(geometry: Geometry) -> Self {
        Self::new(VisualKind::Mesh, geometry)
    }

    /// Procedural shape with caller-provided geometry
    pub fn shape(geometry: Geometry) -> Self {
        Self::new(VisualKind::Shape, geometry)
    }

    /// Builder pattern: bind a material
    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = Some(material);
        self
    }

    /// Builder pattern: override the render group
    pub fn with_group(mut self, group: RenderGroupId) -> Self {
        self.render_group = group;
        self
    }

    /// Kind of drawable
    pub fn kind(&self) -> VisualKind {
        self.kind
    }

    /// Geometry summary
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Replace the geometry summary
    pub fn set_geometry(&mut self, geometry: Geometry) {
        self.geometry = geometry;
    }

    /// Bound material, if any
    pub fn material(&self) -> Option<MaterialId> {
        self.material
    }

    /// Bind or unbind a material
    pub fn set_material(&mut self, material: Option<MaterialId>) {
        self.material = material;
    }

    /// Render group this drawable is queued in
    pub fn render_group(&self) -> RenderGroupId {
        self.render_group
    }

    /// Move this drawable to another render group
    pub fn set_render_group(&mut self, group: RenderGroupId) {
        self.render_group = group;
    }

    /// Whether culling tests the node's bound (otherwise it is always queued)
    pub fn bounding_test(&self) -> bool {
        self.bounding_test
    }

    /// Enable or disable the bound test during culling
    pub fn set_bounding_test(&mut self, enabled: bool) {
        self.bounding_test = enabled;
    }
}

/// Light source type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightType {
    /// Omnidirectional light with a finite range
    Point,
    /// Infinitely distant light shining along the node's -Z axis
    Directional,
    /// Cone of light along the node's -Z axis with a finite range
    Spot,
}

/// Light payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// Type of light
    pub light_type: LightType,
    /// Linear RGB color
    pub color: [f32; 3],
    /// Brightness multiplier
    pub intensity: f32,
    /// Distance beyond which the light has no effect (ignored for directional lights)
    pub range: f32,
    /// Spot cone inner angle in radians
    pub inner_cone: f32,
    /// Spot cone outer angle in radians
    pub outer_cone: f32,
}

impl Light {
    /// White point light
    pub fn point(range: f32) -> Self {
        Self {
            light_type: LightType::Point,
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
            range,
            inner_cone: 0.0,
            outer_cone: 0.0,
        }
    }

    /// White directional light
    pub fn directional() -> Self {
        Self {
            light_type: LightType::Directional,
            range: f32::INFINITY,
            ..Self::point(0.0)
        }
    }

    /// White spot light
    pub fn spot(range: f32, inner_cone: f32, outer_cone: f32) -> Self {
        Self {
            light_type: LightType::Spot,
            inner_cone,
            outer_cone,
            ..Self::point(range)
        }
    }

    /// Builder pattern: set the color
    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = color;
        self
    }

    /// Builder pattern: set the intensity
    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    /// Whether the light reaches everywhere regardless of position
    pub fn is_unbounded(&self) -> bool {
        self.light_type == LightType::Directional || !self.range.is_finite()
    }
}

/// Per-variant node payload
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Grouping node; passes its parent's world transform through
    Group,
    /// Transform node
    Transform,
    /// Camera
    Camera(Box<Camera>),
    /// Light source
    Light(Light),
    /// Drawable
    Visual(Visual),
}

impl NodeKind {
    /// Stable type tag
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Group => NodeType::Node,
            Self::Transform => NodeType::Transform,
            Self::Camera(_) => NodeType::Camera,
            Self::Light(_) => NodeType::Light,
            Self::Visual(visual) => visual.kind().node_type(),
        }
    }
}

impl From<Camera> for NodeKind {
    fn from(camera: Camera) -> Self {
        Self::Camera(Box::new(camera))
    }
}

impl From<Light> for NodeKind {
    fn from(light: Light) -> Self {
        Self::Light(light)
    }
}

impl From<Visual> for NodeKind {
    fn from(visual: Visual) -> Self {
        Self::Visual(visual)
    }
}
