//! Camera payload
//!
//! Holds projection parameters and read-triggered caches of the view
//! matrix, the projection matrix and the frustum bound used for culling.
//!
//! The view matrix is the inverse of the camera node's world transform, so
//! it can only be refreshed by something that knows that transform: the
//! transform pass, or the lazy accessors on [`SceneNode`](super::SceneNode).
//!
//! Projections follow the right-handed OpenGL convention: the camera looks
//! down its local -Z axis and clip-space depth lies in `[-w, w]`.

use crate::bound::{Bound, Frustum, Plane};
use crate::core::config::CameraDefaults;
use crate::foundation::math::{constants, utils, Mat4, Mat4Ext, MathError, Vec3};
use crate::foundation::Transform;

use super::error::{SceneError, SceneResult};
use super::node::CameraMask;

/// Projection model and its shape parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionType {
    /// Perspective projection
    Perspective {
        /// Vertical field of view in radians
        fov_y: f32,
        /// Width / height
        aspect: f32,
    },
    /// Orthographic projection centred on the view axis
    Orthographic {
        /// Width of the view volume
        width: f32,
        /// Height of the view volume
        height: f32,
    },
}

/// Camera state carried by a camera node
#[derive(Debug, Clone)]
pub struct Camera {
    projection_type: ProjectionType,
    near: f32,
    far: f32,
    object_mask: CameraMask,

    view: Mat4,
    projection: Mat4,
    frustum: Bound,

    view_dirty: bool,
    projection_dirty: bool,
    frustum_dirty: bool,
}

impl Default for Camera {
    fn default() -> Self {
        let defaults = CameraDefaults::default();
        Self::unchecked(
            ProjectionType::Perspective {
                fov_y: utils::deg_to_rad(defaults.fov_y_degrees),
                aspect: defaults.aspect_ratio,
            },
            defaults.near,
            defaults.far,
        )
    }
}

fn validate_clip_range(near: f32, far: f32) -> SceneResult<()> {
    if !(near.is_finite() && far.is_finite()) {
        return Err(SceneError::InvalidProjection(format!(
            "clip distances must be finite, got near={near} far={far}"
        )));
    }
    if near >= far {
        return Err(SceneError::InvalidProjection(format!(
            "near ({near}) must be less than far ({far})"
        )));
    }
    Ok(())
}

fn validate_perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> SceneResult<()> {
    if !(fov_y > 0.0 && fov_y < constants::PI) {
        return Err(SceneError::InvalidProjection(format!(
            "vertical field of view must be in (0, pi), got {fov_y}"
        )));
    }
    if !(aspect > 0.0 && aspect.is_finite()) {
        return Err(SceneError::InvalidProjection(format!(
            "aspect ratio must be positive, got {aspect}"
        )));
    }
    if near <= 0.0 {
        return Err(SceneError::InvalidProjection(format!(
            "perspective near distance must be positive, got {near}"
        )));
    }
    validate_clip_range(near, far)
}

fn validate_orthographic(width: f32, height: f32, near: f32, far: f32) -> SceneResult<()> {
    if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
        return Err(SceneError::InvalidProjection(format!(
            "orthographic extents must be positive, got {width} x {height}"
        )));
    }
    validate_clip_range(near, far)
}

impl Camera {
    fn unchecked(projection_type: ProjectionType, near: f32, far: f32) -> Self {
        Self {
            projection_type,
            near,
            far,
            object_mask: CameraMask::all(),
            view: Mat4::identity(),
            projection: Mat4::identity(),
            // Placeholder until the first update
            frustum: Bound::frustum(Frustum::new([Plane::new(Vec3::z(), 0.0); 6])),
            view_dirty: true,
            projection_dirty: true,
            frustum_dirty: true,
        }
    }

    /// Perspective camera (`fov_y` in radians)
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> SceneResult<Self> {
        validate_perspective(fov_y, aspect, near, far)?;
        Ok(Self::unchecked(ProjectionType::Perspective { fov_y, aspect }, near, far))
    }

    /// Orthographic camera
    pub fn orthographic(width: f32, height: f32, near: f32, far: f32) -> SceneResult<Self> {
        validate_orthographic(width, height, near, far)?;
        Ok(Self::unchecked(ProjectionType::Orthographic { width, height }, near, far))
    }

    /// Perspective camera from configured defaults
    pub fn from_defaults(defaults: &CameraDefaults) -> SceneResult<Self> {
        Self::perspective(
            utils::deg_to_rad(defaults.fov_y_degrees),
            defaults.aspect_ratio,
            defaults.near,
            defaults.far,
        )
    }

    /// Switch to a perspective projection. Nothing changes on error.
    pub fn set_perspective(&mut self, fov_y: f32, aspect: f32, near: f32, far: f32) -> SceneResult<()> {
        validate_perspective(fov_y, aspect, near, far)?;
        self.projection_type = ProjectionType::Perspective { fov_y, aspect };
        self.near = near;
        self.far = far;
        self.mark_projection_dirty();
        Ok(())
    }

    /// Switch to an orthographic projection. Nothing changes on error.
    pub fn set_orthographic(&mut self, width: f32, height: f32, near: f32, far: f32) -> SceneResult<()> {
        validate_orthographic(width, height, near, far)?;
        self.projection_type = ProjectionType::Orthographic { width, height };
        self.near = near;
        self.far = far;
        self.mark_projection_dirty();
        Ok(())
    }

    /// Change the aspect ratio; an orthographic camera keeps its height
    pub fn set_aspect_ratio(&mut self, aspect: f32) -> SceneResult<()> {
        if !(aspect > 0.0 && aspect.is_finite()) {
            return Err(SceneError::InvalidProjection(format!(
                "aspect ratio must be positive, got {aspect}"
            )));
        }
        self.projection_type = match self.projection_type {
            ProjectionType::Perspective { fov_y, .. } => ProjectionType::Perspective { fov_y, aspect },
            ProjectionType::Orthographic { height, .. } => ProjectionType::Orthographic {
                width: height * aspect,
                height,
            },
        };
        self.mark_projection_dirty();
        Ok(())
    }

    /// Projection model
    pub fn projection_type(&self) -> ProjectionType {
        self.projection_type
    }

    /// Near clip distance
    pub fn near(&self) -> f32 {
        self.near
    }

    /// Far clip distance
    pub fn far(&self) -> f32 {
        self.far
    }

    /// Width / height
    pub fn aspect_ratio(&self) -> f32 {
        match self.projection_type {
            ProjectionType::Perspective { aspect, .. } => aspect,
            ProjectionType::Orthographic { width, height } => width / height,
        }
    }

    /// Mask of node camera masks this camera renders
    pub fn object_mask(&self) -> CameraMask {
        self.object_mask
    }

    /// Choose which nodes this camera renders
    pub fn set_object_mask(&mut self, mask: CameraMask) {
        self.object_mask = mask;
    }

    /// Invalidate the cached view matrix (the node moved)
    pub fn mark_view_dirty(&mut self) {
        self.view_dirty = true;
        self.frustum_dirty = true;
    }

    fn mark_projection_dirty(&mut self) {
        self.projection_dirty = true;
        self.frustum_dirty = true;
    }

    /// True while the cached view matrix is stale
    pub fn is_view_dirty(&self) -> bool {
        self.view_dirty
    }

    /// True while the cached projection matrix is stale
    pub fn is_projection_dirty(&self) -> bool {
        self.projection_dirty
    }

    /// Cached view matrix, whether or not it is current
    pub fn cached_view_matrix(&self) -> Mat4 {
        self.view
    }

    /// Recompute the view matrix from the camera node's world transform
    pub fn refresh_view(&mut self, world: &Transform) -> Result<(), MathError> {
        self.view = world.inverse()?;
        self.view_dirty = false;
        self.frustum_dirty = true;
        Ok(())
    }

    /// Projection matrix, rebuilt if the parameters changed
    pub fn projection_matrix(&mut self) -> Mat4 {
        if self.projection_dirty {
            self.projection = match self.projection_type {
                ProjectionType::Perspective { fov_y, aspect } => {
                    Mat4::perspective(fov_y, aspect, self.near, self.far)
                }
                ProjectionType::Orthographic { width, height } => {
                    Mat4::orthographic(width, height, self.near, self.far)
                }
            };
            self.projection_dirty = false;
            self.frustum_dirty = true;
        }
        self.projection
    }

    /// Bring view, projection and frustum up to date for a world transform
    pub fn update(&mut self, world: &Transform) -> Result<(), MathError> {
        if self.view_dirty {
            self.refresh_view(world)?;
        }
        let projection = self.projection_matrix();
        if self.frustum_dirty {
            let frustum = Frustum::from_matrix(&(projection * self.view))?;
            self.frustum.set_frustum(frustum);
            self.frustum_dirty = false;
        }
        Ok(())
    }

    /// Frustum bound as of the last [`Camera::update`]
    pub fn frustum_bound(&self) -> &Bound {
        &self.frustum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bound::{BoundShape, FrustumPlane};
    use crate::foundation::math::{utils::deg_to_rad, Vec4};
    use approx::assert_relative_eq;

    #[test]
    fn test_invalid_perspective_is_rejected_at_call_time() {
        assert!(matches!(
            Camera::perspective(deg_to_rad(60.0), 1.0, 10.0, 10.0),
            Err(SceneError::InvalidProjection(_))
        ));
        assert!(Camera::perspective(deg_to_rad(60.0), 1.0, 0.0, 10.0).is_err());
        assert!(Camera::perspective(deg_to_rad(60.0), 1.0, -1.0, 10.0).is_err());
        assert!(Camera::perspective(deg_to_rad(180.0), 1.0, 1.0, 10.0).is_err());
        assert!(Camera::perspective(deg_to_rad(60.0), 0.0, 1.0, 10.0).is_err());
        assert!(Camera::orthographic(10.0, 10.0, 5.0, 1.0).is_err());
    }

    #[test]
    fn test_failed_setter_leaves_camera_unchanged() {
        let mut camera = Camera::perspective(deg_to_rad(60.0), 1.5, 0.5, 100.0).unwrap();
        let before = camera.projection_type();

        assert!(camera.set_perspective(deg_to_rad(60.0), 1.5, 200.0, 100.0).is_err());
        assert_eq!(camera.projection_type(), before);
        assert_eq!(camera.near(), 0.5);
        assert_eq!(camera.far(), 100.0);
    }

    #[test]
    fn test_projection_is_lazy() {
        let mut camera = Camera::default();
        assert!(camera.is_projection_dirty());
        let first = camera.projection_matrix();
        assert!(!camera.is_projection_dirty());

        camera.set_aspect_ratio(2.0).unwrap();
        assert!(camera.is_projection_dirty());
        let second = camera.projection_matrix();
        assert_ne!(first, second);
        assert_relative_eq!(camera.aspect_ratio(), 2.0);
    }

    #[test]
    fn test_orthographic_aspect_keeps_height() {
        let mut camera = Camera::orthographic(8.0, 4.0, 0.1, 50.0).unwrap();
        camera.set_aspect_ratio(1.0).unwrap();
        assert_eq!(camera.projection_type(), ProjectionType::Orthographic { width: 4.0, height: 4.0 });
    }

    #[test]
    fn test_update_builds_view_and_frustum() {
        let mut camera = Camera::perspective(deg_to_rad(90.0), 1.0, 1.0, 100.0).unwrap();
        let world = Transform::from_translation(Vec3::new(0.0, 0.0, 10.0));
        camera.update(&world).unwrap();

        assert!(!camera.is_view_dirty());
        let eye = camera.cached_view_matrix() * Vec4::new(0.0, 0.0, 10.0, 1.0);
        assert_relative_eq!(eye, Vec4::new(0.0, 0.0, 0.0, 1.0), epsilon = 1e-5);

        match camera.frustum_bound().world_shape() {
            BoundShape::Frustum(frustum) => {
                // Near plane sits one unit in front of the camera, facing away from it
                let near = frustum.plane(FrustumPlane::Near);
                assert_relative_eq!(near.distance_to_point(&Vec3::new(0.0, 0.0, 9.0)), 0.0, epsilon = 1e-4);
                assert!(frustum.contains_point(&Vec3::new(0.0, 0.0, 0.0)));
                assert!(!frustum.contains_point(&Vec3::new(0.0, 0.0, 20.0)));
            }
            other => panic!("expected a frustum, got {other:?}"),
        }
    }

    #[test]
    fn test_degenerate_world_transform_is_reported() {
        let mut camera = Camera::default();
        let mut world = Transform::identity();
        world.set_scale(Vec3::new(0.0, 1.0, 1.0));
        assert!(camera.update(&world).is_err());
        assert!(camera.is_view_dirty());
    }
}
