//! Affine transform value with a lazily rebuilt matrix
//!
//! A [`Transform`] is translation, orientation and non-uniform scale. The
//! 4x4 affine matrix is cached and rebuilt on read after any mutation.
//!
//! ## Composition
//!
//! Composing a local transform `L` under a parent world transform `P` gives
//! the world transform `W`:
//!
//! ```text
//! W.orientation = P.orientation * L.orientation
//! W.scale       = P.scale ∘ L.scale
//! W.translation = P.translation + P.orientation * (P.scale ∘ L.translation)
//! ```
//!
//! For a uniformly scaled parent this is exactly `P.matrix * L.matrix`.

use std::cell::Cell;

use super::math::{constants, utils, Axis3, Mat3, Mat4, MathError, Point3, Quat, Vec3};

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone)]
pub struct Transform {
    translation: Vec3,
    orientation: Quat,
    scale: Vec3,

    /// Cached `T * R * S`, valid only while `dirty` is false
    affine: Cell<Mat4>,
    dirty: Cell<bool>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::zeros(),
            orientation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            affine: Cell::new(Mat4::identity()),
            dirty: Cell::new(false),
        }
    }
}

impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        self.translation == other.translation
            && self.orientation == other.orientation
            && self.scale == other.scale
    }
}

impl Transform {
    /// Create a transform from its three components
    pub fn new(translation: Vec3, orientation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            orientation,
            scale,
            affine: Cell::new(Mat4::identity()),
            dirty: Cell::new(true),
        }
    }

    /// Create an identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only a translation
    pub fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::identity(), Vec3::new(1.0, 1.0, 1.0))
    }

    /// Decompose an affine matrix into translation, rotation and scale
    ///
    /// Shear is discarded. Fails if a basis column has zero length.
    pub fn from_matrix(matrix: &Mat4) -> Result<Self, MathError> {
        let translation = Vec3::new(matrix.m14, matrix.m24, matrix.m34);

        let scale = Vec3::new(
            Vec3::new(matrix.m11, matrix.m21, matrix.m31).norm(),
            Vec3::new(matrix.m12, matrix.m22, matrix.m32).norm(),
            Vec3::new(matrix.m13, matrix.m23, matrix.m33).norm(),
        );
        if scale.iter().any(|s| *s < constants::EPSILON) {
            return Err(MathError::DegenerateScale(scale.into()));
        }

        let rotation_matrix = Mat3::new(
            matrix.m11 / scale.x, matrix.m12 / scale.y, matrix.m13 / scale.z,
            matrix.m21 / scale.x, matrix.m22 / scale.y, matrix.m23 / scale.z,
            matrix.m31 / scale.x, matrix.m32 / scale.y, matrix.m33 / scale.z,
        );
        let orientation = Quat::from_matrix(&rotation_matrix);

        Ok(Self::new(translation, orientation, scale))
    }

    /// Translation component
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// Orientation component
    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Scale component
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// True while the cached affine matrix is stale
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Replace the translation
    pub fn set_translation(&mut self, translation: Vec3) {
        self.translation = translation;
        self.dirty.set(true);
    }

    /// Replace the orientation
    pub fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation;
        self.dirty.set(true);
    }

    /// Replace the scale
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.dirty.set(true);
    }

    /// Move by `offset`, expressed in the parent's space
    pub fn translate(&mut self, offset: Vec3) {
        self.translation += offset;
        self.dirty.set(true);
    }

    /// Rotate by `angle` radians around `axis`, expressed in local space
    pub fn rotate(&mut self, axis: &Axis3, angle: f32) {
        self.orientation *= Quat::from_axis_angle(axis, angle);
        self.dirty.set(true);
    }

    /// Apply an additional local rotation
    pub fn rotate_by(&mut self, rotation: &Quat) {
        self.orientation *= *rotation;
        self.dirty.set(true);
    }

    /// Multiply the scale component-wise by `factor`
    pub fn scale_by(&mut self, factor: Vec3) {
        self.scale.component_mul_assign(&factor);
        self.dirty.set(true);
    }

    /// Affine matrix `T * R * S`, rebuilt only if a mutator ran since the last read
    pub fn affine_matrix(&self) -> Mat4 {
        if self.dirty.get() {
            let matrix = Mat4::new_translation(&self.translation)
                * self.orientation.to_homogeneous()
                * Mat4::new_nonuniform_scaling(&self.scale);
            self.affine.set(matrix);
            self.dirty.set(false);
        }
        self.affine.get()
    }

    /// World transform of a node whose local transform is `self` and whose
    /// parent's world transform is `parent`. Neither input is modified.
    pub fn compose_with(&self, parent: &Transform) -> Transform {
        let orientation = parent.orientation * self.orientation;
        let scale = parent.scale.component_mul(&self.scale);
        let translation =
            parent.translation + parent.orientation * parent.scale.component_mul(&self.translation);
        Transform::new(translation, orientation, scale)
    }

    /// Inverse affine matrix `S⁻¹ * Rᵀ * T⁻¹`
    ///
    /// Returns an error for a zero scale component instead of producing
    /// non-finite output.
    pub fn inverse(&self) -> Result<Mat4, MathError> {
        if self.scale.iter().any(|s| s.abs() < constants::EPSILON) {
            return Err(MathError::DegenerateScale(self.scale.into()));
        }

        let inv_scale = Vec3::new(1.0 / self.scale.x, 1.0 / self.scale.y, 1.0 / self.scale.z);
        let inverse = Mat4::new_nonuniform_scaling(&inv_scale)
            * self.orientation.inverse().to_homogeneous()
            * Mat4::new_translation(&(-self.translation));

        if utils::mat4_is_finite(&inverse) {
            Ok(inverse)
        } else {
            Err(MathError::NonFinite("Transform::inverse"))
        }
    }

    /// True if no component contains NaN or infinity
    pub fn is_finite(&self) -> bool {
        utils::vec3_is_finite(&self.translation)
            && utils::vec3_is_finite(&self.scale)
            && self.orientation.coords.iter().all(|c| c.is_finite())
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: &Vec3) -> Vec3 {
        self.affine_matrix().transform_point(&Point3::from(*point)).coords
    }

    /// Apply this transform to a direction (no translation)
    pub fn transform_vector(&self, vector: &Vec3) -> Vec3 {
        self.orientation * self.scale.component_mul(vector)
    }

    /// Orientation whose local -Z axis points from `position` towards `target`
    pub fn look_rotation(position: &Vec3, target: &Vec3, up: &Vec3) -> Result<Quat, MathError> {
        let direction = target - position;
        if direction.norm() < constants::EPSILON || direction.cross(up).norm() < constants::EPSILON {
            return Err(MathError::DegenerateLookAt {
                direction: direction.into(),
                up: (*up).into(),
            });
        }
        Ok(Quat::face_towards(&(-direction), up))
    }
}
