//! Math utilities and types
//!
//! Provides the fundamental math types used by the scene graph. Everything is
//! built on nalgebra; the aliases below fix the scalar type to `f32`.

use thiserror::Error;

pub use nalgebra::{
    Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Unit-length direction, used for rotation axes
pub type Axis3 = Unit<Vec3>;

/// Errors raised by math operations that would otherwise produce
/// non-finite or meaningless results.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    /// A scale component is zero (or too close to it) so the transform is not invertible
    #[error("degenerate scale {0:?}: transform is not invertible")]
    DegenerateScale([f32; 3]),

    /// Look-at direction is zero or parallel to the up vector
    #[error("degenerate look-at: direction {direction:?} with up {up:?}")]
    DegenerateLookAt {
        /// Requested viewing direction
        direction: [f32; 3],
        /// Requested up vector
        up: [f32; 3],
    },

    /// A computation produced NaN or infinity
    #[error("non-finite result in {0}")]
    NonFinite(&'static str),
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;

    /// Tolerance below which a length or scale is treated as zero
    pub const EPSILON: f32 = 1e-6;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Mat4, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// True if every component of the vector is finite
    pub fn vec3_is_finite(v: &Vec3) -> bool {
        v.iter().all(|c| c.is_finite())
    }

    /// True if every element of the matrix is finite
    pub fn mat4_is_finite(m: &Mat4) -> bool {
        m.iter().all(|c| c.is_finite())
    }

    /// Largest absolute component of a vector
    pub fn max_abs_component(v: &Vec3) -> f32 {
        v.x.abs().max(v.y.abs()).max(v.z.abs())
    }
}

/// Extension trait for Mat4 with projection helpers
///
/// All projections follow the right-handed OpenGL convention: the camera looks
/// down -Z and clip-space depth lies in [-w, w].
pub trait Mat4Ext {
    /// Create a perspective projection matrix (`fov_y` in radians)
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create an orthographic projection matrix centred on the view axis
    fn orthographic(width: f32, height: f32, near: f32, far: f32) -> Mat4;

    /// Transform a point (w = 1) by this affine matrix
    fn transform_point3(&self, point: &Vec3) -> Vec3;
}

impl Mat4Ext for Mat4 {
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::new_perspective(aspect, fov_y, near, far)
    }

    fn orthographic(width: f32, height: f32, near: f32, far: f32) -> Mat4 {
        let half_w = width * 0.5;
        let half_h = height * 0.5;
        Mat4::new_orthographic(-half_w, half_w, -half_h, half_h, near, far)
    }

    fn transform_point3(&self, point: &Vec3) -> Vec3 {
        self.transform_point(&Point3::from(*point)).coords
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_degree_conversion() {
        assert_relative_eq!(utils::deg_to_rad(180.0), constants::PI, epsilon = 1e-6);
        assert_relative_eq!(utils::rad_to_deg(constants::PI * 0.5), 90.0, epsilon = 1e-4);
    }

    #[test]
    fn test_perspective_maps_near_and_far_to_clip_bounds() {
        let proj = Mat4::perspective(utils::deg_to_rad(90.0), 1.0, 1.0, 100.0);

        let near = proj * Vec4::new(0.0, 0.0, -1.0, 1.0);
        let far = proj * Vec4::new(0.0, 0.0, -100.0, 1.0);

        assert_relative_eq!(near.z / near.w, -1.0, epsilon = 1e-5);
        assert_relative_eq!(far.z / far.w, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_orthographic_is_symmetric() {
        let proj = Mat4::orthographic(20.0, 10.0, 0.0, 50.0);
        let corner = proj * Vec4::new(10.0, 5.0, 0.0, 1.0);
        assert_relative_eq!(corner.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(corner.y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_finite_checks() {
        assert!(utils::vec3_is_finite(&Vec3::new(1.0, 2.0, 3.0)));
        assert!(!utils::vec3_is_finite(&Vec3::new(f32::NAN, 0.0, 0.0)));
        assert!(!utils::mat4_is_finite(&(Mat4::identity() * f32::INFINITY)));
    }
}
