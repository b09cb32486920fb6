//! Bounding volume primitives
//!
//! Plain geometric value types. Each one is stored in a single space; the
//! [`Bound`](super::Bound) wrapper keeps a model-space copy and a world-space
//! copy side by side.

use crate::foundation::math::{constants, utils, Mat4, MathError, Vec3, Vec4};
use crate::foundation::Transform;

/// Which side of a plane a point lies on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// In front of the plane (the side the normal points to)
    Positive,
    /// Behind the plane
    Negative,
    /// On the plane, within tolerance
    Intersect,
}

/// Plane defined by normal and distance from origin
///
/// Points `p` with `normal · p + distance >= 0` are on the positive side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Normal vector (normalized)
    pub normal: Vec3,
    /// Signed offset along the normal
    pub distance: f32,
}

impl Plane {
    /// Create a new plane from normal and distance
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal: normal.normalize(), distance }
    }

    /// Build a plane from `ax + by + cz + d = 0` coefficients, normalizing
    /// all four so the distance is metric
    pub fn from_coefficients(coefficients: &Vec4) -> Result<Self, MathError> {
        let normal = coefficients.xyz();
        let length = normal.norm();
        if !length.is_finite() || length < constants::EPSILON {
            return Err(MathError::NonFinite("Plane::from_coefficients"));
        }
        Ok(Self {
            normal: normal / length,
            distance: coefficients.w / length,
        })
    }

    /// Calculate signed distance from plane to point
    pub fn distance_to_point(&self, point: &Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }

    /// Classify a point against this plane
    pub fn side_of(&self, point: &Vec3) -> Side {
        let d = self.distance_to_point(point);
        if d > constants::EPSILON {
            Side::Positive
        } else if d < -constants::EPSILON {
            Side::Negative
        } else {
            Side::Intersect
        }
    }
}

/// Bounding sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// Center position
    pub center: Vec3,
    /// Radius
    pub radius: f32,
}

impl Sphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Sphere around the centroid of `points` enclosing all of them.
    /// Returns `None` for an empty slice.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let centroid = points.iter().fold(Vec3::zeros(), |acc, p| acc + p) / points.len() as f32;
        let radius = points
            .iter()
            .map(|p| (p - centroid).norm())
            .fold(0.0_f32, f32::max);
        Some(Self::new(centroid, radius))
    }

    /// Check if the sphere contains a point
    pub fn contains_point(&self, point: &Vec3) -> bool {
        (point - self.center).norm_squared() <= self.radius * self.radius
    }

    /// Check if this sphere intersects another
    pub fn intersects(&self, other: &Sphere) -> bool {
        let distance_squared = (self.center - other.center).norm_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }

    /// World-space copy: the center is transformed and the radius grows by
    /// the largest scale component so the result always encloses the shape
    pub fn transformed(&self, transform: &Transform) -> Self {
        Self {
            center: transform.transform_point(&self.center),
            radius: self.radius * utils::max_abs_component(&transform.scale()),
        }
    }
}

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given half extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Tightest box around `points`. Returns `None` for an empty slice.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        Some(rest.iter().fold(Self::new(*first, *first), |aabb, p| Self {
            min: aabb.min.inf(p),
            max: aabb.max.sup(p),
        }))
    }

    /// Smallest box enclosing both boxes
    pub fn merge(&self, other: &Aabb) -> Aabb {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// The eight corners
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: &Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if this AABB intersects another AABB
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Sphere through the corners
    pub fn bounding_sphere(&self) -> Sphere {
        Sphere::new(self.center(), self.extents().norm())
    }

    /// World-space copy: the axis-aligned box around the transformed corners
    pub fn transformed(&self, transform: &Transform) -> Self {
        let corners = self.corners().map(|c| transform.transform_point(&c));
        let first = corners[0];
        corners[1..].iter().fold(Self::new(first, first), |aabb, p| Self {
            min: aabb.min.inf(p),
            max: aabb.max.sup(p),
        })
    }
}

/// Oriented bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    /// Center position
    pub center: Vec3,
    /// Unit axes of the box
    pub axes: [Vec3; 3],
    /// Half extents along each axis
    pub extents: Vec3,
}

impl Obb {
    /// Create an OBB from its center, three orthonormal axes and half extents
    pub fn new(center: Vec3, axes: [Vec3; 3], extents: Vec3) -> Self {
        Self { center, axes, extents }
    }

    /// OBB aligned with the coordinate axes
    pub fn from_aabb(aabb: &Aabb) -> Self {
        Self::new(aabb.center(), [Vec3::x(), Vec3::y(), Vec3::z()], aabb.extents())
    }

    /// Axis-aligned OBB around `points`. Returns `None` for an empty slice.
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        Aabb::from_points(points).map(|aabb| Self::from_aabb(&aabb))
    }

    /// The eight corners
    pub fn corners(&self) -> [Vec3; 8] {
        let [u, v, w] = [
            self.axes[0] * self.extents.x,
            self.axes[1] * self.extents.y,
            self.axes[2] * self.extents.z,
        ];
        let c = self.center;
        [
            c - u - v - w,
            c + u - v - w,
            c - u + v - w,
            c + u + v - w,
            c - u - v + w,
            c + u - v + w,
            c - u + v + w,
            c + u + v + w,
        ]
    }

    /// Half length of the box projected onto `direction`
    pub fn projected_radius(&self, direction: &Vec3) -> f32 {
        self.extents.x * self.axes[0].dot(direction).abs()
            + self.extents.y * self.axes[1].dot(direction).abs()
            + self.extents.z * self.axes[2].dot(direction).abs()
    }

    /// Sphere through the corners
    pub fn bounding_sphere(&self) -> Sphere {
        Sphere::new(self.center, self.extents.norm())
    }

    /// World-space copy
    ///
    /// Each half-extent vector is transformed as a direction and split back
    /// into a unit axis and a length.
    pub fn transformed(&self, transform: &Transform) -> Self {
        let mut axes = self.axes;
        let mut extents = Vec3::zeros();
        for i in 0..3 {
            let half = transform.transform_vector(&(self.axes[i] * self.extents[i]));
            let length = half.norm();
            extents[i] = length;
            if length > constants::EPSILON {
                axes[i] = half / length;
            } else {
                axes[i] = transform.orientation() * self.axes[i];
            }
        }
        Self {
            center: transform.transform_point(&self.center),
            axes,
            extents,
        }
    }
}

/// Index of each frustum plane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum FrustumPlane {
    /// Left clip plane
    Left = 0,
    /// Right clip plane
    Right = 1,
    /// Bottom clip plane
    Bottom = 2,
    /// Top clip plane
    Top = 3,
    /// Near clip plane
    Near = 4,
    /// Far clip plane
    Far = 5,
}

/// View frustum for visibility culling
///
/// Plane normals point inward: a point is inside when it is on the positive
/// side of all six planes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Six planes (left, right, bottom, top, near, far)
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Create a frustum from six planes
    pub fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Extract frustum planes from a view-projection matrix
    ///
    /// Gribb-Hartmann extraction for the OpenGL clip convention
    /// (`-w <= x, y, z <= w`). Planes come out in world space when given
    /// `projection * view`.
    pub fn from_matrix(view_projection: &Mat4) -> Result<Self, MathError> {
        let row = |i: usize| -> Vec4 { view_projection.row(i).transpose() };
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        Ok(Self {
            planes: [
                Plane::from_coefficients(&(r3 + r0))?,
                Plane::from_coefficients(&(r3 - r0))?,
                Plane::from_coefficients(&(r3 + r1))?,
                Plane::from_coefficients(&(r3 - r1))?,
                Plane::from_coefficients(&(r3 + r2))?,
                Plane::from_coefficients(&(r3 - r2))?,
            ],
        })
    }

    /// Plane by name
    pub fn plane(&self, which: FrustumPlane) -> &Plane {
        &self.planes[which as usize]
    }

    /// Check if a point is inside or on the frustum
    pub fn contains_point(&self, point: &Vec3) -> bool {
        self.planes.iter().all(|plane| plane.distance_to_point(point) >= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{utils::deg_to_rad, Mat4Ext, Quat};
    use approx::assert_relative_eq;

    #[test]
    fn test_plane_side_of() {
        let plane = Plane::new(Vec3::new(0.0, 2.0, 0.0), -1.0);
        assert_eq!(plane.side_of(&Vec3::new(5.0, 3.0, 0.0)), Side::Positive);
        assert_eq!(plane.side_of(&Vec3::new(0.0, -3.0, 9.0)), Side::Negative);
        assert_eq!(plane.side_of(&Vec3::new(7.0, 1.0, -2.0)), Side::Intersect);
    }

    #[test]
    fn test_plane_from_degenerate_coefficients_is_error() {
        assert!(Plane::from_coefficients(&Vec4::new(0.0, 0.0, 0.0, 1.0)).is_err());
    }

    #[test]
    fn test_aabb_from_points_and_merge() {
        let points = [Vec3::new(1.0, -2.0, 0.0), Vec3::new(-1.0, 4.0, 3.0), Vec3::new(0.5, 0.0, -1.0)];
        let aabb = Aabb::from_points(&points).unwrap();
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, -1.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 4.0, 3.0));
        assert!(Aabb::from_points(&[]).is_none());

        let merged = aabb.merge(&Aabb::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(3.0, 1.0, 1.0)));
        assert_eq!(merged.max.x, 3.0);
        assert_eq!(merged.min, aabb.min);
    }

    #[test]
    fn test_sphere_from_points_encloses_all() {
        let points = [Vec3::new(1.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.0, 3.0, 0.0)];
        let sphere = Sphere::from_points(&points).unwrap();
        for p in &points {
            assert!(sphere.contains_point(p));
        }
    }

    #[test]
    fn test_sphere_radius_scales_with_largest_component() {
        let sphere = Sphere::new(Vec3::new(1.0, 0.0, 0.0), 2.0);
        let transform = Transform::new(Vec3::new(0.0, 10.0, 0.0), Quat::identity(), Vec3::new(1.0, 3.0, -2.0));
        let world = sphere.transformed(&transform);
        assert_relative_eq!(world.center, Vec3::new(1.0, 10.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(world.radius, 6.0, epsilon = 1e-5);
    }

    #[test]
    fn test_obb_transformed_scales_extents() {
        let obb = Obb::from_aabb(&Aabb::from_center_extents(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0)));
        let transform = Transform::new(
            Vec3::new(5.0, 0.0, 0.0),
            Quat::from_axis_angle(&Vec3::z_axis(), deg_to_rad(90.0)),
            Vec3::new(2.0, 1.0, 1.0),
        );
        let world = obb.transformed(&transform);

        assert_relative_eq!(world.center, Vec3::new(5.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(world.extents, Vec3::new(2.0, 1.0, 1.0), epsilon = 1e-5);
        assert_relative_eq!(world.axes[0], Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_frustum_planes_point_inward() {
        let projection = Mat4::perspective(deg_to_rad(90.0), 1.0, 1.0, 100.0);
        let frustum = Frustum::from_matrix(&projection).unwrap();

        assert!(frustum.contains_point(&Vec3::new(0.0, 0.0, -10.0)));
        assert!(!frustum.contains_point(&Vec3::new(0.0, 0.0, 10.0)));
        assert!(!frustum.contains_point(&Vec3::new(0.0, 0.0, -200.0)));

        let near = frustum.plane(FrustumPlane::Near);
        assert_relative_eq!(near.normal, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
        assert_relative_eq!(near.distance, -1.0, epsilon = 1e-4);

        let left = frustum.plane(FrustumPlane::Left);
        assert_relative_eq!(left.normal.norm(), 1.0, epsilon = 1e-5);
        assert!(left.normal.x > 0.0);
    }
}
