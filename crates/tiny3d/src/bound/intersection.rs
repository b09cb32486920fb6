//! Pairwise intersection tests between bounding volumes
//!
//! All tests are symmetric. Frustum tests are conservative: a volume that
//! straddles a frustum corner region may be reported as intersecting, but a
//! volume that overlaps the frustum is never rejected.

use crate::foundation::math::{constants, Vec3};

use super::primitives::{Aabb, Frustum, Obb, Sphere};

/// Sphere vs sphere
pub fn sphere_sphere(a: &Sphere, b: &Sphere) -> bool {
    a.intersects(b)
}

/// Sphere vs AABB: closest point on the box to the sphere center
pub fn sphere_aabb(sphere: &Sphere, aabb: &Aabb) -> bool {
    let closest = sphere.center.sup(&aabb.min).inf(&aabb.max);
    (closest - sphere.center).norm_squared() <= sphere.radius * sphere.radius
}

/// Sphere vs OBB: closest point computed in the box's frame
pub fn sphere_obb(sphere: &Sphere, obb: &Obb) -> bool {
    let offset = sphere.center - obb.center;
    let mut distance_squared = 0.0;
    for i in 0..3 {
        let projection = offset.dot(&obb.axes[i]);
        let excess = projection.abs() - obb.extents[i];
        if excess > 0.0 {
            distance_squared += excess * excess;
        }
    }
    distance_squared <= sphere.radius * sphere.radius
}

/// AABB vs AABB
pub fn aabb_aabb(a: &Aabb, b: &Aabb) -> bool {
    a.intersects(b)
}

/// AABB vs OBB
pub fn aabb_obb(aabb: &Aabb, obb: &Obb) -> bool {
    obb_obb(&Obb::from_aabb(aabb), obb)
}

/// OBB vs OBB using the separating axis theorem
///
/// Tests the 3 face axes of each box and the 9 edge-edge cross products.
/// Cross products of (nearly) parallel edges are skipped; the face axes
/// already cover those cases.
pub fn obb_obb(a: &Obb, b: &Obb) -> bool {
    let offset = b.center - a.center;

    let separated_on = |axis: &Vec3| -> bool {
        let distance = offset.dot(axis).abs();
        distance > a.projected_radius(axis) + b.projected_radius(axis)
    };

    if a.axes.iter().chain(b.axes.iter()).any(|axis| separated_on(axis)) {
        return false;
    }

    for axis_a in &a.axes {
        for axis_b in &b.axes {
            let cross = axis_a.cross(axis_b);
            if cross.norm_squared() < constants::EPSILON {
                continue;
            }
            if separated_on(&cross) {
                return false;
            }
        }
    }

    true
}

/// Frustum vs sphere: outside if the center is farther than the radius
/// behind any plane
pub fn frustum_sphere(frustum: &Frustum, sphere: &Sphere) -> bool {
    frustum
        .planes
        .iter()
        .all(|plane| plane.distance_to_point(&sphere.center) >= -sphere.radius)
}

/// Frustum vs AABB: the corner furthest along each plane normal
/// (the positive vertex) must not be behind that plane
pub fn frustum_aabb(frustum: &Frustum, aabb: &Aabb) -> bool {
    frustum.planes.iter().all(|plane| {
        let mut p = aabb.min;
        if plane.normal.x >= 0.0 { p.x = aabb.max.x; }
        if plane.normal.y >= 0.0 { p.y = aabb.max.y; }
        if plane.normal.z >= 0.0 { p.z = aabb.max.z; }
        plane.distance_to_point(&p) >= 0.0
    })
}

/// Frustum vs OBB: the box projected onto each plane normal
pub fn frustum_obb(frustum: &Frustum, obb: &Obb) -> bool {
    frustum.planes.iter().all(|plane| {
        plane.distance_to_point(&obb.center) >= -obb.projected_radius(&plane.normal)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bound::primitives::Plane;
    use crate::foundation::math::{utils::deg_to_rad, Mat4, Mat4Ext, Quat};

    fn unit_box_at(center: Vec3) -> Obb {
        Obb::from_aabb(&Aabb::from_center_extents(center, Vec3::new(1.0, 1.0, 1.0)))
    }

    fn rotated(obb: Obb, rotation: Quat) -> Obb {
        Obb::new(obb.center, obb.axes.map(|axis| rotation * axis), obb.extents)
    }

    fn test_frustum() -> Frustum {
        let projection = Mat4::perspective(deg_to_rad(90.0), 1.0, 1.0, 100.0);
        Frustum::from_matrix(&projection).unwrap()
    }

    #[test]
    fn test_sphere_aabb() {
        let aabb = Aabb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        assert!(sphere_aabb(&Sphere::new(Vec3::new(1.5, 0.5, 0.5), 0.6), &aabb));
        assert!(!sphere_aabb(&Sphere::new(Vec3::new(2.0, 2.0, 2.0), 1.0), &aabb));
        assert!(sphere_aabb(&Sphere::new(Vec3::new(0.5, 0.5, 0.5), 0.1), &aabb));
    }

    #[test]
    fn test_sphere_obb_uses_box_frame() {
        let obb = rotated(unit_box_at(Vec3::zeros()), Quat::from_axis_angle(&Vec3::z_axis(), deg_to_rad(45.0)));
        // Box corner reaches sqrt(2) along x after the rotation
        assert!(sphere_obb(&Sphere::new(Vec3::new(1.8, 0.0, 0.0), 0.5), &obb));
        assert!(!sphere_obb(&Sphere::new(Vec3::new(1.1, 1.1, 0.0), 0.3), &obb));
    }

    #[test]
    fn test_obb_obb_separating_axis() {
        let a = unit_box_at(Vec3::zeros());
        assert!(obb_obb(&a, &unit_box_at(Vec3::new(1.9, 0.0, 0.0))));
        assert!(!obb_obb(&a, &unit_box_at(Vec3::new(2.1, 0.0, 0.0))));

        // Rotating the second box brings its corner into reach
        let b = rotated(unit_box_at(Vec3::new(2.3, 0.0, 0.0)), Quat::from_axis_angle(&Vec3::z_axis(), deg_to_rad(45.0)));
        assert!(obb_obb(&a, &b));
        assert!(obb_obb(&b, &a));
    }

    #[test]
    fn test_obb_obb_edge_axis_separates() {
        // Face axes overlap but a cross-product axis separates the boxes
        let tilt_a = Quat::from_axis_angle(&Vec3::z_axis(), deg_to_rad(45.0));
        let tilt_b = Quat::from_axis_angle(&Vec3::x_axis(), deg_to_rad(45.0));
        let a = rotated(unit_box_at(Vec3::zeros()), tilt_a);
        let b = rotated(unit_box_at(Vec3::new(2.1, 1.2, 2.1)), tilt_b);
        assert!(!obb_obb(&a, &b));
    }

    #[test]
    fn test_aabb_obb() {
        let aabb = Aabb::from_center_extents(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        assert!(aabb_obb(&aabb, &unit_box_at(Vec3::new(0.0, 1.5, 0.0))));
        assert!(!aabb_obb(&aabb, &unit_box_at(Vec3::new(0.0, 0.0, -3.0))));
    }

    #[test]
    fn test_frustum_sphere_inside_and_outside() {
        let frustum = test_frustum();
        assert!(frustum_sphere(&frustum, &Sphere::new(Vec3::new(0.0, 0.0, -50.0), 1.0)));
        assert!(!frustum_sphere(&frustum, &Sphere::new(Vec3::new(0.0, 0.0, 5.0), 1.0)));
        // Straddling the near plane still counts as visible
        assert!(frustum_sphere(&frustum, &Sphere::new(Vec3::new(0.0, 0.0, 0.0), 1.5)));
    }

    #[test]
    fn test_frustum_aabb_and_obb() {
        let frustum = test_frustum();
        let inside = Aabb::from_center_extents(Vec3::new(0.0, 0.0, -20.0), Vec3::new(1.0, 1.0, 1.0));
        let behind = Aabb::from_center_extents(Vec3::new(0.0, 0.0, 20.0), Vec3::new(1.0, 1.0, 1.0));
        let left = Aabb::from_center_extents(Vec3::new(-40.0, 0.0, -10.0), Vec3::new(1.0, 1.0, 1.0));

        assert!(frustum_aabb(&frustum, &inside));
        assert!(!frustum_aabb(&frustum, &behind));
        assert!(!frustum_aabb(&frustum, &left));

        assert!(frustum_obb(&frustum, &Obb::from_aabb(&inside)));
        assert!(!frustum_obb(&frustum, &Obb::from_aabb(&behind)));
        assert!(!frustum_obb(&frustum, &Obb::from_aabb(&left)));
    }

    #[test]
    fn test_frustum_tests_agree_with_hand_built_planes() {
        // A unit cube frustum built directly from planes
        let planes = [
            Plane::new(Vec3::x(), 1.0),
            Plane::new(-Vec3::x(), 1.0),
            Plane::new(Vec3::y(), 1.0),
            Plane::new(-Vec3::y(), 1.0),
            Plane::new(Vec3::z(), 1.0),
            Plane::new(-Vec3::z(), 1.0),
        ];
        let frustum = Frustum::new(planes);
        assert!(frustum_sphere(&frustum, &Sphere::new(Vec3::new(1.4, 0.0, 0.0), 0.5)));
        assert!(!frustum_sphere(&frustum, &Sphere::new(Vec3::new(1.6, 0.0, 0.0), 0.5)));
    }
}
