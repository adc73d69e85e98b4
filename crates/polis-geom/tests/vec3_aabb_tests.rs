use polis_geom::{Aabb, MeshData, Ray, Triangle, Vec2, Vec3, lerp, smoothstep, yaw_toward};

fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

fn vec3_approx_eq(a: Vec3, b: Vec3, eps: f32) -> bool {
    approx_eq(a.x, b.x, eps) && approx_eq(a.y, b.y, eps) && approx_eq(a.z, b.z, eps)
}

#[test]
fn yaw_toward_turns_local_z_onto_the_direction() {
    for dir in [Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0), Vec2::new(-0.6, -0.8)] {
        let yaw = yaw_toward(dir);
        let (s, c) = yaw.sin_cos();
        assert!(approx_eq(s, dir.x, 1e-6) && approx_eq(c, dir.y, 1e-6), "{dir:?}");
    }
}

#[test]
fn smoothstep_endpoints_and_degenerate_edges() {
    assert_eq!(smoothstep(18.0, 70.0, 0.0), 0.0);
    assert_eq!(smoothstep(18.0, 70.0, 70.0), 1.0);
    assert!(approx_eq(smoothstep(18.0, 70.0, 44.0), 0.5, 1e-6));
    assert_eq!(smoothstep(5.0, 5.0, 4.9), 0.0);
    assert_eq!(smoothstep(5.0, 5.0, 5.0), 1.0);
    assert!(approx_eq(lerp(2.0, 6.0, 0.25), 3.0, 1e-6));
}

#[test]
fn xz_projection_and_perpendicular() {
    let v = Vec3::new(3.0, 9.0, 4.0);
    assert_eq!(v.xz(), Vec2::new(3.0, 4.0));
    assert!(approx_eq(v.xz().length(), 5.0, 1e-6));
    let n = v.xz().normalized();
    assert!(approx_eq(n.dot(n.perp()), 0.0, 1e-6));
    assert_eq!(Vec2::ZERO.normalized(), Vec2::ZERO);
    assert!(vec3_approx_eq(Vec3::ZERO.normalized(), Vec3::ZERO, 0.0));
}

#[test]
fn ray_hits_a_horizontal_triangle_from_either_side() {
    let tri = Triangle::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 2.0), Vec3::new(2.0, 0.0, 0.0));
    let down = Ray::new(Vec3::new(0.5, 3.0, 0.5), Vec3::new(0.0, -1.0, 0.0));
    let up = Ray::new(Vec3::new(0.5, -2.0, 0.5), Vec3::new(0.0, 1.0, 0.0));
    assert!(approx_eq(tri.intersect_ray(&down).unwrap(), 3.0, 1e-6));
    assert!(approx_eq(tri.intersect_ray(&up).unwrap(), 2.0, 1e-6));
    let away = Ray::new(Vec3::new(0.5, 3.0, 0.5), Vec3::new(0.0, 1.0, 0.0));
    assert!(tri.intersect_ray(&away).is_none());
}

#[test]
fn aabb_union_and_distance() {
    let a = Aabb::new(Vec3::ZERO, Vec3::splat(1.0));
    let b = Aabb::new(Vec3::splat(2.0), Vec3::splat(3.0));
    let u = a.union(&b);
    assert_eq!(u.min, Vec3::ZERO);
    assert_eq!(u.max, Vec3::splat(3.0));
    assert!(!a.intersects(&b));
    assert!(approx_eq(a.distance_sq(Vec3::new(0.5, 0.5, 0.5)), 0.0, 1e-6));
    assert!(approx_eq(a.distance_sq(Vec3::new(3.0, 0.5, 0.5)), 4.0, 1e-6));
}

#[test]
fn cuboid_has_twelve_outward_triangles() {
    let mesh = MeshData::cuboid(Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(mesh.vertex_count(), 8);
    assert_eq!(mesh.triangle_count(), 12);
    for tri in mesh.triangles() {
        // Outward normals point away from the center.
        assert!(tri.normal().dot(tri.centroid()) > 0.0);
    }
}

#[test]
fn append_offsets_indices() {
    let mut a = MeshData::quad(1.0, 1.0);
    let b = MeshData::quad(2.0, 2.0);
    a.append(&b);
    assert_eq!(a.vertex_count(), 8);
    assert_eq!(a.triangle_count(), 4);
    assert!(a.indices[6..].iter().all(|&i| i >= 4));
}
