use polis_geom::{Aabb, Ray, Triangle, Vec2, Vec3, smoothstep};
use proptest::prelude::*;

fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

fn coord() -> impl Strategy<Value = f32> {
    -1_000.0f32..1_000.0
}

fn arb_vec3() -> impl Strategy<Value = Vec3> {
    (coord(), coord(), coord()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn small_vec3() -> impl Strategy<Value = Vec3> {
    (-100.0f32..100.0, -100.0f32..100.0, -100.0f32..100.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

proptest! {
    // smoothstep stays in [0,1] and is monotonic in x
    #[test]
    fn smoothstep_bounded_monotonic(a in -100.0f32..100.0, w in 0.1f32..100.0, x in -300.0f32..300.0, dx in 0.0f32..50.0) {
        let s0 = smoothstep(a, a + w, x);
        let s1 = smoothstep(a, a + w, x + dx);
        prop_assert!((0.0..=1.0).contains(&s0));
        prop_assert!(s1 + 1e-6 >= s0);
    }

    // Every point grown into a box is contained by it
    #[test]
    fn aabb_from_points_contains_all(points in prop::collection::vec(arb_vec3(), 1..32)) {
        let b = Aabb::from_points(points.iter().copied());
        for p in &points {
            prop_assert!(b.contains(*p));
        }
        prop_assert!(!b.is_empty());
    }

    // Closest point is never farther than any vertex
    #[test]
    fn triangle_closest_point_not_farther_than_vertices(a in small_vec3(), b in small_vec3(), c in small_vec3(), p in small_vec3()) {
        let tri = Triangle::new(a, b, c);
        let q = tri.closest_point(p);
        let d = q.distance(p);
        prop_assert!(d <= a.distance(p) + 1e-2);
        prop_assert!(d <= b.distance(p) + 1e-2);
        prop_assert!(d <= c.distance(p) + 1e-2);
    }

    // A vertical ray dropped through the centroid of a horizontal triangle hits it
    #[test]
    fn vertical_ray_hits_horizontal_triangle(cx in coord(), cz in coord(), y in -50.0f32..50.0, r in 1.0f32..20.0) {
        let tri = Triangle::new(
            Vec3::new(cx - r, y, cz - r),
            Vec3::new(cx + r, y, cz - r),
            Vec3::new(cx, y, cz + r),
        );
        let ray = Ray::new(Vec3::new(cx, y + 10.0, cz - r * 0.3), Vec3::new(0.0, -1.0, 0.0));
        let t = tri.intersect_ray(&ray);
        prop_assert!(t.is_some());
        prop_assert!(approx(t.unwrap_or_default(), 10.0, 1e-2));
    }

    #[test]
    fn vec2_perp_is_orthogonal(x in coord(), y in coord()) {
        let v = Vec2::new(x, y);
        prop_assert!(approx(v.dot(v.perp()), 0.0, 1e-2));
    }
}

#[test]
fn ray_slab_misses_box_behind_origin() {
    let b = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
    let towards = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
    let away = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -1.0));
    assert!(approx(b.ray_entry(&towards, 100.0).unwrap(), 4.0, 1e-5));
    assert!(b.ray_entry(&away, 100.0).is_none());
    assert!(b.ray_entry(&towards, 3.0).is_none());
}

#[test]
fn zero_vectors_normalize_without_nan() {
    assert_eq!(Vec3::ZERO.normalized(), Vec3::ZERO);
    assert_eq!(Vec2::ZERO.normalized(), Vec2::ZERO);
    assert!(Ray::new(Vec3::ZERO, Vec3::ZERO).is_degenerate());
}

#[test]
fn empty_aabb_grows_to_single_point() {
    let mut b = Aabb::EMPTY;
    assert!(b.is_empty());
    b.grow(Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(b.min, b.max);
    assert!(!b.is_empty());
}
