use crate::{Aabb, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length unless the ray was built from a zero direction.
    pub dir: Vec3,
}

impl Ray {
    #[inline]
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self {
            origin,
            dir: dir.normalized(),
        }
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.dir.length() < 1e-6
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

impl Triangle {
    #[inline]
    pub const fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.a.min(self.b).min(self.c), self.a.max(self.b).max(self.c))
    }

    #[inline]
    pub fn centroid(&self) -> Vec3 {
        (self.a + self.b + self.c) / 3.0
    }

    /// Unit normal following the counter-clockwise winding; `UP` for degenerate triangles.
    pub fn normal(&self) -> Vec3 {
        let n = (self.b - self.a).cross(self.c - self.a);
        if n.length() < 1e-12 { Vec3::UP } else { n.normalized() }
    }

    /// Double-sided Möller–Trumbore; distance along the ray.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        const EPS: f32 = 1e-7;
        let e1 = self.b - self.a;
        let e2 = self.c - self.a;
        let p = ray.dir.cross(e2);
        let det = e1.dot(p);
        if det.abs() < EPS {
            return None;
        }
        let inv = 1.0 / det;
        let s = ray.origin - self.a;
        let u = s.dot(p) * inv;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(e1);
        let v = ray.dir.dot(q) * inv;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = e2.dot(q) * inv;
        if t >= 0.0 { Some(t) } else { None }
    }

    /// Closest point on the triangle to `p` (Voronoi region walk).
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        let (a, b, c) = (self.a, self.b, self.c);
        let ab = b - a;
        let ac = c - a;
        let ap = p - a;
        let d1 = ab.dot(ap);
        let d2 = ac.dot(ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return a;
        }
        let bp = p - b;
        let d3 = ab.dot(bp);
        let d4 = ac.dot(bp);
        if d3 >= 0.0 && d4 <= d3 {
            return b;
        }
        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return a + ab * v;
        }
        let cp = p - c;
        let d5 = ab.dot(cp);
        let d6 = ac.dot(cp);
        if d6 >= 0.0 && d5 <= d6 {
            return c;
        }
        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return a + ac * w;
        }
        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return b + (c - b) * w;
        }
        let denom = va + vb + vc;
        if denom.abs() < 1e-20 {
            return a;
        }
        let denom = 1.0 / denom;
        let v = vb * denom;
        let w = vc * denom;
        a + ab * v + ac * w
    }
}

/// Segment `a..b` swept by `radius`; the usual player-body proxy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Capsule {
    pub a: Vec3,
    pub b: Vec3,
    pub radius: f32,
}

impl Capsule {
    #[inline]
    pub const fn new(a: Vec3, b: Vec3, radius: f32) -> Self {
        Self { a, b, radius }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.a.min(self.b), self.a.max(self.b)).expanded(self.radius)
    }

    /// Closest point on the core segment to `p`.
    pub fn closest_on_segment(&self, p: Vec3) -> Vec3 {
        let ab = self.b - self.a;
        let len_sq = ab.dot(ab);
        if len_sq < 1e-12 {
            return self.a;
        }
        let t = ((p - self.a).dot(ab) / len_sq).clamp(0.0, 1.0);
        self.a + ab * t
    }
}
