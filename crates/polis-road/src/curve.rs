use polis_geom::{Vec2, Vec3};
use thiserror::Error;

/// Samples of the raw spline parameter used to build the arc-length table.
const ARC_DIVISIONS: usize = 200;
/// Polyline resolution for distance queries.
pub const DISTANCE_SEGMENTS: usize = 256;

#[derive(Debug, Error, PartialEq)]
pub enum RoadError {
    #[error("road curve needs at least 2 control points, got {0}")]
    TooFewPoints(usize),
    #[error("road control point {index} is not finite: {point:?}")]
    NonFinitePoint { index: usize, point: Vec3 },
}

/// Closest point on the sampled road polyline to a query position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoadProjection {
    /// Arc-length parameter of the closest point.
    pub u: f32,
    pub point: Vec3,
    /// Horizontal (XZ) distance to the query.
    pub distance: f32,
}

/// Uniform Catmull-Rom spline (C1) through the control points, parameterized by arc length.
#[derive(Clone, Debug)]
pub struct RoadCurve {
    points: Vec<Vec3>,
    arc: Vec<f32>,
    length: f32,
    polyline: Vec<Vec3>,
}

impl RoadCurve {
    pub fn build(points: &[Vec3]) -> Result<Self, RoadError> {
        if points.len() < 2 {
            return Err(RoadError::TooFewPoints(points.len()));
        }
        if let Some((index, point)) = points.iter().enumerate().find(|(_, p)| !p.is_finite()) {
            return Err(RoadError::NonFinitePoint {
                index,
                point: *point,
            });
        }
        let mut curve = Self {
            points: points.to_vec(),
            arc: Vec::with_capacity(ARC_DIVISIONS + 1),
            length: 0.0,
            polyline: Vec::new(),
        };
        let mut prev = curve.raw_point(0.0);
        let mut acc = 0.0f32;
        curve.arc.push(0.0);
        for k in 1..=ARC_DIVISIONS {
            let p = curve.raw_point(k as f32 / ARC_DIVISIONS as f32);
            acc += p.distance(prev);
            curve.arc.push(acc);
            prev = p;
        }
        curve.length = acc;
        if acc <= f32::EPSILON {
            log::warn!("road curve has zero length; all control points coincide");
        }
        curve.polyline = (0..=DISTANCE_SEGMENTS)
            .map(|i| curve.point_at(i as f32 / DISTANCE_SEGMENTS as f32))
            .collect();
        Ok(curve)
    }

    pub fn control_points(&self) -> &[Vec3] {
        &self.points
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.length
    }

    /// The fixed-resolution polyline used by distance queries.
    pub fn polyline(&self) -> &[Vec3] {
        &self.polyline
    }

    pub fn point_at(&self, u: f32) -> Vec3 {
        self.raw_point(self.arc_to_raw(u))
    }

    /// Unit tangent; never NaN. Falls back to the chord, then +X.
    pub fn tangent_at(&self, u: f32) -> Vec3 {
        let s = self.arc_to_raw(u);
        let d = self.raw_derivative(s);
        if d.length() > 1e-6 {
            return d.normalized();
        }
        let lo = self.raw_point((s - 1e-3).max(0.0));
        let hi = self.raw_point((s + 1e-3).min(1.0));
        let fd = hi - lo;
        if fd.length() > 1e-6 {
            return fd.normalized();
        }
        let chord = self.points[self.points.len() - 1] - self.points[0];
        if chord.length() > 1e-6 {
            chord.normalized()
        } else {
            Vec3::X
        }
    }

    pub fn nearest(&self, x: f32, z: f32) -> RoadProjection {
        let q = Vec2::new(x, z);
        let segs = self.polyline.len().saturating_sub(1).max(1);
        let mut best = RoadProjection {
            u: 0.0,
            point: self.polyline[0],
            distance: self.polyline[0].xz().distance(q),
        };
        for (i, pair) in self.polyline.windows(2).enumerate() {
            let a = pair[0].xz();
            let b = pair[1].xz();
            let ab = b - a;
            let len_sq = ab.dot(ab);
            let t = if len_sq > 1e-12 {
                ((q - a).dot(ab) / len_sq).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let p = a + ab * t;
            let d = p.distance(q);
            if d < best.distance {
                best = RoadProjection {
                    u: (i as f32 + t) / segs as f32,
                    point: pair[0].lerp(pair[1], t),
                    distance: d,
                };
            }
        }
        best
    }

    /// Horizontal distance from `(x, z)` to the sampled curve.
    #[inline]
    pub fn distance_to_point(&self, x: f32, z: f32) -> f32 {
        self.nearest(x, z).distance
    }

    /// Maps arc-length `u` to the raw spline parameter.
    fn arc_to_raw(&self, u: f32) -> f32 {
        let u = if u.is_nan() { 0.0 } else { u.clamp(0.0, 1.0) };
        if u >= 1.0 {
            return 1.0;
        }
        if self.length <= f32::EPSILON {
            return u;
        }
        let target = u * self.length;
        let k = match self.arc.partition_point(|&l| l <= target) {
            0 => 0,
            p => (p - 1).min(ARC_DIVISIONS - 1),
        };
        let seg = self.arc[k + 1] - self.arc[k];
        let frac = if seg > 0.0 {
            ((target - self.arc[k]) / seg).clamp(0.0, 1.0)
        } else {
            0.0
        };
        (k as f32 + frac) / ARC_DIVISIONS as f32
    }

    fn segment(&self, s: f32) -> (usize, f32) {
        let m = self.points.len() - 1;
        let scaled = s.clamp(0.0, 1.0) * m as f32;
        let i = (scaled.floor() as usize).min(m - 1);
        (i, scaled - i as f32)
    }

    fn control(&self, i: isize) -> Vec3 {
        let n = self.points.len() as isize;
        if i < 0 {
            self.points[0] * 2.0 - self.points[1]
        } else if i >= n {
            self.points[(n - 1) as usize] * 2.0 - self.points[(n - 2) as usize]
        } else {
            self.points[i as usize]
        }
    }

    fn raw_point(&self, s: f32) -> Vec3 {
        let (i, t) = self.segment(s);
        let i = i as isize;
        let (p0, p1, p2, p3) = (
            self.control(i - 1),
            self.control(i),
            self.control(i + 1),
            self.control(i + 2),
        );
        let t2 = t * t;
        let t3 = t2 * t;
        (p1 * 2.0
            + (p2 - p0) * t
            + (p0 * 2.0 - p1 * 5.0 + p2 * 4.0 - p3) * t2
            + (p1 * 3.0 - p0 - p2 * 3.0 + p3) * t3)
            * 0.5
    }

    fn raw_derivative(&self, s: f32) -> Vec3 {
        let (i, t) = self.segment(s);
        let i = i as isize;
        let (p0, p1, p2, p3) = (
            self.control(i - 1),
            self.control(i),
            self.control(i + 1),
            self.control(i + 2),
        );
        ((p2 - p0)
            + (p0 * 2.0 - p1 * 5.0 + p2 * 4.0 - p3) * (2.0 * t)
            + (p1 * 3.0 - p0 - p2 * 3.0 + p3) * (3.0 * t * t))
            * 0.5
    }
}
