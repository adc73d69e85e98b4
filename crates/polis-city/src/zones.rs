//! Keep-out areas (water, plazas, pier, harbor, city core) shared by the
//! building and vegetation passes.

use polis_geom::Vec2;
use serde::Deserialize;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    Core,
    Harbor,
    Pier,
    Plaza,
    Water,
}

impl ZoneKind {
    /// The core ring only keeps vegetation out; buildings fill it.
    pub fn blocks_buildings(self) -> bool {
        !matches!(self, ZoneKind::Core)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ZoneShape {
    Disc { center: Vec2, radius: f32 },
    /// Oriented rectangle; `yaw` rotates local +Z toward world XZ like every
    /// other yaw in the pipeline.
    Rect { center: Vec2, half: Vec2, yaw: f32 },
}

impl ZoneShape {
    /// True when `p` lies inside the shape grown by `buffer` meters.
    pub fn contains(&self, p: Vec2, buffer: f32) -> bool {
        match *self {
            ZoneShape::Disc { center, radius } => p.distance(center) <= radius + buffer,
            ZoneShape::Rect { center, half, yaw } => {
                let local = rotate(p - center, -yaw);
                local.x.abs() <= half.x + buffer && local.y.abs() <= half.y + buffer
            }
        }
    }

    pub fn center(&self) -> Vec2 {
        match *self {
            ZoneShape::Disc { center, .. } | ZoneShape::Rect { center, .. } => center,
        }
    }
}

/// Rotates an XZ offset by `yaw` in the `yaw_toward` convention.
pub fn rotate(v: Vec2, yaw: f32) -> Vec2 {
    let (s, c) = yaw.sin_cos();
    Vec2::new(v.x * c + v.y * s, -v.x * s + v.y * c)
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExclusionZone {
    pub name: String,
    pub kind: ZoneKind,
    pub shape: ZoneShape,
}

impl ExclusionZone {
    pub fn disc(name: impl Into<String>, kind: ZoneKind, center: Vec2, radius: f32) -> Self {
        Self {
            name: name.into(),
            kind,
            shape: ZoneShape::Disc {
                center,
                radius: radius.max(0.0),
            },
        }
    }

    pub fn rect(name: impl Into<String>, kind: ZoneKind, center: Vec2, half: Vec2, yaw: f32) -> Self {
        Self {
            name: name.into(),
            kind,
            shape: ZoneShape::Rect {
                center,
                half: Vec2::new(half.x.abs(), half.y.abs()),
                yaw,
            },
        }
    }

    #[inline]
    pub fn contains(&self, p: Vec2, buffer: f32) -> bool {
        self.shape.contains(p, buffer)
    }
}

/// Axis-aligned XZ rectangle used as a scatter domain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds2 {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds2 {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: Vec2::new(min.x.min(max.x), min.y.min(max.y)),
            max: Vec2::new(min.x.max(max.x), min.y.max(max.y)),
        }
    }

    pub fn centered(center: Vec2, half: f32) -> Self {
        let h = half.abs();
        Self::new(center - Vec2::new(h, h), center + Vec2::new(h, h))
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn area(&self) -> f32 {
        (self.max.x - self.min.x) * (self.max.y - self.min.y)
    }
}
