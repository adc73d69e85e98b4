use std::fmt;

use polis_geom::{Vec2, Vec3};

use crate::config::{Surface, TerrainConfig};
use crate::modifier::ModifierStack;
use crate::noise::FractalNoise;
use crate::sampler::HeightSampler;

/// Rigid placement of the height grid in world space (XZ offset + yaw).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldTransform {
    pub origin: Vec2,
    pub yaw: f32,
}

impl Default for FieldTransform {
    fn default() -> Self {
        Self {
            origin: Vec2::ZERO,
            yaw: 0.0,
        }
    }
}

impl FieldTransform {
    #[inline]
    pub fn to_local(&self, x: f32, z: f32) -> Vec2 {
        let d = Vec2::new(x, z) - self.origin;
        let (s, c) = self.yaw.sin_cos();
        Vec2::new(c * d.x + s * d.y, -s * d.x + c * d.y)
    }

    #[inline]
    pub fn to_world(&self, lx: f32, lz: f32) -> Vec2 {
        let (s, c) = self.yaw.sin_cos();
        Vec2::new(c * lx - s * lz, s * lx + c * lz) + self.origin
    }
}

/// Immutable height grid over a square domain centered on the field origin.
pub struct HeightField {
    size: f32,
    half: f32,
    segments: u32,
    cell: f32,
    sea_level: f32,
    transform: FieldTransform,
    surface: Surface,
    heights: Vec<f32>,
    base: Option<FractalNoise>,
    amplitude: f32,
    base_offset: f32,
    modifiers: ModifierStack,
}

impl fmt::Debug for HeightField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeightField")
            .field("size", &self.size)
            .field("segments", &self.segments)
            .field("sea_level", &self.sea_level)
            .field("transform", &self.transform)
            .field("modifiers", &self.modifiers.iter().count())
            .finish()
    }
}

impl HeightField {
    /// Evaluates fBm noise plus the ordered modifiers at every grid vertex.
    pub fn build(seed: u64, cfg: &TerrainConfig) -> Self {
        let noise = FractalNoise::new(seed, &cfg.noise);
        let modifiers = ModifierStack::from_defs(&cfg.modifiers);
        let amplitude = cfg.amplitude;
        let offset = cfg.base_offset;
        let transform = FieldTransform {
            origin: Vec2::new(cfg.transform.origin[0], cfg.transform.origin[1]),
            yaw: cfg.transform.yaw_deg.to_radians(),
        };
        let mut field = Self::allocate(cfg.size, cfg.segments, transform);
        field.sea_level = cfg.sea_level;
        field.surface = cfg.surface.clone();
        field.fill(|x, z| {
            let base = offset + amplitude * noise.sample(x, z);
            modifiers.apply(x, z, base)
        });
        field.base = Some(noise);
        field.amplitude = amplitude;
        field.base_offset = offset;
        field.modifiers = modifiers;
        log::debug!(
            "height field built: size={} segments={} modifiers={}",
            field.size,
            field.segments,
            field.modifiers.iter().count()
        );
        field
    }

    /// Grid over `[-size/2, size/2]^2` filled from an arbitrary world-space function.
    pub fn from_fn(size: f32, segments: u32, f: impl Fn(f32, f32) -> f32) -> Self {
        let mut field = Self::allocate(size, segments, FieldTransform::default());
        field.fill(f);
        field
    }

    pub fn with_sea_level(mut self, sea_level: f32) -> Self {
        self.sea_level = sea_level;
        self
    }

    fn allocate(size: f32, segments: u32, transform: FieldTransform) -> Self {
        let size = if size.is_finite() && size > 0.0 {
            size
        } else {
            log::warn!("invalid terrain size {size}; using 1.0");
            1.0
        };
        if segments == 0 {
            log::warn!("terrain segments must be positive; using 1");
        }
        let segments = segments.max(1);
        let verts = (segments as usize + 1) * (segments as usize + 1);
        Self {
            size,
            half: size * 0.5,
            segments,
            cell: size / segments as f32,
            sea_level: 0.0,
            transform,
            surface: Surface::default(),
            heights: vec![0.0; verts],
            base: None,
            amplitude: 1.0,
            base_offset: 0.0,
            modifiers: ModifierStack::default(),
        }
    }

    fn fill(&mut self, f: impl Fn(f32, f32) -> f32) {
        let n = self.segments as usize + 1;
        for j in 0..n {
            for i in 0..n {
                let w = self.vertex_world(i, j);
                self.heights[j * n + i] = f(w.x, w.y);
            }
        }
    }

    #[inline]
    fn vertex_world(&self, i: usize, j: usize) -> Vec2 {
        let lx = -self.half + i as f32 * self.cell;
        let lz = -self.half + j as f32 * self.cell;
        self.transform.to_world(lx, lz)
    }

    #[inline]
    pub fn size(&self) -> f32 {
        self.size
    }

    #[inline]
    pub fn half_extent(&self) -> f32 {
        self.half
    }

    #[inline]
    pub fn segments(&self) -> u32 {
        self.segments
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell
    }

    #[inline]
    pub fn sea_level(&self) -> f32 {
        self.sea_level
    }

    #[inline]
    pub fn transform(&self) -> FieldTransform {
        self.transform
    }

    pub fn modifiers(&self) -> &ModifierStack {
        &self.modifiers
    }

    #[inline]
    pub fn contains(&self, x: f32, z: f32) -> bool {
        let l = self.transform.to_local(x, z);
        l.x.abs() <= self.half && l.y.abs() <= self.half
    }

    /// Raw grid vertex height; `(i, j)` index local x then local z.
    #[inline]
    pub fn vertex_height(&self, i: usize, j: usize) -> Option<f32> {
        let n = self.segments as usize + 1;
        if i >= n || j >= n {
            return None;
        }
        self.heights.get(j * n + i).copied()
    }

    /// Bilinear interpolation of the four grid vertices around `(x, z)`.
    pub fn sample_height(&self, x: f32, z: f32) -> Option<f32> {
        if !x.is_finite() || !z.is_finite() {
            return None;
        }
        let l = self.transform.to_local(x, z);
        if l.x.abs() > self.half || l.y.abs() > self.half {
            return None;
        }
        let seg = self.segments as usize;
        let n = seg + 1;
        let gx = ((l.x + self.half) / self.cell).clamp(0.0, seg as f32);
        let gz = ((l.y + self.half) / self.cell).clamp(0.0, seg as f32);
        let i0 = (gx.floor() as usize).min(seg - 1);
        let j0 = (gz.floor() as usize).min(seg - 1);
        let fx = gx - i0 as f32;
        let fz = gz - j0 as f32;
        let h00 = self.heights[j0 * n + i0];
        let h10 = self.heights[j0 * n + i0 + 1];
        let h01 = self.heights[(j0 + 1) * n + i0];
        let h11 = self.heights[(j0 + 1) * n + i0 + 1];
        let a = h00 + (h10 - h00) * fx;
        let b = h01 + (h11 - h01) * fx;
        Some(a + (b - a) * fz)
    }

    #[inline]
    pub fn sample_slope(&self, x: f32, z: f32, offset: f32) -> f32 {
        HeightSampler::slope(self, x, z, offset)
    }

    /// Continuous terrain height before modifiers, scaled and offset like the
    /// grid; `None` for fields built from a function.
    pub fn base_height(&self, x: f32, z: f32) -> Option<f32> {
        self.base
            .as_ref()
            .map(|n| self.base_offset + self.amplitude * n.sample(x, z))
    }

    pub fn normal_at(&self, x: f32, z: f32) -> Vec3 {
        match HeightSampler::gradient(self, x, z, self.cell) {
            Some(g) => Vec3::new(-g.x, 1.0, -g.y).normalized(),
            None => Vec3::UP,
        }
    }

    /// Ground texture blend weights at `(x, z)`.
    pub fn surface_weights(&self, x: f32, z: f32) -> SurfaceWeights {
        let Some(h) = self.sample_height(x, z) else {
            return SurfaceWeights::default();
        };
        let steep = HeightSampler::gradient(self, x, z, self.cell)
            .map(|g| g.length())
            .unwrap_or(0.0);
        SurfaceWeights::from_terrain(&self.surface, h - self.sea_level, steep)
    }
}

impl HeightSampler for HeightField {
    #[inline]
    fn sample(&self, x: f32, z: f32) -> Option<f32> {
        self.sample_height(x, z)
    }
}

/// Normalized sand/grass/rock weights for ground texture blending.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceWeights {
    pub sand: f32,
    pub grass: f32,
    pub rock: f32,
}

impl Default for SurfaceWeights {
    fn default() -> Self {
        Self {
            sand: 0.0,
            grass: 1.0,
            rock: 0.0,
        }
    }
}

impl SurfaceWeights {
    pub fn from_terrain(surface: &Surface, above_sea: f32, steepness: f32) -> Self {
        let sand = 1.0 - polis_geom::smoothstep(0.0, surface.sand_band.max(1e-3), above_sea);
        let rock = polis_geom::smoothstep(
            surface.rock_slope_start,
            surface.rock_slope_full.max(surface.rock_slope_start + 1e-3),
            steepness,
        );
        // Rock wins over sand on cliffs by the shore.
        let sand = sand * (1.0 - rock);
        let grass = (1.0 - sand - rock).max(0.0);
        let sum = sand + grass + rock;
        if sum <= 0.0 {
            return Self::default();
        }
        Self {
            sand: sand / sum,
            grass: grass / sum,
            rock: rock / sum,
        }
    }
}
