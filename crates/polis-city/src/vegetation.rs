//! Instanced ground cover scattered around the city ring.
//!
//! Each layer rejection-samples the domain with its own RNG stream. Candidates
//! are tested in a fixed order (ring, core, harbor, pier, plaza, road, lots,
//! sea level, slope) so rejection counters are comparable between runs.

use std::f32::consts::TAU;

use polis_geom::{Vec2, Vec3};
use polis_road::RoadCurve;
use polis_terrain::HeightSampler;
use rand::Rng;
use serde::Deserialize;

use crate::layout::CityLot;
use crate::placement::{Placement, Reject};
use crate::rng::{VEGETATION_STREAM_BASE, stream_rng};
use crate::zones::{Bounds2, ExclusionZone, ZoneKind};

#[derive(Clone, Debug, Deserialize)]
pub struct VegetationConfig {
    #[serde(default = "default_layers")]
    pub layers: Vec<LayerConfig>,
}

impl Default for VegetationConfig {
    fn default() -> Self {
        Self {
            layers: default_layers(),
        }
    }
}

fn default_layers() -> Vec<LayerConfig> {
    vec![
        LayerConfig::default(),
        LayerConfig {
            name: "shrubs".into(),
            seed_salt: 0x5eed_0002,
            target_count: 600,
            min_scale: 0.6,
            max_scale: 1.4,
            base_color: [0.22, 0.33, 0.16],
            max_lean: 0.08,
            max_slope: 1.2,
            ..LayerConfig::default()
        },
    ]
}

#[derive(Clone, Debug, Deserialize)]
pub struct LayerConfig {
    #[serde(default = "default_layer_name")]
    pub name: String,
    /// Mixed into the world seed so layers with equal settings still differ.
    #[serde(default)]
    pub seed_salt: u64,
    #[serde(default = "default_layer_target")]
    pub target_count: usize,
    #[serde(default = "default_layer_multiplier")]
    pub max_attempt_multiplier: usize,
    /// Annulus around the city center that may hold instances.
    #[serde(default)]
    pub ring_inner: f32,
    #[serde(default = "default_ring_outer")]
    pub ring_outer: f32,
    #[serde(default)]
    pub core_buffer: f32,
    #[serde(default = "default_zone_buffer")]
    pub harbor_buffer: f32,
    #[serde(default = "default_zone_buffer")]
    pub pier_buffer: f32,
    #[serde(default = "default_zone_buffer")]
    pub plaza_buffer: f32,
    /// Minimum distance from the road centerline.
    #[serde(default = "default_road_buffer")]
    pub road_buffer: f32,
    #[serde(default = "default_lot_buffer")]
    pub lot_buffer: f32,
    #[serde(default = "default_sea_epsilon")]
    pub sea_epsilon: f32,
    #[serde(default = "default_max_slope")]
    pub max_slope: f32,
    #[serde(default = "default_slope_offset")]
    pub slope_offset: f32,
    #[serde(default = "default_min_scale")]
    pub min_scale: f32,
    #[serde(default = "default_max_scale")]
    pub max_scale: f32,
    #[serde(default = "default_base_color")]
    pub base_color: [f32; 3],
    #[serde(default = "default_color_jitter")]
    pub color_jitter: f32,
    /// Radians.
    #[serde(default = "default_max_lean")]
    pub max_lean: f32,
}

fn default_layer_name() -> String {
    "grass".into()
}
fn default_layer_target() -> usize {
    2400
}
fn default_layer_multiplier() -> usize {
    6
}
fn default_ring_outer() -> f32 {
    280.0
}
fn default_zone_buffer() -> f32 {
    2.0
}
fn default_road_buffer() -> f32 {
    4.0
}
fn default_lot_buffer() -> f32 {
    1.0
}
fn default_sea_epsilon() -> f32 {
    0.4
}
fn default_max_slope() -> f32 {
    0.8
}
fn default_slope_offset() -> f32 {
    1.0
}
fn default_min_scale() -> f32 {
    0.7
}
fn default_max_scale() -> f32 {
    1.3
}
fn default_base_color() -> [f32; 3] {
    [0.36, 0.48, 0.22]
}
fn default_color_jitter() -> f32 {
    0.08
}
fn default_max_lean() -> f32 {
    0.2
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            name: default_layer_name(),
            seed_salt: 0x5eed_0001,
            target_count: default_layer_target(),
            max_attempt_multiplier: default_layer_multiplier(),
            ring_inner: 0.0,
            ring_outer: default_ring_outer(),
            core_buffer: 0.0,
            harbor_buffer: default_zone_buffer(),
            pier_buffer: default_zone_buffer(),
            plaza_buffer: default_zone_buffer(),
            road_buffer: default_road_buffer(),
            lot_buffer: default_lot_buffer(),
            sea_epsilon: default_sea_epsilon(),
            max_slope: default_max_slope(),
            slope_offset: default_slope_offset(),
            min_scale: default_min_scale(),
            max_scale: default_max_scale(),
            base_color: default_base_color(),
            color_jitter: default_color_jitter(),
            max_lean: default_max_lean(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindParams {
    pub strength: f32,
    /// Radians per second.
    pub frequency: f32,
    /// XZ direction the wind blows toward.
    pub direction: Vec2,
}

impl Default for WindParams {
    fn default() -> Self {
        Self {
            strength: 0.15,
            frequency: 1.7,
            direction: Vec2::new(1.0, 0.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VegetationInstance {
    pub position: Vec3,
    pub scale: f32,
    pub yaw: f32,
    pub color: [f32; 3],
    /// Static lean in radians along `yaw`; negative leans backward.
    pub lean: f32,
    pub phase: f32,
}

impl VegetationInstance {
    /// XZ displacement of the instance tip at `time`. Pure function of its
    /// inputs; the renderer calls it every frame.
    pub fn sway_offset(&self, time: f32, wind: &WindParams) -> Vec2 {
        let (s, c) = self.yaw.sin_cos();
        let rest = Vec2::new(s, c) * (self.lean.sin() * self.scale);
        let dir = wind.direction.normalized();
        let gust = (time * wind.frequency + self.phase).sin() * wind.strength * self.scale;
        rest + dir * gust
    }
}

/// Flat per-instance attribute arrays for an instanced draw call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstanceBuffers {
    pub offsets: Vec<f32>,
    pub scales: Vec<f32>,
    pub rotations: Vec<f32>,
    pub colors: Vec<f32>,
    pub leans: Vec<f32>,
}

impl InstanceBuffers {
    pub fn from_instances(instances: &[VegetationInstance]) -> Self {
        let mut b = InstanceBuffers {
            offsets: Vec::with_capacity(instances.len() * 3),
            scales: Vec::with_capacity(instances.len()),
            rotations: Vec::with_capacity(instances.len()),
            colors: Vec::with_capacity(instances.len() * 3),
            leans: Vec::with_capacity(instances.len()),
        };
        for inst in instances {
            b.offsets
                .extend_from_slice(&[inst.position.x, inst.position.y, inst.position.z]);
            b.scales.push(inst.scale);
            b.rotations.push(inst.yaw);
            b.colors.extend_from_slice(&inst.color);
            b.leans.push(inst.lean);
        }
        b
    }

    pub fn len(&self) -> usize {
        self.scales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scales.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct VegetationLayer {
    pub name: String,
    pub instances: Vec<VegetationInstance>,
    pub buffers: InstanceBuffers,
    pub requested: usize,
}

impl Placement<VegetationInstance> {
    /// `None` when nothing was placed; empty layers are never emitted.
    pub fn into_layer(self, name: impl Into<String>) -> Option<VegetationLayer> {
        if self.items.is_empty() {
            return None;
        }
        Some(VegetationLayer {
            name: name.into(),
            buffers: InstanceBuffers::from_instances(&self.items),
            instances: self.items,
            requested: self.requested,
        })
    }
}

pub struct VegetationScatter<'a, S: ?Sized> {
    sampler: &'a S,
    domain: Bounds2,
    center: Vec2,
    sea_level: f32,
    road: Option<&'a RoadCurve>,
    zones: &'a [ExclusionZone],
    lots: &'a [CityLot],
}

impl<'a, S> VegetationScatter<'a, S>
where
    S: HeightSampler + ?Sized,
{
    pub fn new(sampler: &'a S, domain: Bounds2, sea_level: f32) -> Self {
        Self {
            sampler,
            domain,
            center: Vec2::ZERO,
            sea_level,
            road: None,
            zones: &[],
            lots: &[],
        }
    }

    pub fn with_center(mut self, center: Vec2) -> Self {
        self.center = center;
        self
    }

    pub fn with_road(mut self, road: &'a RoadCurve) -> Self {
        self.road = Some(road);
        self
    }

    pub fn with_zones(mut self, zones: &'a [ExclusionZone]) -> Self {
        self.zones = zones;
        self
    }

    pub fn with_lots(mut self, lots: &'a [CityLot]) -> Self {
        self.lots = lots;
        self
    }

    pub fn scatter_layer(&self, seed: u64, index: usize, layer: &LayerConfig) -> Placement<VegetationInstance> {
        let mut out = Placement::empty(layer.target_count);
        if layer.target_count == 0 {
            return out;
        }
        let mut rng = stream_rng(seed ^ layer.seed_salt, VEGETATION_STREAM_BASE + index as u64);
        let budget = layer
            .target_count
            .saturating_mul(layer.max_attempt_multiplier.max(1));
        let (min_scale, max_scale) = ordered(layer.min_scale, layer.max_scale);

        while out.attempts < budget && out.items.len() < layer.target_count {
            out.attempts += 1;
            let p = Vec2::new(
                lerp_range(self.domain.min.x, self.domain.max.x, rng.r#gen()),
                lerp_range(self.domain.min.y, self.domain.max.y, rng.r#gen()),
            );
            let height = match self.check(p, layer) {
                Ok(h) => h,
                Err(reason) => {
                    out.rejections.record(reason);
                    continue;
                }
            };
            let jitter = |rng: &mut rand_chacha::ChaCha8Rng, c: f32| {
                (c + rng.gen_range(-1.0f32..=1.0) * layer.color_jitter).clamp(0.0, 1.0)
            };
            let color = [
                jitter(&mut rng, layer.base_color[0]),
                jitter(&mut rng, layer.base_color[1]),
                jitter(&mut rng, layer.base_color[2]),
            ];
            out.items.push(VegetationInstance {
                position: Vec3::new(p.x, height, p.y),
                scale: lerp_range(min_scale, max_scale, rng.r#gen()),
                yaw: rng.r#gen::<f32>() * TAU,
                color,
                lean: rng.gen_range(-1.0f32..=1.0) * layer.max_lean.abs(),
                phase: rng.r#gen::<f32>() * TAU,
            });
        }
        out.log_summary(&format!("vegetation layer {:?}", layer.name));
        out
    }

    /// Terrain height at `p` when every rule passes.
    fn check(&self, p: Vec2, layer: &LayerConfig) -> Result<f32, Reject> {
        let r = p.distance(self.center);
        if r < layer.ring_inner || r > layer.ring_outer {
            return Err(Reject::OutsideRing);
        }
        for (kind, buffer, reason) in [
            (ZoneKind::Core, layer.core_buffer, Reject::Core),
            (ZoneKind::Harbor, layer.harbor_buffer, Reject::Harbor),
            (ZoneKind::Pier, layer.pier_buffer, Reject::Pier),
            (ZoneKind::Plaza, layer.plaza_buffer, Reject::Plaza),
        ] {
            if self
                .zones
                .iter()
                .any(|z| z.kind == kind && z.contains(p, buffer))
            {
                return Err(reason);
            }
        }
        if let Some(road) = self.road {
            if road.distance_to_point(p.x, p.y) < layer.road_buffer {
                return Err(Reject::Road);
            }
        }
        if self.lots.iter().any(|lot| lot.covers(p, layer.lot_buffer)) {
            return Err(Reject::Lot);
        }
        // No ground is treated as unbounded slope.
        let height = self.sampler.sample(p.x, p.y).ok_or(Reject::Slope)?;
        if height < self.sea_level + layer.sea_epsilon {
            return Err(Reject::SeaLevel);
        }
        if self.sampler.slope(p.x, p.y, layer.slope_offset) > layer.max_slope {
            return Err(Reject::Slope);
        }
        Ok(height)
    }

    /// Scatters every configured layer, dropping the ones that came out empty.
    pub fn scatter_all(&self, seed: u64, config: &VegetationConfig) -> Vec<VegetationLayer> {
        config
            .layers
            .iter()
            .enumerate()
            .filter_map(|(i, layer)| {
                let placed = self.scatter_layer(seed, i, layer);
                let built = placed.into_layer(layer.name.clone());
                if built.is_none() {
                    log::info!("vegetation layer {:?} produced no instances", layer.name);
                }
                built
            })
            .collect()
    }
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b { (a, b) } else { (b, a) }
}

fn lerp_range(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(yaw: f32, lean: f32) -> VegetationInstance {
        VegetationInstance {
            position: Vec3::ZERO,
            scale: 1.0,
            yaw,
            color: [0.0; 3],
            lean,
            phase: 0.0,
        }
    }

    #[test]
    fn sway_is_pure_and_bounded() {
        let inst = instance(0.3, 0.1);
        let wind = WindParams::default();
        assert_eq!(inst.sway_offset(2.5, &wind), inst.sway_offset(2.5, &wind));
        for i in 0..50 {
            let o = inst.sway_offset(i as f32 * 0.37, &wind);
            assert!(o.length() <= 0.1f32.sin() + wind.strength + 1e-5);
        }
    }

    #[test]
    fn still_air_leaves_only_the_rest_lean() {
        let inst = instance(0.0, 0.2);
        let calm = WindParams {
            strength: 0.0,
            ..WindParams::default()
        };
        let o = inst.sway_offset(10.0, &calm);
        assert!(o.x.abs() < 1e-6);
        assert!((o.y - 0.2f32.sin()).abs() < 1e-6);
    }

    #[test]
    fn buffers_are_flattened_in_order() {
        let mut a = instance(1.0, 0.0);
        a.position = Vec3::new(1.0, 2.0, 3.0);
        a.color = [0.1, 0.2, 0.3];
        let b = instance(2.0, 0.5);
        let buf = InstanceBuffers::from_instances(&[a, b]);
        assert_eq!(buf.len(), 2);
        assert_eq!(&buf.offsets[..3], &[1.0, 2.0, 3.0]);
        assert_eq!(&buf.colors[..3], &[0.1, 0.2, 0.3]);
        assert_eq!(buf.rotations, vec![1.0, 2.0]);
        assert_eq!(buf.leans, vec![0.0, 0.5]);
    }

    #[test]
    fn empty_placement_yields_no_layer() {
        let p: Placement<VegetationInstance> = Placement::empty(10);
        assert!(p.into_layer("grass").is_none());
    }
}
