//! Building lot placement: road-hugging candidates first, then a uniform disc
//! around the city center, each filtered through terrain, zoning and spacing
//! rules.

use std::f32::consts::TAU;

use hashbrown::HashMap;
use polis_geom::{Vec2, Vec3, yaw_toward};
use polis_road::RoadCurve;
use polis_terrain::HeightSampler;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

use crate::districts::{District, DistrictRules};
use crate::placement::{Placement, Reject};
use crate::rng::{LAYOUT_STREAM, stream_rng};
use crate::zones::{ExclusionZone, ZoneKind};

#[derive(Clone, Debug, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_target")]
    pub target_count: usize,
    /// Attempt budget is `target_count * max_attempt_multiplier`.
    #[serde(default = "default_attempt_multiplier")]
    pub max_attempt_multiplier: usize,
    /// Share of the attempt budget spent on road-adjacent candidates.
    #[serde(default = "default_road_fraction")]
    pub road_fraction: f32,
    #[serde(default = "default_city_radius")]
    pub city_radius: f32,
    /// Floor on center-to-center spacing; density spacing may raise it.
    #[serde(default = "default_min_separation")]
    pub min_separation: f32,
    /// Overrides the zoning table's per-lot slope limit.
    #[serde(default)]
    pub max_slope_delta: Option<f32>,
    /// Overrides the zoning table's road setback.
    #[serde(default)]
    pub road_setback: Option<f32>,
    #[serde(default = "default_road_half_width")]
    pub road_half_width: f32,
    /// Extra random depth of road-adjacent candidates beyond the clearance line.
    #[serde(default = "default_road_band")]
    pub road_band: f32,
    /// Lots closer than this to the road face it.
    #[serde(default = "default_road_adjacent")]
    pub road_adjacent_distance: f32,
    /// Lots must stand this far above the terrain's sea level.
    #[serde(default = "default_sea_epsilon")]
    pub sea_epsilon: f32,
    #[serde(default)]
    pub surface_offset: f32,
    #[serde(default)]
    pub reference_yaw_deg: f32,
    /// Weight of the landmark direction mixed into downhill facing.
    #[serde(default = "default_landmark_bias")]
    pub landmark_bias: f32,
    /// Half extents `[x, z]` per building kind.
    #[serde(default = "default_footprints")]
    pub footprints: HashMap<String, [f32; 2]>,
    #[serde(default = "default_footprint")]
    pub default_footprint: [f32; 2],
    #[serde(default = "default_footprint_jitter")]
    pub footprint_jitter: f32,
    /// Kinds that are rendered but never collide (awnings, market stalls...).
    #[serde(default)]
    pub non_collidable_types: Vec<String>,
}

fn default_target() -> usize {
    60
}
fn default_attempt_multiplier() -> usize {
    8
}
fn default_road_fraction() -> f32 {
    0.6
}
fn default_city_radius() -> f32 {
    140.0
}
fn default_min_separation() -> f32 {
    7.0
}
fn default_road_half_width() -> f32 {
    2.5
}
fn default_road_band() -> f32 {
    8.0
}
fn default_road_adjacent() -> f32 {
    14.0
}
fn default_sea_epsilon() -> f32 {
    0.6
}
fn default_landmark_bias() -> f32 {
    0.35
}
fn default_footprint() -> [f32; 2] {
    [3.0, 3.0]
}
fn default_footprint_jitter() -> f32 {
    0.15
}
fn default_footprints() -> HashMap<String, [f32; 2]> {
    [
        ("house", [3.0, 3.0]),
        ("workshop", [3.5, 4.5]),
        ("warehouse", [5.0, 7.0]),
        ("temple", [6.0, 9.0]),
        ("stall", [1.5, 1.5]),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            target_count: default_target(),
            max_attempt_multiplier: default_attempt_multiplier(),
            road_fraction: default_road_fraction(),
            city_radius: default_city_radius(),
            min_separation: default_min_separation(),
            max_slope_delta: None,
            road_setback: None,
            road_half_width: default_road_half_width(),
            road_band: default_road_band(),
            road_adjacent_distance: default_road_adjacent(),
            sea_epsilon: default_sea_epsilon(),
            surface_offset: 0.0,
            reference_yaw_deg: 0.0,
            landmark_bias: default_landmark_bias(),
            footprints: default_footprints(),
            default_footprint: default_footprint(),
            footprint_jitter: default_footprint_jitter(),
            non_collidable_types: Vec::new(),
        }
    }
}

impl LayoutConfig {
    pub fn footprint_for(&self, kind: &str) -> Vec2 {
        let [x, z] = self.footprints.get(kind).copied().unwrap_or(self.default_footprint);
        Vec2::new(x.abs(), z.abs())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Facing {
    Road,
    Downhill,
    Reference,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CityLot {
    pub id: u32,
    /// Footprint center resting on the terrain.
    pub position: Vec3,
    pub yaw: f32,
    pub half_extents: Vec2,
    pub district: String,
    pub kind: String,
    pub facing: Facing,
    pub collidable: bool,
}

impl CityLot {
    /// Radius of the circle circumscribing the footprint.
    pub fn footprint_radius(&self) -> f32 {
        self.half_extents.length()
    }

    /// Whether `p` falls inside the footprint grown by `buffer`.
    pub fn covers(&self, p: Vec2, buffer: f32) -> bool {
        let local = crate::zones::rotate(p - self.position.xz(), -self.yaw);
        local.x.abs() <= self.half_extents.x + buffer && local.y.abs() <= self.half_extents.y + buffer
    }
}

/// Uniform bucket grid for the separation test.
struct SeparationGrid {
    cell: f32,
    buckets: HashMap<(i32, i32), Vec<Vec2>>,
}

impl SeparationGrid {
    fn new(cell: f32) -> Self {
        Self {
            cell: cell.max(1e-3),
            buckets: HashMap::new(),
        }
    }

    fn key(&self, p: Vec2) -> (i32, i32) {
        ((p.x / self.cell).floor() as i32, (p.y / self.cell).floor() as i32)
    }

    /// `radius` must not exceed the cell size.
    fn is_clear(&self, p: Vec2, radius: f32) -> bool {
        let (cx, cz) = self.key(p);
        for dz in -1..=1 {
            for dx in -1..=1 {
                if let Some(list) = self.buckets.get(&(cx + dx, cz + dz)) {
                    if list.iter().any(|q| q.distance(p) < radius) {
                        return false;
                    }
                }
            }
        }
        true
    }

    fn insert(&mut self, p: Vec2) {
        let k = self.key(p);
        self.buckets.entry(k).or_default().push(p);
    }
}

pub struct CityLayout<'a, S: ?Sized> {
    sampler: &'a S,
    road: &'a RoadCurve,
    districts: &'a DistrictRules,
    zones: &'a [ExclusionZone],
    center: Vec2,
    landmark: Option<Vec2>,
    sea_level: f32,
    config: &'a LayoutConfig,
}

impl<'a, S> CityLayout<'a, S>
where
    S: HeightSampler + ?Sized,
{
    pub fn new(
        sampler: &'a S,
        road: &'a RoadCurve,
        districts: &'a DistrictRules,
        config: &'a LayoutConfig,
        sea_level: f32,
    ) -> Self {
        Self {
            sampler,
            road,
            districts,
            zones: &[],
            center: Vec2::ZERO,
            landmark: None,
            sea_level,
            config,
        }
    }

    pub fn with_zones(mut self, zones: &'a [ExclusionZone]) -> Self {
        self.zones = zones;
        self
    }

    pub fn with_center(mut self, center: Vec2) -> Self {
        self.center = center;
        self
    }

    /// Point downhill-facing lots lean toward (the harbor).
    pub fn with_landmark(mut self, landmark: Vec2) -> Self {
        self.landmark = Some(landmark);
        self
    }

    fn slope_limit(&self) -> f32 {
        self.config
            .max_slope_delta
            .unwrap_or(self.districts.defaults().max_slope_delta_per_lot)
    }

    fn road_clearance(&self) -> f32 {
        self.config.road_half_width
            + self
                .config
                .road_setback
                .unwrap_or(self.districts.defaults().road_setback_meters)
    }

    fn reference_yaw(&self) -> f32 {
        self.config.reference_yaw_deg.to_radians()
    }

    pub fn generate(&self, seed: u64) -> Placement<CityLot> {
        let cfg = self.config;
        let mut out = Placement::empty(cfg.target_count);
        if cfg.target_count == 0 {
            return out;
        }
        let mut rng = stream_rng(seed, LAYOUT_STREAM);
        let budget = cfg.target_count.saturating_mul(cfg.max_attempt_multiplier.max(1));
        let road_budget = (budget as f32 * cfg.road_fraction.clamp(0.0, 1.0)) as usize;
        let spacing_cell = self.districts.max_spacing().max(cfg.min_separation);
        let mut grid = SeparationGrid::new(spacing_cell);

        while out.attempts < budget && out.items.len() < cfg.target_count {
            let along_road = out.attempts < road_budget;
            out.attempts += 1;
            let candidate = if along_road {
                self.road_candidate(&mut rng)
            } else {
                self.disc_candidate(&mut rng)
            };
            match self.evaluate(candidate, &mut rng, &grid) {
                Ok(mut lot) => {
                    lot.id = out.items.len() as u32;
                    grid.insert(lot.position.xz());
                    out.items.push(lot);
                }
                Err(reason) => out.rejections.record(reason),
            }
        }
        out.log_summary("city layout");
        out
    }

    fn road_candidate(&self, rng: &mut ChaCha8Rng) -> Vec2 {
        let u: f32 = rng.r#gen();
        let base = self.road.point_at(u).xz();
        let mut along = self.road.tangent_at(u).xz().normalized();
        if along.length() < 1e-6 {
            along = Vec2::new(1.0, 0.0);
        }
        let side = if rng.r#gen::<bool>() { 1.0 } else { -1.0 };
        let fp = Vec2::new(self.config.default_footprint[0], self.config.default_footprint[1]).length();
        let depth = self.road_clearance() + fp + rng.r#gen::<f32>() * self.config.road_band.max(0.0);
        let slide = rng.gen_range(-2.0f32..=2.0);
        base + along.perp() * (side * depth) + along * slide
    }

    fn disc_candidate(&self, rng: &mut ChaCha8Rng) -> Vec2 {
        let r = self.config.city_radius.max(0.0) * rng.r#gen::<f32>().sqrt();
        let theta = rng.r#gen::<f32>() * TAU;
        self.center + Vec2::new(theta.cos() * r, theta.sin() * r)
    }

    fn evaluate(&self, p: Vec2, rng: &mut ChaCha8Rng, grid: &SeparationGrid) -> Result<CityLot, Reject> {
        let cfg = self.config;
        let height = self.sampler.sample(p.x, p.y).ok_or(Reject::OutOfDomain)?;

        let district = self.districts.resolve_height(height);
        let kind = pick_kind(district, rng).ok_or(Reject::Zoning)?;
        let jitter = 1.0 + rng.gen_range(-1.0f32..=1.0) * cfg.footprint_jitter.clamp(0.0, 0.9);
        let half = cfg.footprint_for(&kind) * jitter;
        let radius = half.length();

        if self.sampler.slope(p.x, p.y, radius) > self.slope_limit() {
            return Err(Reject::Slope);
        }
        if let Some(zone) = self
            .zones
            .iter()
            .find(|z| z.kind.blocks_buildings() && z.contains(p, radius))
        {
            return Err(match zone.kind {
                ZoneKind::Harbor => Reject::Harbor,
                ZoneKind::Pier => Reject::Pier,
                ZoneKind::Plaza => Reject::Plaza,
                _ => Reject::Water,
            });
        }
        let projection = self.road.nearest(p.x, p.y);
        if projection.distance < self.road_clearance() + radius {
            return Err(Reject::Road);
        }
        let spacing = self
            .districts
            .spacing_for(district.density)
            .max(cfg.min_separation);
        if !grid.is_clear(p, spacing) {
            return Err(Reject::Separation);
        }
        if height < self.sea_level + cfg.sea_epsilon {
            return Err(Reject::SeaLevel);
        }

        let (yaw, facing) = self.orient(p, projection.point.xz(), projection.distance, radius);
        Ok(CityLot {
            id: 0,
            position: Vec3::new(p.x, height + cfg.surface_offset, p.y),
            yaw,
            half_extents: half,
            district: district.id.clone(),
            collidable: !cfg.non_collidable_types.iter().any(|t| t == &kind),
            kind,
            facing,
        })
    }

    fn orient(&self, p: Vec2, road_point: Vec2, road_distance: f32, step: f32) -> (f32, Facing) {
        if road_distance <= self.config.road_adjacent_distance {
            let to_road = road_point - p;
            if to_road.length() > 1e-4 {
                return (yaw_toward(to_road), Facing::Road);
            }
        }
        match self.sampler.gradient(p.x, p.y, step) {
            Some(g) if g.is_finite() && g.length() > 1e-6 => {
                let downhill = (-g).normalized();
                let mut dir = downhill;
                if let Some(landmark) = self.landmark {
                    let toward = (landmark - p).normalized();
                    let mixed = downhill + toward * self.config.landmark_bias;
                    if mixed.length() > 1e-4 {
                        dir = mixed;
                    }
                }
                (yaw_toward(dir), Facing::Downhill)
            }
            _ => (self.reference_yaw(), Facing::Reference),
        }
    }
}

fn pick_kind(district: &District, rng: &mut ChaCha8Rng) -> Option<String> {
    if district.allowed_types.is_empty() {
        return None;
    }
    let i = rng.gen_range(0..district.allowed_types.len());
    Some(district.allowed_types[i].clone())
}
