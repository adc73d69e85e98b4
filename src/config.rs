use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use polis_city::{ExclusionZone, LayoutConfig, VegetationConfig, ZoneKind};
use polis_collide::ColliderConfig;
use polis_geom::Vec2;
use polis_road::RoadConfig;
use polis_terrain::{BlendMode, ModifierDef, TerrainConfig};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct WorldConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub terrain: TerrainConfig,
    #[serde(default)]
    pub anchors: AnchorsConfig,
    #[serde(default)]
    pub road: RoadConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub vegetation: VegetationConfig,
    #[serde(default)]
    pub collider: ColliderConfig,
    #[serde(default)]
    pub buildings: BuildingsConfig,
    /// Extra keep-out areas on top of the ones derived from the anchors.
    #[serde(default)]
    pub zones: Vec<ZoneDef>,
    /// Zoning table (TOML or JSON). Relative paths resolve against the
    /// directory of the world config file.
    #[serde(default)]
    pub districts_path: Option<PathBuf>,
}

fn default_seed() -> u64 {
    1337
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            terrain: TerrainConfig::default(),
            anchors: AnchorsConfig::default(),
            road: RoadConfig::default(),
            layout: LayoutConfig::default(),
            vegetation: VegetationConfig::default(),
            collider: ColliderConfig::default(),
            buildings: BuildingsConfig::default(),
            zones: Vec::new(),
            districts_path: None,
        }
    }
}

/// Named city landmarks in world XZ plus the areas derived from them.
#[derive(Clone, Debug, Deserialize)]
pub struct AnchorsConfig {
    #[serde(default = "default_harbor")]
    pub harbor: [f32; 2],
    #[serde(default)]
    pub agora: [f32; 2],
    #[serde(default = "default_acropolis")]
    pub acropolis: [f32; 2],
    /// Vegetation-free ring around the agora.
    #[serde(default = "default_core_radius")]
    pub core_radius: f32,
    #[serde(default = "default_agora_plaza")]
    pub agora_plaza_radius: f32,
    #[serde(default = "default_acropolis_plaza")]
    pub acropolis_plaza_radius: f32,
    #[serde(default = "default_harbor_radius")]
    pub harbor_radius: f32,
    #[serde(default)]
    pub pier: PierConfig,
    /// Adds the harbor basin and city plateau modifiers to the terrain.
    #[serde(default = "default_true")]
    pub shape_terrain: bool,
    #[serde(default)]
    pub basin: FlattenDef,
    #[serde(default = "default_plateau")]
    pub plateau: FlattenDef,
}

fn default_harbor() -> [f32; 2] {
    [170.0, -120.0]
}
fn default_acropolis() -> [f32; 2] {
    [-60.0, 70.0]
}
fn default_core_radius() -> f32 {
    45.0
}
fn default_agora_plaza() -> f32 {
    14.0
}
fn default_acropolis_plaza() -> f32 {
    11.0
}
fn default_harbor_radius() -> f32 {
    30.0
}
fn default_true() -> bool {
    true
}
fn default_plateau() -> FlattenDef {
    FlattenDef {
        inner: 40.0,
        outer: 95.0,
        target: 14.0,
    }
}

impl Default for AnchorsConfig {
    fn default() -> Self {
        Self {
            harbor: default_harbor(),
            agora: [0.0, 0.0],
            acropolis: default_acropolis(),
            core_radius: default_core_radius(),
            agora_plaza_radius: default_agora_plaza(),
            acropolis_plaza_radius: default_acropolis_plaza(),
            harbor_radius: default_harbor_radius(),
            pier: PierConfig::default(),
            shape_terrain: true,
            basin: FlattenDef::default(),
            plateau: default_plateau(),
        }
    }
}

/// Radial flatten toward `target`; the basin target is relative to sea level.
#[derive(Clone, Debug, Deserialize)]
pub struct FlattenDef {
    #[serde(default = "d_inner")]
    pub inner: f32,
    #[serde(default = "d_outer")]
    pub outer: f32,
    #[serde(default)]
    pub target: f32,
}
fn d_inner() -> f32 {
    18.0
}
fn d_outer() -> f32 {
    70.0
}
impl Default for FlattenDef {
    fn default() -> Self {
        Self {
            inner: d_inner(),
            outer: d_outer(),
            target: 0.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct PierConfig {
    #[serde(default = "d_pier_len")]
    pub length: f32,
    #[serde(default = "d_pier_width")]
    pub width: f32,
    /// Deck height above sea level.
    #[serde(default = "d_pier_deck")]
    pub deck: f32,
}
fn d_pier_len() -> f32 {
    28.0
}
fn d_pier_width() -> f32 {
    4.0
}
fn d_pier_deck() -> f32 {
    0.8
}
impl Default for PierConfig {
    fn default() -> Self {
        Self {
            length: d_pier_len(),
            width: d_pier_width(),
            deck: d_pier_deck(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct BuildingsConfig {
    #[serde(default = "d_building_height")]
    pub height: f32,
    /// Kinds that get double height.
    #[serde(default = "d_tall_kinds")]
    pub tall_kinds: Vec<String>,
}
fn d_building_height() -> f32 {
    5.5
}
fn d_tall_kinds() -> Vec<String> {
    vec!["temple".into()]
}
impl Default for BuildingsConfig {
    fn default() -> Self {
        Self {
            height: d_building_height(),
            tall_kinds: d_tall_kinds(),
        }
    }
}

impl BuildingsConfig {
    pub fn height_for(&self, kind: &str) -> f32 {
        if self.tall_kinds.iter().any(|k| k == kind) {
            self.height * 2.0
        } else {
            self.height
        }
    }
}

/// `radius` makes a disc; otherwise `half` makes an oriented rectangle.
#[derive(Clone, Debug, Deserialize)]
pub struct ZoneDef {
    pub name: String,
    pub kind: ZoneKind,
    pub center: [f32; 2],
    #[serde(default)]
    pub radius: Option<f32>,
    #[serde(default)]
    pub half: Option<[f32; 2]>,
    #[serde(default)]
    pub yaw_deg: f32,
}

impl ZoneDef {
    pub fn to_zone(&self) -> ExclusionZone {
        let center = Vec2::new(self.center[0], self.center[1]);
        match (self.radius, self.half) {
            (_, Some([hx, hz])) => ExclusionZone::rect(
                self.name.clone(),
                self.kind,
                center,
                Vec2::new(hx, hz),
                self.yaw_deg.to_radians(),
            ),
            (radius, None) => {
                ExclusionZone::disc(self.name.clone(), self.kind, center, radius.unwrap_or(0.0))
            }
        }
    }
}

impl WorldConfig {
    /// Terrain config with the anchor-derived basin and plateau appended. The
    /// basin is a hard cap so the plateau can never lift the harbor.
    pub fn shaped_terrain(&self) -> TerrainConfig {
        let mut terrain = self.terrain.clone();
        let a = &self.anchors;
        if a.shape_terrain {
            terrain.modifiers.push(ModifierDef {
                name: Some("harbor".into()),
                center: a.harbor,
                inner: a.basin.inner,
                outer: a.basin.outer,
                target: terrain.sea_level + a.basin.target,
                mode: BlendMode::Flatten,
                priority: 0,
                hard_cap: true,
            });
            terrain.modifiers.push(ModifierDef {
                name: Some("plateau".into()),
                center: a.agora,
                inner: a.plateau.inner,
                outer: a.plateau.outer,
                target: a.plateau.target,
                mode: BlendMode::Flatten,
                priority: 10,
                hard_cap: false,
            });
        }
        terrain
    }

    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        Ok(toml::from_str(s)?)
    }

    /// Falls back to defaults (logged) when the file is missing or malformed.
    pub fn load(path: &Path) -> Self {
        match load_world_config_from_path(path) {
            Ok(cfg) => {
                log::info!("world config loaded from {}", path.display());
                cfg
            }
            Err(e) => {
                log::warn!("world config {} unusable ({}); using defaults", path.display(), e);
                Self::default()
            }
        }
    }
}

pub fn load_world_config_from_path(path: &Path) -> Result<WorldConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let mut cfg = WorldConfig::from_toml_str(&s)?;
    if let Some(districts) = cfg.districts_path.as_mut() {
        if districts.is_relative() {
            if let Some(dir) = path.parent() {
                *districts = dir.join(&*districts);
            }
        }
    }
    Ok(cfg)
}
