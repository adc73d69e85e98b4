use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

use crate::modifier::BlendMode;

#[derive(Clone, Debug, Deserialize)]
pub struct TerrainConfig {
    /// Edge length of the square domain in world units.
    #[serde(default = "default_size")]
    pub size: f32,
    /// Grid cells per side; the vertex grid is `(segments + 1)^2`.
    #[serde(default = "default_segments")]
    pub segments: u32,
    #[serde(default = "default_amplitude")]
    pub amplitude: f32,
    #[serde(default = "default_base_offset")]
    pub base_offset: f32,
    #[serde(default)]
    pub sea_level: f32,
    #[serde(default)]
    pub noise: Fractal,
    #[serde(default)]
    pub transform: FieldTransformDef,
    #[serde(default)]
    pub surface: Surface,
    #[serde(default)]
    pub modifiers: Vec<ModifierDef>,
}

fn default_size() -> f32 {
    600.0
}
fn default_segments() -> u32 {
    256
}
fn default_amplitude() -> f32 {
    42.0
}
fn default_base_offset() -> f32 {
    10.0
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            size: default_size(),
            segments: default_segments(),
            amplitude: default_amplitude(),
            base_offset: default_base_offset(),
            sea_level: 0.0,
            noise: Fractal::default(),
            transform: FieldTransformDef::default(),
            surface: Surface::default(),
            modifiers: Vec::new(),
        }
    }
}

impl TerrainConfig {
    #[inline]
    pub fn half_extent(&self) -> f32 {
        self.size * 0.5
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Fractal {
    #[serde(default = "d_oct")]
    pub octaves: u32,
    #[serde(default = "d_pers")]
    pub persistence: f32,
    #[serde(default = "d_lac")]
    pub lacunarity: f32,
    #[serde(default = "d_freq")]
    pub frequency: f32,
}
fn d_oct() -> u32 {
    5
}
fn d_pers() -> f32 {
    0.5
}
fn d_lac() -> f32 {
    2.0
}
fn d_freq() -> f32 {
    0.004
}
impl Default for Fractal {
    fn default() -> Self {
        Self {
            octaves: d_oct(),
            persistence: d_pers(),
            lacunarity: d_lac(),
            frequency: d_freq(),
        }
    }
}

/// Placement of the visual terrain mesh relative to world axes.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FieldTransformDef {
    #[serde(default)]
    pub origin: [f32; 2],
    #[serde(default)]
    pub yaw_deg: f32,
}

/// Ground texture blending thresholds.
#[derive(Clone, Debug, Deserialize)]
pub struct Surface {
    /// Height band above sea level that fades from sand to grass.
    #[serde(default = "default_sand_band")]
    pub sand_band: f32,
    /// Gradient magnitude where rock starts to show.
    #[serde(default = "default_rock_start")]
    pub rock_slope_start: f32,
    /// Gradient magnitude where rock fully covers the ground.
    #[serde(default = "default_rock_full")]
    pub rock_slope_full: f32,
}
fn default_sand_band() -> f32 {
    2.5
}
fn default_rock_start() -> f32 {
    0.55
}
fn default_rock_full() -> f32 {
    1.1
}
impl Default for Surface {
    fn default() -> Self {
        Self {
            sand_band: default_sand_band(),
            rock_slope_start: default_rock_start(),
            rock_slope_full: default_rock_full(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ModifierDef {
    #[serde(default)]
    pub name: Option<String>,
    pub center: [f32; 2],
    pub inner: f32,
    pub outer: f32,
    pub target: f32,
    #[serde(default)]
    pub mode: BlendMode,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub hard_cap: bool,
}

pub fn load_config_from_path(path: &Path) -> Result<TerrainConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let cfg: TerrainConfig = toml::from_str(&s)?;
    Ok(cfg)
}
