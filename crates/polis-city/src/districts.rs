//! Height-banded zoning table.
//!
//! Accepts TOML (`[[districts]]`, snake_case) or JSON (camelCase aliases such as
//! `heightRange` and `allowedTypes`). `null`/missing range bounds are unbounded.

use std::error::Error;
use std::fs;
use std::path::Path;

use polis_terrain::HeightSampler;
use serde::Deserialize;

pub const FALLBACK_DISTRICT_ID: &str = "default";

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    High,
    #[default]
    Medium,
    Low,
}

impl Density {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Density::High),
            "medium" => Some(Density::Medium),
            "low" => Some(Density::Low),
            _ => None,
        }
    }
}

/// Inclusive height band.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(from = "[Option<f32>; 2]")]
pub struct HeightRange {
    pub min: f32,
    pub max: f32,
}

impl From<[Option<f32>; 2]> for HeightRange {
    fn from(v: [Option<f32>; 2]) -> Self {
        Self {
            min: v[0].unwrap_or(f32::NEG_INFINITY),
            max: v[1].unwrap_or(f32::INFINITY),
        }
    }
}

impl HeightRange {
    pub const ALL: HeightRange = HeightRange {
        min: f32::NEG_INFINITY,
        max: f32::INFINITY,
    };

    #[inline]
    pub fn contains(&self, h: f32) -> bool {
        h >= self.min && h <= self.max
    }
}

fn full_range() -> HeightRange {
    HeightRange::ALL
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RoadStyle {
    #[serde(default = "default_road_width")]
    pub width: f32,
    #[serde(default = "default_road_color")]
    pub color: String,
}
fn default_road_width() -> f32 {
    4.0
}
fn default_road_color() -> String {
    "#b8a88a".into()
}
impl Default for RoadStyle {
    fn default() -> Self {
        Self {
            width: default_road_width(),
            color: default_road_color(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct District {
    pub id: String,
    #[serde(default = "full_range", alias = "heightRange")]
    pub height_range: HeightRange,
    #[serde(default)]
    pub density: Density,
    #[serde(default, alias = "allowedTypes")]
    pub allowed_types: Vec<String>,
    #[serde(default)]
    pub road: RoadStyle,
}

impl District {
    fn fallback() -> Self {
        Self {
            id: FALLBACK_DISTRICT_ID.into(),
            height_range: HeightRange::ALL,
            density: Density::Medium,
            allowed_types: vec!["house".into()],
            road: RoadStyle::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DensitySpacing {
    #[serde(default = "d_high")]
    pub high: f32,
    #[serde(default = "d_medium")]
    pub medium: f32,
    #[serde(default = "d_low")]
    pub low: f32,
}
fn d_high() -> f32 {
    6.0
}
fn d_medium() -> f32 {
    10.0
}
fn d_low() -> f32 {
    16.0
}
impl Default for DensitySpacing {
    fn default() -> Self {
        Self {
            high: d_high(),
            medium: d_medium(),
            low: d_low(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ZoningDefaults {
    #[serde(default, alias = "densitySpacingMeters")]
    pub density_spacing_meters: DensitySpacing,
    #[serde(default = "d_slope", alias = "maxSlopeDeltaPerLot")]
    pub max_slope_delta_per_lot: f32,
    #[serde(default = "d_setback", alias = "roadSetbackMeters")]
    pub road_setback_meters: f32,
}
fn d_slope() -> f32 {
    1.2
}
fn d_setback() -> f32 {
    2.5
}
impl Default for ZoningDefaults {
    fn default() -> Self {
        Self {
            density_spacing_meters: DensitySpacing::default(),
            max_slope_delta_per_lot: d_slope(),
            road_setback_meters: d_setback(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
struct ZoningConfig {
    #[serde(default)]
    defaults: ZoningDefaults,
    #[serde(default, alias = "defaultDistrict")]
    default_district: Option<String>,
    #[serde(default)]
    districts: Vec<District>,
}

#[derive(Clone, Debug)]
pub struct DistrictRules {
    districts: Vec<District>,
    defaults: ZoningDefaults,
    default_district: District,
}

impl Default for DistrictRules {
    fn default() -> Self {
        Self::from_config(ZoningConfig::default())
    }
}

impl DistrictRules {
    fn from_config(cfg: ZoningConfig) -> Self {
        let default_district = cfg
            .default_district
            .as_deref()
            .and_then(|id| cfg.districts.iter().find(|d| d.id == id).cloned())
            .unwrap_or_else(|| {
                if let Some(id) = cfg.default_district.as_deref() {
                    log::warn!("default district {id:?} not in table; using built-in fallback");
                }
                District::fallback()
            });
        Self {
            districts: cfg.districts,
            defaults: cfg.defaults,
            default_district,
        }
    }

    pub fn new(districts: Vec<District>, defaults: ZoningDefaults, default_id: Option<&str>) -> Self {
        Self::from_config(ZoningConfig {
            defaults,
            default_district: default_id.map(str::to_string),
            districts,
        })
    }

    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: ZoningConfig = toml::from_str(s)?;
        Ok(Self::from_config(cfg))
    }

    pub fn from_json_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: ZoningConfig = serde_json::from_str(s)?;
        Ok(Self::from_config(cfg))
    }

    pub fn from_path(path: &Path) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&s)
        } else {
            Self::from_toml_str(&s)
        }
    }

    /// Never fails: a missing or malformed source yields the built-in single district.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::info!("no zoning table configured; using built-in default district");
            return Self::default();
        };
        match Self::from_path(path) {
            Ok(rules) => {
                log::info!(
                    "zoning loaded from {}: {} district(s)",
                    path.display(),
                    rules.districts.len()
                );
                rules
            }
            Err(e) => {
                log::warn!(
                    "zoning table {} unusable ({}); using built-in default district",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn districts(&self) -> &[District] {
        &self.districts
    }

    pub fn defaults(&self) -> &ZoningDefaults {
        &self.defaults
    }

    pub fn default_district(&self) -> &District {
        &self.default_district
    }

    pub fn get(&self, id: &str) -> Option<&District> {
        self.districts
            .iter()
            .find(|d| d.id == id)
            .or_else(|| (self.default_district.id == id).then_some(&self.default_district))
    }

    /// First district (table order) whose range contains `h`.
    pub fn resolve_height(&self, h: f32) -> &District {
        if !h.is_finite() {
            return &self.default_district;
        }
        self.districts
            .iter()
            .find(|d| d.height_range.contains(h))
            .unwrap_or(&self.default_district)
    }

    pub fn resolve_at<S>(&self, sampler: &S, x: f32, z: f32) -> &District
    where
        S: HeightSampler + ?Sized,
    {
        match sampler.sample(x, z) {
            Some(h) => self.resolve_height(h),
            None => &self.default_district,
        }
    }

    pub fn spacing_for(&self, density: Density) -> f32 {
        let s = &self.defaults.density_spacing_meters;
        match density {
            Density::High => s.high,
            Density::Medium => s.medium,
            Density::Low => s.low,
        }
    }

    pub fn spacing_for_label(&self, label: &str) -> f32 {
        self.spacing_for(Density::from_label(label).unwrap_or_default())
    }

    /// Largest spacing any density can require.
    pub fn max_spacing(&self) -> f32 {
        let s = &self.defaults.density_spacing_meters;
        s.high.max(s.medium).max(s.low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r##"
        default_district = "lowlands"

        [defaults]
        max_slope_delta_per_lot = 0.8
        [defaults.density_spacing_meters]
        high = 5.0

        [[districts]]
        id = "lowlands"
        height_range = [-inf, 2.0]
        density = "low"
        allowed_types = ["warehouse"]

        [[districts]]
        id = "town"
        height_range = [2.0, 30.0]
        density = "high"
        allowed_types = ["house", "workshop"]
        road = { width = 3.0, color = "#aa9977" }
    "##;

    #[test]
    fn toml_table_parses_with_partial_defaults() {
        let rules = DistrictRules::from_toml_str(TABLE).unwrap();
        assert_eq!(rules.districts().len(), 2);
        assert_eq!(rules.default_district().id, "lowlands");
        assert_eq!(rules.defaults().max_slope_delta_per_lot, 0.8);
        assert_eq!(rules.spacing_for(Density::High), 5.0);
        assert_eq!(rules.spacing_for(Density::Low), 16.0);
        assert_eq!(rules.get("town").unwrap().road.width, 3.0);
        assert_eq!(rules.resolve_height(-100.0).id, "lowlands");
        assert_eq!(rules.resolve_height(2.0).id, "lowlands");
        assert_eq!(rules.resolve_height(2.5).id, "town");
    }

    #[test]
    fn json_table_accepts_camel_case_and_null_bounds() {
        let json = r#"{
            "defaults": { "roadSetbackMeters": 4.0 },
            "districts": [
                { "id": "harbor", "heightRange": [null, 3.0], "density": "medium", "allowedTypes": ["shed"] },
                { "id": "peak", "heightRange": [3.0, null] }
            ]
        }"#;
        let rules = DistrictRules::from_json_str(json).unwrap();
        assert_eq!(rules.defaults().road_setback_meters, 4.0);
        assert_eq!(rules.resolve_height(-1e6).id, "harbor");
        assert_eq!(rules.resolve_height(1e6).id, "peak");
        assert_eq!(rules.get("harbor").unwrap().allowed_types, vec!["shed".to_string()]);
    }

    #[test]
    fn unknown_labels_map_to_medium_spacing() {
        let rules = DistrictRules::default();
        assert_eq!(rules.spacing_for_label("HIGH"), 6.0);
        assert_eq!(rules.spacing_for_label("sprawling"), 10.0);
    }

    #[test]
    fn non_finite_heights_resolve_to_default() {
        let rules = DistrictRules::from_toml_str(TABLE).unwrap();
        assert_eq!(rules.resolve_height(f32::NAN).id, "lowlands");
    }
}
