use polis_geom::Vec3;
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct RoadConfig {
    #[serde(default = "default_points")]
    pub points: Vec<RoadPointDef>,
    /// Ribbon width at the start of the road.
    #[serde(default = "default_width")]
    pub width: f32,
    /// Ribbon width at the end; defaults to `width`.
    #[serde(default)]
    pub end_width: Option<f32>,
    #[serde(default = "default_ribbon_segments")]
    pub ribbon_segments: u32,
    /// Height above the terrain the ribbon floats at to avoid z-fighting.
    #[serde(default = "default_lift")]
    pub lift: f32,
}

fn default_width() -> f32 {
    5.0
}
fn default_ribbon_segments() -> u32 {
    200
}
fn default_lift() -> f32 {
    0.05
}
fn default_points() -> Vec<RoadPointDef> {
    vec![
        RoadPointDef::at("harbor", [20.0, 0.0, -10.0]),
        RoadPointDef::at("agora", [-15.0, 0.0, 10.0]),
        RoadPointDef::at("agora", [10.0, 0.0, -20.0]),
        RoadPointDef::at("acropolis", [0.0, 0.0, 30.0]),
    ]
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self {
            points: default_points(),
            width: default_width(),
            end_width: None,
            ribbon_segments: default_ribbon_segments(),
            lift: default_lift(),
        }
    }
}

/// A control point given as an offset from a named anchor (or absolute without one).
#[derive(Clone, Debug, Deserialize)]
pub struct RoadPointDef {
    #[serde(default)]
    pub anchor: Option<String>,
    #[serde(default)]
    pub offset: [f32; 3],
}

impl RoadPointDef {
    pub fn at(anchor: &str, offset: [f32; 3]) -> Self {
        Self {
            anchor: Some(anchor.to_string()),
            offset,
        }
    }
}

impl RoadConfig {
    /// Linear taper from `width` to `end_width` over the arc parameter.
    pub fn width_at(&self, u: f32) -> f32 {
        let end = self.end_width.unwrap_or(self.width);
        self.width + (end - self.width) * u.clamp(0.0, 1.0)
    }

    /// Widest point of the ribbon.
    pub fn max_width(&self) -> f32 {
        self.width.max(self.end_width.unwrap_or(self.width))
    }

    /// Resolves anchor-relative control points. Unknown anchors are logged and the
    /// offset is used as an absolute position.
    pub fn resolve_points(&self, anchor: impl Fn(&str) -> Option<Vec3>) -> Vec<Vec3> {
        self.points
            .iter()
            .map(|def| {
                let offset = Vec3::new(def.offset[0], def.offset[1], def.offset[2]);
                match def.anchor.as_deref() {
                    None => offset,
                    Some(name) => match anchor(name) {
                        Some(base) => base + offset,
                        None => {
                            log::warn!("road point references unknown anchor {name:?}");
                            offset
                        }
                    },
                }
            })
            .collect()
    }
}
