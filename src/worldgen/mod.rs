//! End-to-end generation: terrain, zoning, road, lots, vegetation and the
//! static scene with its collider.

mod scene;

use std::sync::Arc;

use polis_city::{
    Bounds2, CityLayout, CityLot, District, DistrictRules, ExclusionZone, Placement, VegetationLayer,
    VegetationScatter, ZoneKind,
};
use polis_collide::{EnvironmentCollider, NodeId, RefreshOutcome, Scene, SceneNode};
use polis_geom::{Vec2, Vec3, yaw_toward};
use polis_road::{RibbonMesh, RoadCurve, RoadError};
use polis_terrain::{HeightField, HeightSampler};
use thiserror::Error;

use crate::config::WorldConfig;

pub use scene::SceneHandles;

#[derive(Debug, Error)]
pub enum WorldGenError {
    #[error("road: {0}")]
    Road(#[from] RoadError),
    #[error("anchor {name:?} is not a finite position: {value:?}")]
    InvalidAnchor { name: &'static str, value: [f32; 2] },
}

/// Anchor positions lifted onto the generated terrain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CityAnchors {
    pub harbor: Vec3,
    pub agora: Vec3,
    pub acropolis: Vec3,
}

impl CityAnchors {
    pub fn get(&self, name: &str) -> Option<Vec3> {
        match name {
            "harbor" => Some(self.harbor),
            "agora" => Some(self.agora),
            "acropolis" => Some(self.acropolis),
            _ => None,
        }
    }
}

/// Everything one seed produces. The height field is shared read-only with
/// whoever needs ground queries after generation.
pub struct WorldGenerationContext {
    pub config: WorldConfig,
    field: Arc<HeightField>,
    pub districts: DistrictRules,
    pub anchors: CityAnchors,
    pub road: RoadCurve,
    pub ribbon: RibbonMesh,
    pub zones: Vec<ExclusionZone>,
    pub lots: Placement<CityLot>,
    pub vegetation: Vec<VegetationLayer>,
    pub scene: Scene,
    pub handles: SceneHandles,
    pub collider: EnvironmentCollider,
}

impl WorldGenerationContext {
    pub fn generate(config: WorldConfig) -> Result<Self, WorldGenError> {
        let seed = config.seed;
        log::info!("generating world (seed {seed})");

        let terrain = config.shaped_terrain();
        let field = Arc::new(HeightField::build(seed, &terrain));
        let districts = DistrictRules::load(config.districts_path.as_deref());
        let anchors = lift_anchors(&config, &field)?;

        let points = config.road.resolve_points(|name| anchors.get(name));
        let road = RoadCurve::build(&points)?;
        let ribbon = road.to_ribbon_mesh(
            |u| config.road.width_at(u),
            field.as_ref(),
            config.road.ribbon_segments,
            config.road.lift,
        );
        log::info!("road: {:.1} m through {} control points", road.length(), points.len());

        let zones = city_zones(&config, &anchors);

        let agora = anchors.agora.xz();
        let sea_level = field.sea_level();
        let lots = CityLayout::new(field.as_ref(), &road, &districts, &config.layout, sea_level)
            .with_zones(&zones)
            .with_center(agora)
            .with_landmark(anchors.harbor.xz())
            .generate(seed);

        let origin = terrain.transform.origin;
        let domain = Bounds2::centered(Vec2::new(origin[0], origin[1]), field.half_extent());
        let vegetation = VegetationScatter::new(field.as_ref(), domain, sea_level)
            .with_center(agora)
            .with_road(&road)
            .with_zones(&zones)
            .with_lots(&lots.items)
            .scatter_all(seed, &config.vegetation);

        let (scene, handles) = scene::assemble(&config, &field, &ribbon, &anchors, &lots.items, &vegetation);
        let mut collider = EnvironmentCollider::new(config.collider.clone());
        collider.rebuild_from_static_scene(&scene);

        Ok(Self {
            config,
            field,
            districts,
            anchors,
            road,
            ribbon,
            zones,
            lots,
            vegetation,
            scene,
            handles,
            collider,
        })
    }

    pub fn height_sampler(&self) -> Arc<HeightField> {
        Arc::clone(&self.field)
    }

    pub fn field(&self) -> &HeightField {
        &self.field
    }

    pub fn district_at(&self, x: f32, z: f32) -> &District {
        self.districts.resolve_at(self.field.as_ref(), x, z)
    }

    /// Adds a static node after generation. It only becomes solid once
    /// [`refresh_collider`](Self::refresh_collider) runs.
    pub fn add_static_node(&mut self, node: SceneNode) -> NodeId {
        self.scene.add(node)
    }

    pub fn refresh_collider(&mut self) -> RefreshOutcome {
        self.collider.refresh(&self.scene)
    }

    pub fn summary(&self) -> WorldSummary {
        WorldSummary {
            seed: self.config.seed,
            road_length: self.road.length(),
            lots_placed: self.lots.achieved(),
            lots_requested: self.lots.requested,
            vegetation: self
                .vegetation
                .iter()
                .map(|l| (l.name.clone(), l.instances.len(), l.requested))
                .collect(),
            scene_nodes: self.scene.node_count(),
            collider_triangles: self.collider.triangle_count(),
        }
    }
}

fn lift_anchors(config: &WorldConfig, field: &HeightField) -> Result<CityAnchors, WorldGenError> {
    let a = &config.anchors;
    let lift = |name: &'static str, xz: [f32; 2]| {
        if !(xz[0].is_finite() && xz[1].is_finite()) {
            return Err(WorldGenError::InvalidAnchor { name, value: xz });
        }
        let y = field.sample(xz[0], xz[1]).unwrap_or_else(|| {
            log::warn!("anchor {name} at {xz:?} lies outside the terrain");
            field.sea_level()
        });
        Ok(Vec3::new(xz[0], y, xz[1]))
    };
    Ok(CityAnchors {
        harbor: lift("harbor", a.harbor)?,
        agora: lift("agora", a.agora)?,
        acropolis: lift("acropolis", a.acropolis)?,
    })
}

/// Pier direction: from the agora out through the harbor toward open water.
pub(crate) fn pier_direction(anchors: &CityAnchors) -> Vec2 {
    let dir = (anchors.harbor.xz() - anchors.agora.xz()).normalized();
    if dir.length() < 1e-6 { Vec2::new(1.0, 0.0) } else { dir }
}

fn city_zones(config: &WorldConfig, anchors: &CityAnchors) -> Vec<ExclusionZone> {
    let a = &config.anchors;
    let dir = pier_direction(anchors);
    let pier_center = anchors.harbor.xz() + dir * (a.pier.length * 0.5);
    let mut zones = vec![
        ExclusionZone::disc("core", ZoneKind::Core, anchors.agora.xz(), a.core_radius),
        ExclusionZone::disc("harbor", ZoneKind::Harbor, anchors.harbor.xz(), a.harbor_radius),
        ExclusionZone::rect(
            "pier",
            ZoneKind::Pier,
            pier_center,
            Vec2::new(a.pier.width * 0.5, a.pier.length * 0.5),
            yaw_toward(dir),
        ),
        ExclusionZone::disc("agora", ZoneKind::Plaza, anchors.agora.xz(), a.agora_plaza_radius),
        ExclusionZone::disc(
            "acropolis",
            ZoneKind::Plaza,
            anchors.acropolis.xz(),
            a.acropolis_plaza_radius,
        ),
    ];
    zones.extend(config.zones.iter().map(|z| z.to_zone()));
    zones
}

#[derive(Clone, Debug, PartialEq)]
pub struct WorldSummary {
    pub seed: u64,
    pub road_length: f32,
    pub lots_placed: usize,
    pub lots_requested: usize,
    /// `(layer, placed, requested)`
    pub vegetation: Vec<(String, usize, usize)>,
    pub scene_nodes: usize,
    pub collider_triangles: usize,
}

impl std::fmt::Display for WorldSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "seed:      {}", self.seed)?;
        writeln!(f, "road:      {:.1} m", self.road_length)?;
        writeln!(f, "lots:      {}/{}", self.lots_placed, self.lots_requested)?;
        for (name, placed, requested) in &self.vegetation {
            writeln!(f, "{:<10} {placed}/{requested}", format!("{name}:"))?;
        }
        writeln!(f, "nodes:     {}", self.scene_nodes)?;
        write!(f, "collider:  {} triangles", self.collider_triangles)
    }
}
