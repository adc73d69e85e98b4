use polis_city::{CityLot, VegetationLayer};
use polis_collide::{NodeId, NodeKind, Scene, SceneNode, Transform};
use polis_geom::{Aabb, MeshData, Vec3, yaw_toward};
use polis_road::RibbonMesh;
use polis_terrain::HeightField;

use super::{CityAnchors, pier_direction};
use crate::config::WorldConfig;

const PLAZA_SEGMENTS: u32 = 32;
/// Plazas float slightly above the ground like the road ribbon.
const PLAZA_LIFT: f32 = 0.06;

/// Root node ids of the generated scene.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SceneHandles {
    pub terrain: NodeId,
    pub road: NodeId,
    pub plazas: NodeId,
    pub pier: NodeId,
    pub buildings: NodeId,
    pub water: NodeId,
    pub vegetation: NodeId,
}

pub(super) fn assemble(
    config: &WorldConfig,
    field: &HeightField,
    ribbon: &RibbonMesh,
    anchors: &CityAnchors,
    lots: &[CityLot],
    vegetation: &[VegetationLayer],
) -> (Scene, SceneHandles) {
    let mut scene = Scene::new();
    let mut handles = SceneHandles::default();
    let a = &config.anchors;

    handles.terrain = scene.add(SceneNode::new("terrain", NodeKind::Terrain).with_mesh(field.to_mesh()));
    handles.road = scene.add(SceneNode::new("road", NodeKind::Road).with_mesh(ribbon.mesh.clone()));

    let plaza = |name: &str, at: Vec3, radius: f32| {
        SceneNode::new(name, NodeKind::Plaza)
            .with_mesh(MeshData::disc(radius, PLAZA_SEGMENTS))
            .with_transform(Transform::from_translation(at + Vec3::new(0.0, PLAZA_LIFT, 0.0)))
    };
    handles.plazas = scene.add(
        SceneNode::new("plazas", NodeKind::Group)
            .with_child(plaza("agora", anchors.agora, a.agora_plaza_radius))
            .with_child(plaza("acropolis", anchors.acropolis, a.acropolis_plaza_radius)),
    );

    let dir = pier_direction(anchors);
    let sea = field.sea_level();
    let deck = Vec3::new(a.pier.width * 0.5, a.pier.deck * 0.5, a.pier.length * 0.5);
    let pier_center = anchors.harbor.xz() + dir * (a.pier.length * 0.5);
    handles.pier = scene.add(
        SceneNode::new("pier", NodeKind::Prop)
            .with_mesh(MeshData::cuboid(deck))
            .with_transform(
                Transform::from_translation(Vec3::new(pier_center.x, sea + deck.y, pier_center.y))
                    .with_yaw(yaw_toward(dir)),
            ),
    );

    let mut city = SceneNode::new("buildings", NodeKind::Group);
    for lot in lots {
        city = city.with_child(building(config, lot));
    }
    handles.buildings = scene.add(city);

    let half = field.half_extent();
    let origin = config.terrain.transform.origin;
    handles.water = scene.add(
        SceneNode::new("water", NodeKind::Water)
            .with_mesh(MeshData::quad(half, half))
            .with_transform(Transform::from_translation(Vec3::new(origin[0], sea, origin[1])))
            .non_collidable(),
    );

    let mut plants = SceneNode::new("vegetation", NodeKind::Vegetation).non_collidable();
    for layer in vegetation {
        let mut node = SceneNode::new(layer.name.clone(), NodeKind::Vegetation);
        if let Some(bounds) = layer_bounds(layer) {
            node = node.with_mesh(bounds);
        }
        plants = plants.with_child(node);
    }
    handles.vegetation = scene.add(plants);

    log::debug!("scene assembled: {} nodes", scene.node_count());
    (scene, handles)
}

fn building(config: &WorldConfig, lot: &CityLot) -> SceneNode {
    let height = config.buildings.height_for(&lot.kind);
    let half = Vec3::new(lot.half_extents.x, height * 0.5, lot.half_extents.y);
    SceneNode::new(format!("lot-{}-{}", lot.id, lot.kind), NodeKind::Building)
        .with_mesh(MeshData::cuboid(half))
        .with_transform(
            Transform::from_translation(lot.position + Vec3::new(0.0, half.y, 0.0)).with_yaw(lot.yaw),
        )
        .with_collidable(lot.collidable)
}

/// Box around a layer's instances, used as a culling proxy.
fn layer_bounds(layer: &VegetationLayer) -> Option<MeshData> {
    let bounds = Aabb::from_points(layer.instances.iter().map(|i| i.position));
    if bounds.is_empty() {
        return None;
    }
    let extents = bounds.extents() * 0.5;
    let half = Vec3::new(extents.x.max(0.5), extents.y.max(0.5), extents.z.max(0.5));
    let center = bounds.center();
    Some(MeshData::cuboid(half).map_positions(|p| p + center))
}
