use std::path::Path;
use std::sync::OnceLock;

use polis::{WorldConfig, WorldGenerationContext, load_world_config_from_path};
use polis_collide::{NodeKind, RefreshOutcome, SceneNode, Transform};
use polis_geom::{MeshData, Ray, Vec3};
use polis_terrain::HeightSampler;
use proptest::prelude::*;

fn quick_config(seed: u64) -> WorldConfig {
    let mut cfg = WorldConfig {
        seed,
        ..WorldConfig::default()
    };
    cfg.terrain.segments = 96;
    cfg.layout.target_count = 30;
    for layer in &mut cfg.vegetation.layers {
        layer.target_count = layer.target_count.min(250);
    }
    cfg
}

fn down(x: f32, z: f32) -> Ray {
    Ray::new(Vec3::new(x, 200.0, z), Vec3::new(0.0, -1.0, 0.0))
}

#[test]
fn same_seed_same_world() {
    let a = WorldGenerationContext::generate(quick_config(21)).unwrap();
    let b = WorldGenerationContext::generate(quick_config(21)).unwrap();
    assert_eq!(a.lots.items, b.lots.items);
    assert_eq!(a.vegetation.len(), b.vegetation.len());
    for (la, lb) in a.vegetation.iter().zip(&b.vegetation) {
        assert_eq!(la.instances, lb.instances);
    }
    assert_eq!(a.summary(), b.summary());
}

#[test]
fn shipped_config_loads_and_resolves_its_district_table() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/world.toml");
    let cfg = load_world_config_from_path(&path).unwrap();
    let districts = cfg.districts_path.clone().unwrap();
    assert!(districts.exists(), "{}", districts.display());
    assert_eq!(cfg.vegetation.layers.len(), 2);
    assert_eq!(cfg.layout.non_collidable_types, vec!["stall".to_string()]);
}

#[test]
fn terrain_is_solid_and_water_is_not() {
    let world = WorldGenerationContext::generate(quick_config(5)).unwrap();
    let field = world.height_sampler();
    // A point well inland, away from the road and the city.
    let (x, z) = (-220.0, -220.0);
    let h = field.sample(x, z).unwrap();
    let hit = world.collider.raycast(&down(x, z), 400.0).unwrap();
    assert_eq!(hit.node, world.handles.terrain);
    assert!((hit.point.y - h).abs() < 3.0, "{} vs {h}", hit.point.y);

    let water = world.scene.get(world.handles.water).unwrap();
    assert!(!water.collidable);
    assert!(!world.collider.contains_node(world.handles.water));
    assert!(!world.collider.contains_node(world.handles.vegetation));
    assert!(world.collider.contains_node(world.handles.terrain));
    assert!(world.collider.contains_node(world.handles.road));
}

#[test]
fn buildings_follow_their_collidable_flag() {
    let mut cfg = quick_config(8);
    cfg.layout.non_collidable_types = vec!["house".into()];
    let world = WorldGenerationContext::generate(cfg).unwrap();
    let city = world.scene.get(world.handles.buildings).unwrap();
    assert_eq!(city.children.len(), world.lots.achieved());
    for (node, lot) in city.children.iter().zip(&world.lots.items) {
        assert_eq!(node.collidable, lot.collidable);
        assert_eq!(world.collider.contains_node(node.id()), lot.collidable);
    }
}

#[test]
fn lots_and_plants_stay_on_land() {
    let world = WorldGenerationContext::generate(quick_config(13)).unwrap();
    let sea = world.field().sea_level();
    for lot in &world.lots.items {
        assert!(lot.position.y > sea, "{lot:?}");
    }
    for layer in &world.vegetation {
        for plant in &layer.instances {
            assert!(plant.position.y > sea, "{plant:?}");
        }
    }
}

#[test]
fn raised_sea_level_reaches_every_placement_stage() {
    let mut cfg = quick_config(13);
    cfg.terrain.sea_level = 8.0;
    let world = WorldGenerationContext::generate(cfg).unwrap();
    let sea = world.field().sea_level();
    assert_eq!(sea, 8.0);
    assert!(world.lots.achieved() > 0);
    let margin = world.config.layout.sea_epsilon;
    for lot in &world.lots.items {
        assert!(lot.position.y - world.config.layout.surface_offset >= sea + margin - 1e-4, "{lot:?}");
    }
    for layer in &world.vegetation {
        for plant in &layer.instances {
            assert!(plant.position.y > sea, "{plant:?}");
        }
    }
}

#[test]
fn added_prop_becomes_solid_after_refresh() {
    let mut world = WorldGenerationContext::generate(quick_config(3)).unwrap();
    let (x, z) = (-200.0, 200.0);
    let ground = world.field().sample(x, z).unwrap();
    let top = ground + 20.0;
    let id = world.add_static_node(
        SceneNode::new("column", NodeKind::Prop)
            .with_mesh(MeshData::cuboid(Vec3::new(1.0, 10.0, 1.0)))
            .with_transform(Transform::from_translation(Vec3::new(x, ground + 10.0, z))),
    );
    let before = world.collider.raycast(&down(x + 0.3, z + 0.2), 400.0).unwrap();
    assert_ne!(before.node, id);

    assert_eq!(world.refresh_collider(), RefreshOutcome::Appended(1));
    let after = world.collider.raycast(&down(x + 0.3, z + 0.2), 400.0).unwrap();
    assert_eq!(after.node, id);
    assert!((after.point.y - top).abs() < 1e-3);
    assert_eq!(world.refresh_collider(), RefreshOutcome::Unchanged);
}

#[test]
fn sampler_outlives_the_context() {
    let sampler = {
        let world = WorldGenerationContext::generate(quick_config(2)).unwrap();
        world.height_sampler()
    };
    let handle = std::thread::spawn(move || sampler.sample(0.0, 0.0));
    assert!(handle.join().unwrap().is_some());
}

fn shared_world() -> &'static WorldGenerationContext {
    static WORLD: OnceLock<WorldGenerationContext> = OnceLock::new();
    WORLD.get_or_init(|| WorldGenerationContext::generate(quick_config(77)).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_column_of_the_domain_has_ground(x in -290.0f32..290.0, z in -290.0f32..290.0) {
        let world = shared_world();
        let h = world.field().sample(x, z).unwrap();
        let hit = world.collider.raycast(&down(x, z), 400.0);
        prop_assert!(hit.is_some());
        prop_assert!(hit.unwrap().point.y > h - 3.0);
    }

    #[test]
    fn capsule_high_above_the_ground_is_clear(x in -290.0f32..290.0, z in -290.0f32..290.0) {
        let world = shared_world();
        let h = world.field().sample(x, z).unwrap();
        let capsule = polis_geom::Capsule::new(Vec3::new(x, h + 40.0, z), Vec3::new(x, h + 41.0, z), 0.4);
        // Well above every roof and the terrain.
        prop_assert!(world.collider.capsule_push_out(&capsule).is_none());
    }
}
