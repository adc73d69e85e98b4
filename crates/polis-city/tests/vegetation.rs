use polis_city::{
    Bounds2, CityLayout, DistrictRules, ExclusionZone, LayerConfig, LayoutConfig, Reject,
    VegetationConfig, VegetationScatter, ZoneKind,
};
use polis_geom::{Vec2, Vec3};
use polis_road::RoadCurve;
use polis_terrain::{HeightField, HeightSampler};

fn layer(target: usize) -> LayerConfig {
    LayerConfig {
        target_count: target,
        ring_outer: 1_000.0,
        ..LayerConfig::default()
    }
}

#[test]
fn step_edge_is_bare_and_plateaus_are_covered() {
    let field = HeightField::from_fn(200.0, 200, |x, _| if x < 0.0 { 5.0 } else { 15.0 });
    let cfg = LayerConfig {
        max_slope: 1.0,
        slope_offset: 2.0,
        ..layer(800)
    };
    let placed = VegetationScatter::new(&field, Bounds2::centered(Vec2::ZERO, 90.0), 0.0)
        .scatter_layer(3, 0, &cfg);
    assert!(placed.rejections.get(Reject::Slope) > 0);
    for inst in &placed.items {
        assert!(inst.position.x.abs() >= cfg.slope_offset - 1.0, "{:?}", inst.position);
        assert!(field.slope(inst.position.x, inst.position.z, cfg.slope_offset) <= cfg.max_slope);
    }
    assert!(placed.items.iter().any(|i| i.position.x < -10.0));
    assert!(placed.items.iter().any(|i| i.position.x > 10.0));
}

#[test]
fn tiny_domain_returns_partial_layer_in_bounded_attempts() {
    let field = HeightField::from_fn(4.0, 4, |_, _| 5.0);
    let cfg = LayerConfig {
        max_attempt_multiplier: 2,
        slope_offset: 0.1,
        ..layer(10_000)
    };
    // Half of the domain hangs off the terrain's +x edge.
    let domain = Bounds2::centered(Vec2::new(2.0, 0.0), 0.5);
    let placed = VegetationScatter::new(&field, domain, 0.0).scatter_layer(1, 0, &cfg);
    assert_eq!(placed.attempts, 20_000);
    assert!(placed.is_partial());
    assert!(placed.achieved() > 0 && placed.achieved() < 10_000);
    assert!(placed.rejections.get(Reject::Slope) > 0);
    let layer = placed.into_layer("grass").unwrap();
    assert_eq!(layer.buffers.len(), layer.instances.len());
    assert_eq!(layer.buffers.offsets.len(), layer.instances.len() * 3);
    assert_eq!(layer.requested, 10_000);
}

#[test]
fn zero_target_layer_is_dropped() {
    let field = HeightField::from_fn(50.0, 10, |_, _| 5.0);
    let config = VegetationConfig {
        layers: vec![
            LayerConfig {
                name: "empty".into(),
                ..layer(0)
            },
            LayerConfig {
                name: "grass".into(),
                ..layer(20)
            },
        ],
    };
    let layers = VegetationScatter::new(&field, Bounds2::centered(Vec2::ZERO, 20.0), 0.0)
        .scatter_all(9, &config);
    assert_eq!(layers.len(), 1);
    assert_eq!(layers[0].name, "grass");
}

#[test]
fn instances_avoid_roads_lots_zones_and_water() {
    let field = HeightField::from_fn(300.0, 150, |x, _| if x > 100.0 { -2.0 } else { 6.0 });
    let road = RoadCurve::build(&[Vec3::new(-120.0, 6.0, 0.0), Vec3::new(0.0, 6.0, 0.0), Vec3::new(80.0, 6.0, 0.0)])
        .unwrap();
    let rules = DistrictRules::default();
    let lay_cfg = LayoutConfig {
        target_count: 30,
        ..LayoutConfig::default()
    };
    let lots = CityLayout::new(&field, &road, &rules, &lay_cfg, 0.0).generate(4).items;
    assert!(!lots.is_empty());
    let zones = vec![
        ExclusionZone::disc("core", ZoneKind::Core, Vec2::new(-50.0, 50.0), 20.0),
        ExclusionZone::disc("harbor", ZoneKind::Harbor, Vec2::new(110.0, 0.0), 15.0),
        ExclusionZone::rect("pier", ZoneKind::Pier, Vec2::new(100.0, -40.0), Vec2::new(2.0, 10.0), 0.0),
        ExclusionZone::disc("agora", ZoneKind::Plaza, Vec2::new(30.0, -60.0), 12.0),
    ];
    let cfg = LayerConfig {
        ring_inner: 10.0,
        ring_outer: 140.0,
        core_buffer: 1.0,
        ..layer(3_000)
    };
    let placed = VegetationScatter::new(&field, Bounds2::centered(Vec2::ZERO, 150.0), 0.0)
        .with_road(&road)
        .with_zones(&zones)
        .with_lots(&lots)
        .scatter_layer(12, 0, &cfg);
    assert!(placed.achieved() > 100);
    for inst in &placed.items {
        let p = inst.position.xz();
        let r = p.length();
        assert!((cfg.ring_inner..=cfg.ring_outer).contains(&r));
        assert!(road.distance_to_point(p.x, p.y) >= cfg.road_buffer);
        assert!(lots.iter().all(|lot| !lot.covers(p, cfg.lot_buffer)));
        assert!(zones.iter().all(|z| !z.contains(p, 0.0)));
        assert!(inst.position.y >= cfg.sea_epsilon);
        assert!((cfg.min_scale..=cfg.max_scale).contains(&inst.scale));
        assert!(inst.lean.abs() <= cfg.max_lean);
        assert!(inst.color.iter().all(|c| (0.0..=1.0).contains(c)));
    }
    for reason in [Reject::OutsideRing, Reject::Road, Reject::Lot, Reject::Core, Reject::SeaLevel] {
        assert!(placed.rejections.get(reason) > 0, "no {reason:?} rejections");
    }
}

#[test]
fn scatter_is_seed_deterministic_and_layers_use_separate_streams() {
    let field = HeightField::from_fn(100.0, 50, |x, z| 4.0 + 0.01 * (x + z));
    let scatter = VegetationScatter::new(&field, Bounds2::centered(Vec2::ZERO, 45.0), 0.0);
    let cfg = layer(50);
    let a = scatter.scatter_layer(77, 0, &cfg);
    let b = scatter.scatter_layer(77, 0, &cfg);
    let other_index = scatter.scatter_layer(77, 1, &cfg);
    assert_eq!(a.items, b.items);
    assert_ne!(a.items, other_index.items);
}
