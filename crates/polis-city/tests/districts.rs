use std::io::Write;

use polis_city::{Density, DistrictRules};
use polis_terrain::HeightField;

const CORE_AND_HILLS: &str = r#"{
    "districts": [
        { "id": "core", "heightRange": [-5, 5], "density": "high", "allowedTypes": ["house"] },
        { "id": "hills", "heightRange": [5, 1000], "density": "low", "allowedTypes": ["temple"] }
    ]
}"#;

fn at_height(h: f32) -> impl Fn(f32, f32) -> Option<f32> {
    move |_, _| Some(h)
}

#[test]
fn resolves_core_hills_and_default() {
    let rules = DistrictRules::from_json_str(CORE_AND_HILLS).unwrap();
    assert_eq!(rules.resolve_at(&at_height(3.0), 10.0, 10.0).id, "core");
    assert_eq!(rules.resolve_at(&at_height(40.0), 10.0, 10.0).id, "hills");
    assert_eq!(rules.resolve_at(&at_height(-50.0), 10.0, 10.0).id, "default");
}

#[test]
fn configured_default_district_is_used_when_nothing_matches() {
    let rules = DistrictRules::from_toml_str(
        r#"
        default_district = "fields"

        [[districts]]
        id = "core"
        height_range = [-5.0, 5.0]

        [[districts]]
        id = "fields"
        height_range = [100.0, 200.0]
        density = "low"
        "#,
    )
    .unwrap();
    let got = rules.resolve_at(&at_height(-50.0), 0.0, 0.0);
    assert_eq!(got.id, "fields");
    assert_eq!(got.density, Density::Low);
}

#[test]
fn outside_the_terrain_resolves_to_default() {
    let rules = DistrictRules::from_json_str(CORE_AND_HILLS).unwrap();
    let field = HeightField::from_fn(20.0, 10, |_, _| 3.0);
    assert_eq!(rules.resolve_at(&field, 0.0, 0.0).id, "core");
    assert_eq!(rules.resolve_at(&field, 500.0, 0.0).id, "default");
}

#[test]
fn load_picks_format_by_extension_and_falls_back() {
    let dir = std::env::temp_dir().join(format!("polis-districts-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let json_path = dir.join("zoning.json");
    std::fs::File::create(&json_path)
        .unwrap()
        .write_all(CORE_AND_HILLS.as_bytes())
        .unwrap();
    let rules = DistrictRules::load(Some(&json_path));
    assert_eq!(rules.districts().len(), 2);
    assert_eq!(rules.spacing_for(Density::High), 6.0);

    let broken = dir.join("broken.toml");
    std::fs::write(&broken, "districts = 12").unwrap();
    let fallback = DistrictRules::load(Some(&broken));
    assert!(fallback.districts().is_empty());
    assert_eq!(fallback.resolve_height(3.0).id, "default");

    let missing = DistrictRules::load(Some(&dir.join("nope.toml")));
    assert_eq!(missing.default_district().allowed_types, vec!["house".to_string()]);
    assert!(DistrictRules::load(None).districts().is_empty());

    std::fs::remove_dir_all(&dir).ok();
}
