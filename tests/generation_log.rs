use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};
use polis::{WorldConfig, WorldGenerationContext};

struct Capture(Mutex<Vec<String>>);

impl Log for Capture {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.0.lock().unwrap().push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture(Mutex::new(Vec::new()));

#[test]
fn each_placement_stage_reports_once() {
    log::set_logger(&CAPTURE).unwrap();
    log::set_max_level(LevelFilter::Info);

    let mut cfg = WorldConfig {
        seed: 9,
        ..WorldConfig::default()
    };
    cfg.terrain.segments = 64;
    cfg.layout.target_count = 10;
    for layer in &mut cfg.vegetation.layers {
        layer.target_count = layer.target_count.min(50);
    }
    let layers: Vec<String> = cfg.vegetation.layers.iter().map(|l| l.name.clone()).collect();
    WorldGenerationContext::generate(cfg).unwrap();

    let lines = CAPTURE.0.lock().unwrap();
    let reports: Vec<&String> = lines.iter().filter(|l| l.contains(": placed")).collect();
    let lot_reports = reports.iter().filter(|l| l.starts_with("city")).count();
    assert_eq!(lot_reports, 1, "{lines:#?}");
    for name in &layers {
        let tag = format!("vegetation layer {name:?}:");
        let count = reports.iter().filter(|l| l.starts_with(&tag)).count();
        assert_eq!(count, 1, "{name}: {lines:#?}");
    }
}
