//! Seeded Greek harbor-city generator: terrain, zoning, road, lots and
//! vegetation assembled into a static scene with a merged collider.
#![forbid(unsafe_code)]

pub mod config;
pub mod worldgen;

pub use config::{WorldConfig, load_world_config_from_path};
pub use worldgen::{CityAnchors, SceneHandles, WorldGenError, WorldGenerationContext, WorldSummary};
