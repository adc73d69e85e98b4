//! Procedural height field: fBm terrain with ordered local modifiers.
#![forbid(unsafe_code)]

pub mod config;
mod field;
mod mesh;
pub mod modifier;
mod noise;
mod sampler;

pub use config::{Fractal, ModifierDef, Surface, TerrainConfig, load_config_from_path};
pub use field::{FieldTransform, HeightField, SurfaceWeights};
pub use modifier::{BlendMode, Modifier, ModifierStack};
pub use noise::FractalNoise;
pub use sampler::HeightSampler;
