//! Road spline through the city anchors and its terrain-draped ribbon.
#![forbid(unsafe_code)]

pub mod config;
mod curve;
mod ribbon;

pub use config::{RoadConfig, RoadPointDef};
pub use curve::{DISTANCE_SEGMENTS, RoadCurve, RoadError, RoadProjection};
pub use ribbon::RibbonMesh;
