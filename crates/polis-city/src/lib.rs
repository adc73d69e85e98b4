//! Zoning, building lots and vegetation for the generated city.
#![forbid(unsafe_code)]

pub mod districts;
pub mod layout;
pub mod placement;
pub mod rng;
pub mod vegetation;
pub mod zones;

pub use districts::{Density, District, DistrictRules, HeightRange, RoadStyle, ZoningDefaults};
pub use layout::{CityLayout, CityLot, Facing, LayoutConfig};
pub use placement::{Placement, Reject, RejectionStats};
pub use vegetation::{
    InstanceBuffers, LayerConfig, VegetationConfig, VegetationInstance, VegetationLayer,
    VegetationScatter, WindParams,
};
pub use zones::{Bounds2, ExclusionZone, ZoneKind, ZoneShape};
