//! Static scene graph and the merged collision mesh built from it.
#![forbid(unsafe_code)]

mod bvh;
mod collider;
pub mod scene;

pub use bvh::Bvh;
pub use collider::{
    ColliderConfig, Contact, EnvironmentCollider, RayHit, RefreshOutcome, SurfacePoint,
};
pub use scene::{CollidableMesh, NodeId, NodeKind, Scene, SceneNode, Transform};
