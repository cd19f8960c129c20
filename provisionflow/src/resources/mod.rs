//! Concrete outpost resource families built on the engine.
//!
//! Each family supplies a model, its remote stages, and one pipeline per
//! operation; `handlers` wires them into an [`Orchestrator`](crate::orchestrator::Orchestrator).

pub mod access_point;
pub mod access_point_policy;
pub mod api;
pub mod identity;
pub mod policy_document;

pub use access_point::AccessPoint;
pub use access_point_policy::AccessPointPolicy;
pub use api::OutpostsApi;
pub use identity::{ArnKind, ResourceArn};
