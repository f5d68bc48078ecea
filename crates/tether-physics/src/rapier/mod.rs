//! Raw `rapier3d` chain host.
//!
//! [`RapierContext`] implements [`ChainHost`](crate::host::ChainHost) using
//! the `rapier3d` crate directly (not `bevy_rapier3d`). We own the
//! [`PhysicsPipeline`](rapier3d::pipeline::PhysicsPipeline), call `step()`
//! ourselves, and break joints from the spring load estimate after each
//! frame.

pub mod backend;
pub mod context;
pub mod host;
pub mod systems;

pub use backend::{RapierBackend, RapierBackendFixed};
pub use context::RapierContext;
