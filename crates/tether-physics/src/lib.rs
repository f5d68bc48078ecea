// tether-physics: Chain construction, anchoring and lifecycle over a physics host.
//
// The chain core talks to its host only through the `ChainHost` trait.
// `MemoryHost` keeps records without simulating; `rapier::RapierContext`
// simulates with rapier3d. The plugin delegates host setup to a backend.

pub mod backend;
pub mod binder;
pub mod builder;
pub mod components;
pub mod host;
pub mod instance;
pub mod memory;
pub mod plugin;
pub mod rapier;
pub mod systems;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        backend::{MemoryBackend, PhysicsBackend},
        binder::{bind_anchors, layout_rest_pose},
        builder::{BuiltChain, ChainBuilder, build_chain},
        components::{Chain, ChainViewer},
        host::{AttachRule, AxisLimit, ChainHost, JointParams, LinkParams},
        instance::{Authority, ChainInstance, ChainState},
        memory::MemoryHost,
        plugin::TetherPhysicsPlugin,
        rapier::{RapierBackend, RapierBackendFixed, RapierContext},
    };
}

pub use plugin::TetherPhysicsPlugin;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
