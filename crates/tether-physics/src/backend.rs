//! Host backend trait.
//!
//! A backend inserts its [`ChainHost`](crate::host::ChainHost) resource and
//! registers the chain systems against it. Pass one to
//! [`TetherPhysicsPlugin::new`](super::TetherPhysicsPlugin::new).

use bevy::prelude::*;

use crate::memory::MemoryHost;
use crate::systems::add_chain_systems;

/// Trait that concrete chain hosts must implement.
pub trait PhysicsBackend: Send + Sync + 'static {
    /// Called once during plugin build to insert the host resource and
    /// register systems in [`TetherSet`](tether_core::TetherSet).
    fn build(&self, app: &mut App);

    /// Human-readable backend name (e.g., "rapier3d").
    fn name(&self) -> &str;
}

/// Bookkeeping backend with no solver: chains are built, bound and rebuilt
/// but never simulated.
pub struct MemoryBackend;

impl PhysicsBackend for MemoryBackend {
    fn build(&self, app: &mut App) {
        app.init_resource::<MemoryHost>();
        add_chain_systems::<MemoryHost>(app);
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
