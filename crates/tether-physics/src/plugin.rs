//! The chain plugin that delegates to a concrete backend.

use bevy::app::{App, Plugin};

use crate::backend::PhysicsBackend;

/// Bevy plugin that wires a [`PhysicsBackend`] into the app.
///
/// # Usage
///
/// ```ignore
/// app.add_plugins((TetherCorePlugin, TetherPhysicsPlugin::new(RapierBackend)));
/// ```
///
/// Add [`TetherCorePlugin`](tether_core::TetherCorePlugin) first so the
/// backend sees the app's [`PhysicsConfig`](tether_core::config::PhysicsConfig).
pub struct TetherPhysicsPlugin {
    backend: Box<dyn PhysicsBackend>,
}

impl TetherPhysicsPlugin {
    pub fn new(backend: impl PhysicsBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// The name of the active backend.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }
}

impl Plugin for TetherPhysicsPlugin {
    fn build(&self, app: &mut App) {
        self.backend.build(app);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
