//! [`RapierBackend`]: chains simulated by raw `rapier3d`.

use bevy::prelude::*;

use tether_core::TetherSet;
use tether_core::config::PhysicsConfig;

use crate::backend::PhysicsBackend;
use crate::systems::add_chain_systems;

use super::context::RapierContext;
use super::systems::physics_step_system;

/// Shared setup: insert the RapierContext resource from PhysicsConfig and
/// register the chain systems and release observer against it.
fn insert_rapier_context(app: &mut App) {
    let config = app
        .world()
        .get_resource::<PhysicsConfig>()
        .cloned()
        .unwrap_or_default();
    app.insert_resource(RapierContext::from_config(&config));
    add_chain_systems::<RapierContext>(app);
}

/// Raw rapier3d backend.
///
/// Inserts a [`RapierContext`] and steps it in [`TetherSet::Simulate`] on the
/// `Update` schedule.
pub struct RapierBackend;

impl PhysicsBackend for RapierBackend {
    fn build(&self, app: &mut App) {
        insert_rapier_context(app);
        app.add_systems(Update, physics_step_system.in_set(TetherSet::Simulate));
    }

    fn name(&self) -> &str {
        "rapier3d"
    }
}

/// Rapier3d backend that steps on `FixedUpdate` instead of `Update`.
///
/// Use this when the simulation should run at a fixed rate decoupled from the
/// render frame rate. Set the `FixedUpdate` timestep via `Time<Fixed>`.
pub struct RapierBackendFixed;

impl PhysicsBackend for RapierBackendFixed {
    fn build(&self, app: &mut App) {
        insert_rapier_context(app);
        app.add_systems(FixedUpdate, physics_step_system.in_set(TetherSet::Simulate));
    }

    fn name(&self) -> &str {
        "rapier3d-fixed"
    }
}
