//! Chain components.
//!
//! A [`Chain`] entity owns one [`ChainInstance`]. The systems in
//! [`crate::systems`] build it once its owner is authoritative, keep its LOD
//! in step with the [`ChainViewer`], and release its bodies when the
//! component is removed.

use bevy::prelude::*;

use crate::instance::ChainInstance;

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// A chain living in the ECS world.
#[derive(Component, Debug)]
pub struct Chain {
    pub instance: ChainInstance,
    /// Accumulated simulation rate, see [`Chain::tick`].
    pub rate_accumulator: f32,
    /// Set until the initial build has run.
    pub pending_build: bool,
}

impl Chain {
    pub fn new(instance: ChainInstance) -> Self {
        Self {
            instance,
            rate_accumulator: 0.0,
            pending_build: true,
        }
    }

    /// Advance the rate accumulator by one frame. Returns `true` when the
    /// chain is due a physics step.
    pub fn tick(&mut self) -> bool {
        self.rate_accumulator += self.instance.simulation_rate_factor();
        if self.rate_accumulator >= 1.0 {
            self.rate_accumulator -= 1.0;
            true
        } else {
            false
        }
    }
}

impl From<ChainInstance> for Chain {
    fn from(instance: ChainInstance) -> Self {
        Self::new(instance)
    }
}

// ---------------------------------------------------------------------------
// ChainViewer
// ---------------------------------------------------------------------------

/// Marks the entity whose `Transform` is the LOD observer.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct ChainViewer;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
