// tether-core: Profiles, LOD, anchors, replication hints and errors for Tether chains.

pub mod anchor;
pub mod config;
pub mod error;
pub mod lod;
pub mod network;
pub mod presets;
pub mod profile;
pub mod types;

use bevy::prelude::*;

// ---------------------------------------------------------------------------
// TetherSet
// ---------------------------------------------------------------------------

/// Ordering of chain work inside a frame.
///
/// Chains are (re)built before the physics host steps, so a rebuild never
/// interleaves with a step.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TetherSet {
    /// Initial builds, LOD changes and other rebuilds.
    Rebuild,
    /// Physics stepping and joint breakage.
    Simulate,
}

// ---------------------------------------------------------------------------
// TetherCorePlugin
// ---------------------------------------------------------------------------

/// Configures [`TetherSet`] ordering on `Update` and `FixedUpdate` and
/// initializes [`config::PhysicsConfig`].
pub struct TetherCorePlugin;

impl Plugin for TetherCorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<config::PhysicsConfig>()
            .configure_sets(Update, (TetherSet::Rebuild, TetherSet::Simulate).chain())
            .configure_sets(
                FixedUpdate,
                (TetherSet::Rebuild, TetherSet::Simulate).chain(),
            );
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        TetherCorePlugin, TetherSet,
        anchor::{Anchor, SocketLookup},
        config::PhysicsConfig,
        error::{ConfigError, TetherError},
        lod::{LodSelection, lod_index_for_distance, resolve_segment_count, select_lod},
        network::{NetworkSettings, ReplicationMode, ReplicationPlan},
        profile::{
            ChainProfile, ChainType, CollisionChannel, CollisionClass, ConstraintSettings,
            LinkPhysicsSettings, LinkTransform, LodLevel, VisualSettings,
        },
        types::{AttachmentId, BodyId, JointId},
    };
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
