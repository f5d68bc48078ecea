//! Chain profile fixtures.

use std::sync::Arc;

use tether_core::profile::{ChainProfile, LodLevel};

/// Wrap a profile for sharing between chain instances.
pub fn shared(profile: ChainProfile) -> Arc<ChainProfile> {
    Arc::new(profile)
}

/// Default profile (8 links, 500 units) with both ends bound.
pub fn anchored_profile() -> ChainProfile {
    ChainProfile {
        name: "anchored".into(),
        supports_loose_end: false,
        ..ChainProfile::default()
    }
}

/// Full detail up to 1000 units, 3 links beyond, 0.5 simulation rate and no
/// collisions at range.
pub fn two_level_lod_profile() -> ChainProfile {
    ChainProfile {
        name: "two_level".into(),
        lod_levels: vec![
            LodLevel {
                min_distance: 0.0,
                max_distance: 1000.0,
                ..LodLevel::default()
            },
            LodLevel {
                min_distance: 1000.0,
                max_distance: 100_000.0,
                segment_count_override: 3,
                enable_collisions: false,
                simulation_rate_factor: 0.5,
                ..LodLevel::default()
            },
        ],
        ..ChainProfile::default()
    }
}

/// `[0, 100]` with 4 links overlapping `[50, 150]` with 6 links.
pub fn overlapping_lod_profile() -> ChainProfile {
    ChainProfile {
        name: "overlapping".into(),
        lod_levels: vec![
            LodLevel {
                min_distance: 0.0,
                max_distance: 100.0,
                segment_count_override: 4,
                ..LodLevel::default()
            },
            LodLevel {
                min_distance: 50.0,
                max_distance: 150.0,
                segment_count_override: 6,
                ..LodLevel::default()
            },
        ],
        ..ChainProfile::default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
