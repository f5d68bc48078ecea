//! Distance-keyed level-of-detail resolution.
//!
//! The LOD table is scanned in stored order and the first level whose
//! inclusive `[min_distance, max_distance]` range contains the distance wins.
//! Overlapping ranges are therefore resolved by table order, never by the
//! narrowest or closest range. No match is not an error: the profile's base
//! segment count applies.

use crate::profile::{ChainProfile, clamp_segment_count};

/// Index of the first LOD level containing `distance`, or `None`.
///
/// Negative distances are clamped to zero.
pub fn lod_index_for_distance(profile: &ChainProfile, distance: f32) -> Option<usize> {
    let distance = distance.max(0.0);
    profile
        .lod_levels
        .iter()
        .position(|level| level.contains(distance))
}

/// Effective segment count for an observer at `distance`. Always within
/// `2..=MAX_SEGMENT_COUNT`.
#[allow(clippy::cast_sign_loss)]
pub fn resolve_segment_count(profile: &ChainProfile, distance: f32) -> usize {
    let base = profile.base_segment_count();
    let Some(index) = lod_index_for_distance(profile, distance) else {
        return base;
    };

    let overridden = profile.lod_levels[index].segment_count_override;
    if overridden <= 0 {
        base
    } else {
        clamp_segment_count(overridden as usize)
    }
}

// ---------------------------------------------------------------------------
// LodSelection
// ---------------------------------------------------------------------------

/// Everything a chain needs from the LOD table for one observer distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LodSelection {
    /// Matched level, `None` when the table has no match.
    pub index: Option<usize>,
    pub segment_count: usize,
    pub simulate_physics: bool,
    pub enable_collisions: bool,
    pub simulation_rate_factor: f32,
}

impl LodSelection {
    /// Selection used when no LOD applies: base count, full simulation.
    pub fn base(profile: &ChainProfile) -> Self {
        Self {
            index: None,
            segment_count: profile.base_segment_count(),
            simulate_physics: true,
            enable_collisions: true,
            simulation_rate_factor: 1.0,
        }
    }
}

/// Resolve the full [`LodSelection`] for `distance`.
pub fn select_lod(profile: &ChainProfile, distance: f32) -> LodSelection {
    let segment_count = resolve_segment_count(profile, distance);
    match lod_index_for_distance(profile, distance) {
        Some(index) => {
            let level = &profile.lod_levels[index];
            LodSelection {
                index: Some(index),
                segment_count,
                simulate_physics: level.simulate_physics,
                enable_collisions: level.enable_collisions,
                simulation_rate_factor: level.simulation_rate_factor.max(0.01),
            }
        }
        None => LodSelection::base(profile),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
