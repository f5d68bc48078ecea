//! Starting profiles for each [`ChainType`].

use crate::network::ReplicationMode;
use crate::profile::{ChainProfile, ChainType, LodLevel};

/// A validated starting profile for `chain_type`.
pub fn profile_for(chain_type: ChainType) -> ChainProfile {
    match chain_type {
        ChainType::Rope => rope(),
        ChainType::MetalChain => metal_chain(),
        ChainType::Grapple => grapple(),
        ChainType::Restraint => restraint(),
        ChainType::Custom => ChainProfile {
            name: "custom".into(),
            chain_type: ChainType::Custom,
            ..ChainProfile::default()
        },
    }
}

/// Soft rope: many light segments, loose swing, no twist limit.
pub fn rope() -> ChainProfile {
    let mut p = ChainProfile {
        name: "rope".into(),
        chain_type: ChainType::Rope,
        ..ChainProfile::default()
    };
    p.visual.default_segment_count = 16;
    p.visual.default_length = 800.0;
    p.physics.link_mass = 0.2;
    p.physics.link_radius = 1.5;
    p.constraint.max_swing_angle = 60.0;
    p.constraint.linear_stiffness = 20_000.0;
    p.constraint.angular_stiffness = 500.0;
    p.lod_levels = vec![
        LodLevel {
            max_distance: 3_000.0,
            ..LodLevel::default()
        },
        LodLevel {
            min_distance: 3_000.0,
            max_distance: 100_000.0,
            segment_count_override: 6,
            simulation_rate_factor: 0.5,
            ..LodLevel::default()
        },
    ];
    p
}

/// Heavy metal chain: fewer, heavier links with tight twist.
pub fn metal_chain() -> ChainProfile {
    let mut p = ChainProfile {
        name: "metal_chain".into(),
        chain_type: ChainType::MetalChain,
        ..ChainProfile::default()
    };
    p.visual.default_segment_count = 12;
    p.visual.default_length = 400.0;
    p.physics.link_mass = 3.0;
    p.physics.linear_damping = 0.3;
    p.physics.angular_damping = 0.5;
    p.physics.link_radius = 3.0;
    p.constraint.max_swing_angle = 30.0;
    p.constraint.enable_twist = true;
    p.constraint.max_twist_angle = 10.0;
    p.network.mode = ReplicationMode::Full;
    p
}

/// Grappling line: pinned at both ends and retractable.
pub fn grapple() -> ChainProfile {
    let mut p = ChainProfile {
        name: "grapple".into(),
        chain_type: ChainType::Grapple,
        supports_loose_end: false,
        allow_dynamic_length_change: true,
        ..ChainProfile::default()
    };
    p.visual.default_segment_count = 10;
    p.visual.default_length = 1_500.0;
    p.physics.link_mass = 0.5;
    p.constraint.linear_limit = 5.0;
    p
}

/// Shackle chain: short, breakable, fixed length.
pub fn restraint() -> ChainProfile {
    let mut p = ChainProfile {
        name: "restraint".into(),
        chain_type: ChainType::Restraint,
        supports_loose_end: false,
        allow_dynamic_length_change: false,
        ..ChainProfile::default()
    };
    p.visual.default_segment_count = 4;
    p.visual.default_length = 60.0;
    p.physics.link_mass = 0.8;
    p.constraint.break_force = 25_000.0;
    p.constraint.break_torque = 15_000.0;
    p
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ChainType; 5] = [
        ChainType::Rope,
        ChainType::MetalChain,
        ChainType::Grapple,
        ChainType::Restraint,
        ChainType::Custom,
    ];

    #[test]
    fn every_preset_validates() {
        for ty in ALL {
            let p = profile_for(ty);
            assert!(p.validate().is_ok(), "{ty:?} preset invalid");
            assert_eq!(p.chain_type, ty);
        }
    }

    #[test]
    fn restraint_is_breakable_and_fixed_length() {
        let p = restraint();
        assert!(p.constraint.break_force > 0.0);
        assert!(!p.allow_dynamic_length_change);
        assert!(!p.supports_loose_end);
    }

    #[test]
    fn rope_reduces_segments_far_away() {
        let p = rope();
        assert_eq!(crate::lod::resolve_segment_count(&p, 100.0), 16);
        assert_eq!(crate::lod::resolve_segment_count(&p, 5_000.0), 6);
    }
}
