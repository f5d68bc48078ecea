//! The shipped profile and physics files load and validate.

use std::path::PathBuf;

use tether_core::config::PhysicsConfig;
use tether_core::lod::{resolve_segment_count, select_lod};
use tether_core::network::{ReplicationMode, ReplicationPlan};
use tether_core::profile::{ChainProfile, ChainType, CollisionChannel};

fn asset(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../assets")
        .join(name)
}

#[test]
fn rope_profile_loads() {
    let p = ChainProfile::from_file(asset("profiles/rope.toml")).unwrap();
    assert_eq!(p.chain_type, ChainType::Rope);
    assert_eq!(p.base_segment_count(), 16);
    assert_eq!(resolve_segment_count(&p, 100.0), 16);
    assert_eq!(resolve_segment_count(&p, 5000.0), 6);
    assert!((select_lod(&p, 5000.0).simulation_rate_factor - 0.5).abs() < f32::EPSILON);

    let plan = ReplicationPlan::for_chain(&p.network, 16);
    assert_eq!(plan.mode, ReplicationMode::KeyLinksOnly);
    assert_eq!(plan.link_indices.first(), Some(&0));
    assert_eq!(plan.link_indices.last(), Some(&15));
}

#[test]
fn restraint_profile_loads() {
    let p = ChainProfile::from_file(asset("profiles/restraint.toml")).unwrap();
    assert!(!p.supports_loose_end);
    assert!(!p.allow_dynamic_length_change);
    assert_eq!(p.physics.collision_channel, CollisionChannel::Pawn);
    assert!(p.constraint.enable_twist);
    assert_eq!(p.network.mode, ReplicationMode::Full);
    assert_eq!(p.lod_levels.len(), 1);
}

#[test]
fn physics_config_loads() {
    let cfg = PhysicsConfig::from_file(asset("physics.toml")).unwrap();
    assert_eq!(cfg.substeps, 4);
    assert!((cfg.gravity[2] + 980.0).abs() < f32::EPSILON);
}
