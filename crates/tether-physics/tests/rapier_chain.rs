//! Chains simulated by rapier inside a Bevy app.

use bevy::prelude::*;

use tether_core::anchor::Anchor;
use tether_core::types::AttachmentId;
use tether_physics::prelude::*;
use tether_test_utils::{anchored_profile, shared, test_app_with, two_level_lod_profile};

fn rapier_app() -> App {
    test_app_with(TetherPhysicsPlugin::new(RapierBackend))
}

fn link_positions(app: &App, chain: Entity) -> Vec<Vec3> {
    let chain = app.world().get::<Chain>(chain).unwrap();
    let ctx = app.world().resource::<RapierContext>();
    chain
        .instance
        .links()
        .iter()
        .map(|l| ctx.link_transform(*l).unwrap().translation)
        .collect()
}

#[test]
fn loose_chain_falls_under_gravity() {
    let mut app = rapier_app();
    let start = Vec3::new(0.0, 0.0, 1000.0);
    let instance = ChainInstance::new(shared(tether_core::profile::ChainProfile::default()))
        .with_anchors(Anchor::world(start), Anchor::default());
    let e = app.world_mut().spawn(Chain::new(instance)).id();

    app.update();
    let before = link_positions(&app, e);
    assert_eq!(before.len(), 8);

    for _ in 0..60 {
        app.update();
    }
    let after = link_positions(&app, e);
    assert!(after[7].z < before[7].z);
}

#[test]
fn snapped_root_follows_attachment() {
    let mut app = rapier_app();
    let hook = AttachmentId(7);
    app.world_mut()
        .resource_mut::<RapierContext>()
        .register_attachment(hook, Transform::from_xyz(0.0, 0.0, 800.0));

    let instance = ChainInstance::new(shared(anchored_profile()))
        .with_anchors(Anchor::attachment(hook), Anchor::world(Vec3::new(300.0, 0.0, 800.0)));
    let e = app.world_mut().spawn(Chain::new(instance)).id();
    app.update();

    for _ in 0..30 {
        app.update();
    }
    let root = link_positions(&app, e)[0];
    assert!(root.distance(Vec3::new(0.0, 0.0, 800.0)) < 10.0);
}

#[test]
fn far_viewer_switches_to_low_detail() {
    let mut app = rapier_app();
    app.world_mut()
        .spawn((ChainViewer, Transform::from_xyz(5000.0, 0.0, 0.0)));
    let instance = ChainInstance::new(shared(two_level_lod_profile()))
        .with_anchors(Anchor::world(Vec3::ZERO), Anchor::default());
    let e = app.world_mut().spawn(Chain::new(instance)).id();

    app.update();
    app.update();
    let chain = app.world().get::<Chain>(e).unwrap();
    assert_eq!(chain.instance.segment_count(), 3);
    assert!((chain.instance.simulation_rate_factor() - 0.5).abs() < f32::EPSILON);
    let ctx = app.world().resource::<RapierContext>();
    assert_eq!(ctx.links.len(), 3);
    assert!(ctx.links.values().all(|l| !l.params.collision_enabled));
}

#[test]
fn manual_break_detaches_lower_half() {
    let mut app = rapier_app();
    let instance = ChainInstance::new(shared(tether_core::profile::ChainProfile::default()))
        .with_anchors(Anchor::world(Vec3::new(0.0, 0.0, 1000.0)), Anchor::default());
    let e = app.world_mut().spawn(Chain::new(instance)).id();
    app.update();

    app.world_mut()
        .resource_scope(|world, mut ctx: Mut<RapierContext>| {
            let mut chain = world.get_mut::<Chain>(e).unwrap();
            chain.instance.break_link(&mut *ctx, 3);
        });
    for _ in 0..60 {
        app.update();
    }

    let chain = app.world().get::<Chain>(e).unwrap();
    let ctx = app.world().resource::<RapierContext>();
    assert!(chain.instance.is_link_broken(ctx, 3));
    assert_eq!(ctx.impulse_joint_set.len(), 6);
}

#[test]
fn despawned_chain_leaves_no_bodies() {
    let mut app = rapier_app();
    let instance = ChainInstance::new(shared(anchored_profile())).with_anchors(
        Anchor::world(Vec3::new(0.0, 0.0, 500.0)),
        Anchor::world(Vec3::new(437.5, 0.0, 500.0)),
    );
    let e = app.world_mut().spawn(Chain::new(instance)).id();
    app.update();
    assert_eq!(app.world().resource::<RapierContext>().rigid_body_set.len(), 8);

    app.world_mut().despawn(e);
    app.update();
    let ctx = app.world().resource::<RapierContext>();
    assert_eq!(ctx.rigid_body_set.len(), 0);
    assert_eq!(ctx.collider_set.len(), 0);
    assert_eq!(ctx.impulse_joint_set.len(), 0);
    assert!(ctx.links.is_empty());
    assert!(ctx.joints.is_empty());
}
