//! Rapier physics step system.

use bevy::prelude::*;

use crate::components::Chain;

use super::context::RapierContext;

/// Step rapier for one frame, then break overloaded joints.
///
/// Built chains run at their LOD's simulation rate: the world only steps on
/// frames where at least one of them is due. With no built chain the world
/// steps every frame.
pub fn physics_step_system(mut context: ResMut<RapierContext>, mut chains: Query<&mut Chain>) {
    let mut any_built = false;
    let mut due = false;
    for mut chain in &mut chains {
        if !chain.instance.is_built() {
            continue;
        }
        any_built = true;
        due |= chain.tick();
    }
    if any_built && !due {
        return;
    }

    context.step_frame();

    for joint in context.apply_breakage() {
        warn!("tether: {joint} exceeded its break threshold");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ChainHost;
    use crate::instance::ChainInstance;
    use std::sync::Arc;
    use tether_core::anchor::Anchor;
    use tether_core::presets::restraint;
    use tether_core::profile::{ChainProfile, LodLevel};
    use tether_core::types::AttachmentId;

    fn app(profile: ChainProfile) -> (App, Entity) {
        let mut app = App::new();
        let mut context = RapierContext::new(Vec3::new(0.0, 0.0, -980.0), 1.0 / 240.0, 4);
        let mut instance = ChainInstance::new(Arc::new(profile)).with_anchors(
            Anchor::world(Vec3::new(0.0, 0.0, 1000.0)),
            Anchor::default(),
        );
        instance.initialize_from_profile(&mut context);
        app.insert_resource(context);
        let e = app.world_mut().spawn(Chain::new(instance)).id();
        app.add_systems(Update, physics_step_system);
        (app, e)
    }

    fn tail_z(app: &App, e: Entity) -> f32 {
        let chain = app.world().get::<Chain>(e).unwrap();
        let tail = *chain.instance.links().last().unwrap();
        app.world()
            .resource::<RapierContext>()
            .link_transform(tail)
            .unwrap()
            .translation
            .z
    }

    #[test]
    fn loose_tail_falls_under_gravity() {
        let (mut app, e) = app(ChainProfile::default());
        let before = tail_z(&app, e);
        for _ in 0..30 {
            app.update();
        }
        assert!(tail_z(&app, e) < before);
    }

    #[test]
    fn low_rate_chain_skips_frames() {
        let mut profile = ChainProfile::default();
        profile.lod_levels = vec![LodLevel {
            simulation_rate_factor: 0.01,
            ..LodLevel::default()
        }];
        let (mut app, e) = app(profile);
        let before = tail_z(&app, e);
        for _ in 0..5 {
            app.update();
        }
        assert!((tail_z(&app, e) - before).abs() < f32::EPSILON);
    }

    #[test]
    fn hanging_weight_breaks_joints() {
        let mut profile = ChainProfile::default();
        profile.constraint.break_force = 50.0;
        let mut context = RapierContext::new(Vec3::new(0.0, 0.0, -980.0), 1.0 / 240.0, 4);
        let hook = AttachmentId(1);
        context.register_attachment(hook, Transform::from_xyz(0.0, 0.0, 1000.0));
        let mut instance = ChainInstance::new(Arc::new(profile))
            .with_anchors(Anchor::attachment(hook), Anchor::default());
        instance.initialize_from_profile(&mut context);

        let mut app = App::new();
        app.insert_resource(context);
        let e = app.world_mut().spawn(Chain::new(instance)).id();
        app.add_systems(Update, physics_step_system);
        for _ in 0..30 {
            app.update();
        }
        let chain = app.world().get::<Chain>(e).unwrap();
        let context = app.world().resource::<RapierContext>();
        assert_eq!(chain.instance.joints().len(), 7);
        assert!((0..7).any(|i| chain.instance.is_link_broken(context, i)));
    }

    #[test]
    fn rest_pose_leaves_joints_unloaded() {
        let mut profile = ChainProfile::default();
        profile.supports_loose_end = false;
        profile.constraint.break_force = 100_000.0;
        // 500 units over 8 links: the tail center sits 7/8 of the length out.
        let start = Vec3::new(0.0, 0.0, 1000.0);
        let end = start + Vec3::X * 437.5;
        let mut context = RapierContext::new(Vec3::new(0.0, 0.0, -980.0), 1.0 / 240.0, 4);
        let mut instance = ChainInstance::new(Arc::new(profile))
            .with_anchors(Anchor::world(start), Anchor::world(end));
        instance.initialize_from_profile(&mut context);

        for joint in instance.joints() {
            let (force, torque) = context.joint_load(*joint).unwrap();
            assert!(force < 1.0, "{joint} preloaded with {force}");
            assert!(torque < 1.0, "{joint} preloaded with {torque}");
        }
        assert!(context.apply_breakage().is_empty());
    }

    #[test]
    fn restraint_survives_first_step() {
        let start = Vec3::new(0.0, 0.0, 1000.0);
        let mut context = RapierContext::new(Vec3::new(0.0, 0.0, -980.0), 1.0 / 240.0, 4);
        let mut instance = ChainInstance::new(Arc::new(restraint())).with_anchors(
            Anchor::world(start),
            Anchor::world(start + Vec3::X * 45.0),
        );
        instance.initialize_from_profile(&mut context);

        let mut app = App::new();
        app.insert_resource(context);
        let e = app.world_mut().spawn(Chain::new(instance)).id();
        app.add_systems(Update, physics_step_system);
        app.update();

        let chain = app.world().get::<Chain>(e).unwrap();
        let context = app.world().resource::<RapierContext>();
        assert_eq!(chain.instance.joints().len(), 3);
        assert!((0..3).all(|i| !chain.instance.is_link_broken(context, i)));
    }
}
