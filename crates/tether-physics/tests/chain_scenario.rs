//! End-to-end chain lifecycle on the bookkeeping host.

use approx::assert_relative_eq;
use bevy::prelude::{Transform, Vec3};

use tether_core::anchor::Anchor;
use tether_core::lod::resolve_segment_count;
use tether_core::profile::ChainProfile;
use tether_core::types::AttachmentId;
use tether_physics::binder::rest_positions;
use tether_physics::prelude::*;
use tether_test_utils::{anchored_profile, overlapping_lod_profile, shared};

const A: Vec3 = Vec3::new(0.0, 0.0, 300.0);
const B: Vec3 = Vec3::new(350.0, 0.0, 300.0);

fn anchored_chain() -> (MemoryHost, ChainInstance) {
    let mut host = MemoryHost::new();
    let mut chain = ChainInstance::new(shared(anchored_profile()))
        .with_anchors(Anchor::world(A), Anchor::world(B));
    assert!(chain.initialize_from_profile(&mut host));
    (host, chain)
}

#[test]
fn default_profile_resolves_eight_at_any_distance() {
    let profile = ChainProfile::default();
    for d in [0.0, 1.0, 500.0, 99_999.0, 100_000.0, 1e9] {
        assert_eq!(resolve_segment_count(&profile, d), 8);
    }
}

#[test]
fn overlapping_lod_uses_first_match() {
    assert_eq!(resolve_segment_count(&overlapping_lod_profile(), 75.0), 4);
    assert_eq!(resolve_segment_count(&overlapping_lod_profile(), 125.0), 6);
}

#[test]
fn eight_link_chain_between_world_anchors() {
    let (host, chain) = anchored_chain();
    assert_eq!(chain.links().len(), 8);
    assert_eq!(chain.joints().len(), 7);

    let first = host.link_transform(chain.links()[0]).unwrap().translation;
    let last = host.link_transform(chain.links()[7]).unwrap().translation;
    assert_eq!(first, A);
    assert_eq!(last, B);

    for (i, joint) in chain.joints().iter().enumerate() {
        let record = host.joint(*joint).unwrap();
        assert_eq!(record.parent, chain.links()[i]);
        assert_eq!(record.child, chain.links()[i + 1]);
    }
}

#[test]
fn rest_pose_uses_segment_length_towards_end() {
    let (host, chain) = anchored_chain();
    let positions: Vec<Vec3> = chain
        .links()
        .iter()
        .map(|l| host.link_transform(*l).unwrap().translation)
        .collect();
    // 500 units over 8 links; the tail is then pinned to B.
    for (i, p) in positions.iter().take(7).enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let expected = A + Vec3::X * 62.5 * i as f32;
        assert_relative_eq!(p.x, expected.x, epsilon = 1e-3);
        assert_relative_eq!(p.z, expected.z, epsilon = 1e-3);
    }
    assert_eq!(positions[7], B);
}

#[test]
fn rebuild_is_idempotent() {
    let (mut host, mut chain) = anchored_chain();
    let snapshot = |host: &MemoryHost, chain: &ChainInstance| {
        let links: Vec<_> = chain
            .links()
            .iter()
            .map(|l| {
                let r = host.link(*l).unwrap();
                (r.params.clone(), r.transform)
            })
            .collect();
        let joints: Vec<_> = chain
            .joints()
            .iter()
            .map(|j| host.joint(*j).unwrap().params.clone())
            .collect();
        (links, joints)
    };

    let first = snapshot(&host, &chain);
    chain.clear(&mut host);
    assert_eq!(chain.state(), ChainState::Empty);
    chain.rebuild(&mut host);
    let second = snapshot(&host, &chain);

    assert_eq!(first, second);
    assert_eq!(host.link_count(), 8);
    assert_eq!(host.joint_count(), 7);
}

#[test]
fn break_link_out_of_range_changes_nothing() {
    let (mut host, mut chain) = anchored_chain();
    let joints = chain.joints().to_vec();
    chain.break_link(&mut host, 7);
    chain.break_link(&mut host, 1000);
    assert_eq!(chain.joints(), joints.as_slice());
    assert!(joints.iter().all(|j| !host.is_joint_broken(*j)));
}

#[test]
fn broken_link_splits_chain_but_keeps_neighbors() {
    let (mut host, mut chain) = anchored_chain();
    chain.break_link(&mut host, 3);
    assert!(chain.is_link_broken(&host, 3));
    assert!(!chain.is_link_broken(&host, 2));
    assert!(!chain.is_link_broken(&host, 4));
    assert_eq!(chain.joints().len(), 7);
}

#[test]
fn loose_end_leaves_tail_where_layout_put_it() {
    let mut host = MemoryHost::new();
    let mut chain = ChainInstance::new(shared(ChainProfile::default()))
        .with_anchors(Anchor::world(A), Anchor::world(B));
    chain.initialize_from_profile(&mut host);

    let tail = host.link_transform(chain.links()[7]).unwrap().translation;
    assert_ne!(tail, B);
    assert_relative_eq!(tail.x, A.x + 62.5 * 7.0, epsilon = 1e-3);
}

#[test]
fn socket_anchors_snap_root_and_soft_attach_tail() {
    let mut host = MemoryHost::new();
    let hand = AttachmentId(1);
    let post = AttachmentId(2);
    host.set_attachment(hand, Transform::from_translation(A));
    host.set_attachment(post, Transform::from_translation(B));
    host.add_socket(post, "ring", Transform::from_xyz(0.0, 0.0, 20.0));

    let mut chain = ChainInstance::new(shared(anchored_profile()))
        .with_anchors(Anchor::attachment(hand), Anchor::socket(post, "ring"));
    chain.initialize_from_profile(&mut host);

    let root = host.link(chain.links()[0]).unwrap();
    assert_eq!(root.transform.translation, A);
    assert_eq!(root.attachment.as_ref().unwrap().rule, AttachRule::SnapToTarget);

    let tail = host.link(chain.links()[7]).unwrap();
    assert_eq!(
        tail.attachment.as_ref().unwrap().rule,
        AttachRule::KeepWorldTransform
    );
    // Soft attach keeps the tail where the rest pose put it.
    let ring = B + Vec3::new(0.0, 0.0, 20.0);
    let laid_out = rest_positions(A, Some(ring), 8, 62.5)[7];
    assert_relative_eq!(tail.transform.translation.x, laid_out.x, epsilon = 1e-3);
    assert_relative_eq!(tail.transform.translation.z, laid_out.z, epsilon = 1e-3);
}

#[test]
fn authored_pose_skips_layout() {
    let mut profile = anchored_profile();
    profile.use_world_space_rest_pose = false;
    let mut host = MemoryHost::new();
    let mut chain = ChainInstance::new(shared(profile))
        .with_anchors(Anchor::world(A), Anchor::world(B));
    chain.initialize_from_profile(&mut host);

    let middle = host.link_transform(chain.links()[3]).unwrap();
    assert_eq!(middle, Transform::IDENTITY);
    assert_eq!(host.link_transform(chain.links()[0]).unwrap().translation, A);
}
