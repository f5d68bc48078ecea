//! [`MemoryHost`]: a solver-less [`ChainHost`] that only keeps records.
//!
//! Useful wherever chain bookkeeping is needed without a physics engine:
//! dedicated-server validation, tooling, and tests. Bodies never move
//! unless the chain positions or attaches them.

use std::collections::{BTreeMap, HashMap};

use bevy::prelude::{Quat, Resource, Transform, Vec3};

use tether_core::anchor::SocketLookup;
use tether_core::types::{AttachmentId, BodyId, JointId};

use crate::host::{AttachRule, ChainHost, JointParams, LinkParams};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// An attachment recorded on a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkAttachment {
    pub target: AttachmentId,
    pub socket: Option<String>,
    pub rule: AttachRule,
}

#[derive(Debug, Clone)]
pub struct LinkRecord {
    pub params: LinkParams,
    /// World transform.
    pub transform: Transform,
    pub attachment: Option<LinkAttachment>,
    /// Links sharing a group never collide with each other.
    pub collision_group: Option<BodyId>,
}

#[derive(Debug, Clone)]
pub struct JointRecord {
    pub parent: BodyId,
    pub child: BodyId,
    pub params: JointParams,
    pub broken: bool,
}

#[derive(Debug, Clone, Default)]
struct AttachmentRecord {
    transform: Transform,
    /// Socket name → transform relative to the attachment.
    sockets: HashMap<String, Transform>,
}

// ---------------------------------------------------------------------------
// MemoryHost
// ---------------------------------------------------------------------------

/// Bookkeeping host with no simulation.
#[derive(Resource, Debug, Default)]
pub struct MemoryHost {
    next_id: u64,
    links: BTreeMap<BodyId, LinkRecord>,
    joints: BTreeMap<JointId, JointRecord>,
    attachments: HashMap<AttachmentId, AttachmentRecord>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Register (or move) an external attachment.
    pub fn set_attachment(&mut self, id: AttachmentId, transform: Transform) {
        self.attachments.entry(id).or_default().transform = transform;
    }

    /// Add a named socket to a registered attachment. Returns `false` if the
    /// attachment is unknown.
    pub fn add_socket(&mut self, id: AttachmentId, name: &str, local: Transform) -> bool {
        let Some(attachment) = self.attachments.get_mut(&id) else {
            return false;
        };
        attachment.sockets.insert(name.to_owned(), local);
        true
    }

    pub fn remove_attachment(&mut self, id: AttachmentId) {
        self.attachments.remove(&id);
    }

    pub fn link(&self, body: BodyId) -> Option<&LinkRecord> {
        self.links.get(&body)
    }

    pub fn joint(&self, joint: JointId) -> Option<&JointRecord> {
        self.joints.get(&joint)
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }
}

impl SocketLookup for MemoryHost {
    fn socket_transform(&self, target: AttachmentId, socket: Option<&str>) -> Option<Transform> {
        let attachment = self.attachments.get(&target)?;
        match socket {
            None => Some(attachment.transform),
            Some(name) => attachment
                .sockets
                .get(name)
                .map(|local| attachment.transform.mul_transform(*local)),
        }
    }
}

impl ChainHost for MemoryHost {
    fn create_link(&mut self, params: &LinkParams) -> BodyId {
        let id = BodyId(self.next());
        self.links.insert(
            id,
            LinkRecord {
                params: params.clone(),
                transform: params.relative_transform,
                attachment: None,
                collision_group: None,
            },
        );
        id
    }

    fn destroy_link(&mut self, body: BodyId) {
        self.links.remove(&body);
    }

    fn create_joint(&mut self, parent: BodyId, child: BodyId, params: &JointParams) -> JointId {
        let id = JointId(self.next());
        self.joints.insert(
            id,
            JointRecord {
                parent,
                child,
                params: params.clone(),
                broken: false,
            },
        );
        id
    }

    fn destroy_joint(&mut self, joint: JointId) {
        self.joints.remove(&joint);
    }

    fn break_joint(&mut self, joint: JointId) {
        if let Some(record) = self.joints.get_mut(&joint) {
            record.broken = true;
        }
    }

    fn is_joint_broken(&self, joint: JointId) -> bool {
        self.joints.get(&joint).is_some_and(|j| j.broken)
    }

    fn link_transform(&self, body: BodyId) -> Option<Transform> {
        self.links.get(&body).map(|l| l.transform)
    }

    fn set_link_world_position(&mut self, body: BodyId, position: Vec3) {
        if let Some(link) = self.links.get_mut(&body) {
            link.transform.translation = position;
        }
    }

    fn set_link_world_pose(&mut self, body: BodyId, position: Vec3, rotation: Quat) {
        if let Some(link) = self.links.get_mut(&body) {
            link.transform.translation = position;
            link.transform.rotation = rotation;
        }
    }

    fn exclude_mutual_collisions(&mut self, links: &[BodyId]) {
        let Some(&group) = links.first() else {
            return;
        };
        for link in links {
            if let Some(record) = self.links.get_mut(link) {
                record.collision_group = Some(group);
            }
        }
    }

    fn attach_link(
        &mut self,
        body: BodyId,
        target: AttachmentId,
        socket: Option<&str>,
        rule: AttachRule,
    ) -> bool {
        let Some(target_transform) = self.socket_transform(target, socket) else {
            return false;
        };
        let Some(link) = self.links.get_mut(&body) else {
            return false;
        };
        if rule == AttachRule::SnapToTarget {
            link.transform = target_transform;
        }
        link.attachment = Some(LinkAttachment {
            target,
            socket: socket.map(str::to_owned),
            rule,
        });
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ChainBuilder;
    use tether_core::profile::ChainProfile;

    fn params() -> (LinkParams, JointParams) {
        let profile = ChainProfile::default();
        let builder = ChainBuilder::new(&profile, 4);
        (builder.link_params(0), builder.joint_params())
    }

    #[test]
    fn ids_are_unique_across_kinds() {
        let (lp, jp) = params();
        let mut host = MemoryHost::new();
        let a = host.create_link(&lp);
        let b = host.create_link(&lp);
        let j = host.create_joint(a, b, &jp);
        assert_ne!(a, b);
        assert_ne!(a.0, j.0);
        assert_ne!(b.0, j.0);
    }

    #[test]
    fn break_is_idempotent() {
        let (lp, jp) = params();
        let mut host = MemoryHost::new();
        let a = host.create_link(&lp);
        let b = host.create_link(&lp);
        let j = host.create_joint(a, b, &jp);
        assert!(!host.is_joint_broken(j));
        host.break_joint(j);
        host.break_joint(j);
        assert!(host.is_joint_broken(j));
        assert_eq!(host.joint_count(), 1);
    }

    #[test]
    fn unknown_handles_are_ignored() {
        let mut host = MemoryHost::new();
        host.destroy_link(BodyId(99));
        host.destroy_joint(JointId(99));
        host.break_joint(JointId(99));
        host.set_link_world_position(BodyId(99), Vec3::ONE);
        assert!(!host.is_joint_broken(JointId(99)));
        assert!(host.link_transform(BodyId(99)).is_none());
    }

    #[test]
    fn socket_transform_composes_with_attachment() {
        let mut host = MemoryHost::new();
        let hand = AttachmentId(1);
        host.set_attachment(hand, Transform::from_xyz(5.0, 0.0, 0.0));
        assert!(host.add_socket(hand, "palm", Transform::from_xyz(0.0, 1.0, 0.0)));
        assert!(!host.add_socket(AttachmentId(2), "palm", Transform::IDENTITY));

        let t = host.socket_transform(hand, Some("palm")).unwrap();
        assert_eq!(t.translation, Vec3::new(5.0, 1.0, 0.0));
        assert!(host.socket_transform(hand, Some("missing")).is_none());
    }

    #[test]
    fn snap_attach_copies_scale() {
        let (lp, _) = params();
        let mut host = MemoryHost::new();
        let hook = AttachmentId(3);
        host.set_attachment(
            hook,
            Transform::from_xyz(1.0, 2.0, 3.0).with_scale(Vec3::splat(2.0)),
        );
        let link = host.create_link(&lp);

        assert!(host.attach_link(link, hook, None, AttachRule::SnapToTarget));
        let t = host.link_transform(link).unwrap();
        assert_eq!(t.translation, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.scale, Vec3::splat(2.0));
    }

    #[test]
    fn keep_world_attach_does_not_move_link() {
        let (lp, _) = params();
        let mut host = MemoryHost::new();
        let hook = AttachmentId(3);
        host.set_attachment(hook, Transform::from_xyz(1.0, 2.0, 3.0));
        let link = host.create_link(&lp);
        host.set_link_world_position(link, Vec3::new(-4.0, 0.0, 0.0));

        assert!(host.attach_link(link, hook, None, AttachRule::KeepWorldTransform));
        assert_eq!(
            host.link_transform(link).unwrap().translation,
            Vec3::new(-4.0, 0.0, 0.0)
        );
        assert_eq!(
            host.link(link).unwrap().attachment.as_ref().unwrap().rule,
            AttachRule::KeepWorldTransform
        );
    }

    #[test]
    fn attach_to_unknown_target_fails() {
        let (lp, _) = params();
        let mut host = MemoryHost::new();
        let link = host.create_link(&lp);
        assert!(!host.attach_link(link, AttachmentId(5), None, AttachRule::SnapToTarget));
        assert!(host.link(link).unwrap().attachment.is_none());
    }
}
