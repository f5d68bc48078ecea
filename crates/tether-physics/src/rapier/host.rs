//! [`ChainHost`] implementation on top of [`RapierContext`].
//!
//! Links are dynamic capsule bodies along their local X axis (kinematic when
//! the LOD disables simulation). Chain joints are generic joints with every
//! axis free, held together by stiffness-only motors and optionally bounded
//! by limits. Attachments are kinematic bodies; snapping uses a fixed joint
//! and keep-world attachment a spherical joint.

use bevy::log::warn;
use bevy::prelude::{Quat, Transform, Vec3};
use rapier3d::prelude::{
    ActiveHooks, ColliderBuilder, FixedJointBuilder, GenericJoint, GenericJointBuilder, InteractionGroups,
    JointAxesMask, JointAxis, MassProperties, MotorModel, RigidBodyBuilder, SphericalJointBuilder,
};

use tether_core::anchor::SocketLookup;
use tether_core::profile::{CollisionChannel, CollisionClass};
use tether_core::types::{AttachmentId, BodyId, JointId};

use crate::host::{AttachRule, AxisLimit, ChainHost, JointParams, LinkParams};

use super::context::{JointInfo, LinkInfo, RapierContext, channel_groups};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Principal inertia of a solid rod of `mass` along X.
fn rod_inertia(mass: f32, half_length: f32, radius: f32) -> Vec3 {
    let length = half_length * 2.0;
    let axial = 0.5 * mass * radius * radius;
    let transverse = mass * (3.0 * radius * radius + length * length) / 12.0;
    Vec3::new(axial, transverse, transverse)
}

/// Build the rapier joint between two adjacent links.
fn chain_joint(params: &JointParams) -> GenericJoint {
    let offset = Vec3::X * params.anchor_offset;
    let mut joint = GenericJointBuilder::new(JointAxesMask::empty())
        .local_anchor1(offset)
        .local_anchor2(-offset)
        .contacts_enabled(params.contacts_enabled)
        .build();

    let angular = [
        (JointAxis::AngX, params.twist),
        (JointAxis::AngY, params.swing1),
        (JointAxis::AngZ, params.swing2),
    ];
    for (axis, limit) in angular {
        if let AxisLimit::Limited(degrees) = limit {
            let r = degrees.to_radians();
            joint.set_limits(axis, [-r, r]);
        }
        joint.set_motor_model(axis, MotorModel::ForceBased);
        joint.set_motor(axis, 0.0, 0.0, params.angular_stiffness, 0.0);
    }

    let linear = [JointAxis::LinX, JointAxis::LinY, JointAxis::LinZ];
    for (axis, limit) in linear.into_iter().zip(params.linear) {
        if let AxisLimit::Limited(bound) = limit {
            joint.set_limits(axis, [-bound, bound]);
        }
        joint.set_motor_model(axis, MotorModel::ForceBased);
        joint.set_motor(axis, 0.0, 0.0, params.linear_stiffness, 0.0);
    }

    joint
}

impl RapierContext {
    fn collision_groups(&self, class: &CollisionClass) -> InteractionGroups {
        match class {
            CollisionClass::Channel(channel) => channel_groups(*channel),
            CollisionClass::Profile(name) => {
                self.collision_profiles.get(name).copied().unwrap_or_else(|| {
                    warn!("tether: unknown collision profile '{name}', using default channel");
                    channel_groups(CollisionChannel::default())
                })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SocketLookup
// ---------------------------------------------------------------------------

impl SocketLookup for RapierContext {
    fn socket_transform(&self, target: AttachmentId, socket: Option<&str>) -> Option<Transform> {
        let (handle, offset) = self.socket(target, socket)?;
        let (position, rotation) = self.body_pose(handle)?;
        let scale = self.attachments.get(&target)?.scale;
        Some(Transform {
            translation: position + rotation * offset,
            rotation,
            scale,
        })
    }
}

// ---------------------------------------------------------------------------
// ChainHost
// ---------------------------------------------------------------------------

impl ChainHost for RapierContext {
    fn create_link(&mut self, params: &LinkParams) -> BodyId {
        let builder = if params.simulate_physics {
            RigidBodyBuilder::dynamic()
        } else {
            RigidBodyBuilder::kinematic_position_based()
        };
        let mut body = builder
            .translation(params.relative_transform.translation)
            .linear_damping(params.linear_damping)
            .angular_damping(params.angular_damping)
            .can_sleep(false)
            .additional_mass_properties(MassProperties::new(
                Vec3::ZERO,
                params.mass,
                rod_inertia(params.mass, params.half_length, params.radius),
            ))
            .build();
        body.set_rotation(params.relative_transform.rotation, true);
        let handle = self.rigid_body_set.insert(body);

        let collider = ColliderBuilder::capsule_x(params.half_length, params.radius)
            .density(0.0)
            .collision_groups(self.collision_groups(&params.collision))
            .enabled(params.collision_enabled)
            .build();
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);

        let id = BodyId(self.next_id());
        self.links.insert(
            id,
            LinkInfo {
                handle,
                params: params.clone(),
                scale: params.relative_transform.scale,
                attachment: None,
            },
        );
        id
    }

    fn destroy_link(&mut self, body: BodyId) {
        let Some(info) = self.links.remove(&body) else {
            return;
        };
        // Removes the colliders and every joint attached to the body.
        self.rigid_body_set.remove(
            info.handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }

    fn create_joint(&mut self, parent: BodyId, child: BodyId, params: &JointParams) -> JointId {
        let id = JointId(self.next_id());
        let handle = match (self.body_handle(parent), self.body_handle(child)) {
            (Some(p), Some(c)) => Some(self.impulse_joint_set.insert(p, c, chain_joint(params), true)),
            _ => {
                warn!("tether: joint {id} between unknown bodies {parent} and {child}");
                None
            }
        };
        self.joints.insert(
            id,
            JointInfo {
                handle,
                parent,
                child,
                params: params.clone(),
            },
        );
        id
    }

    fn destroy_joint(&mut self, joint: JointId) {
        self.remove_joint_constraint(joint);
        self.joints.remove(&joint);
    }

    fn break_joint(&mut self, joint: JointId) {
        self.remove_joint_constraint(joint);
    }

    fn is_joint_broken(&self, joint: JointId) -> bool {
        self.joints.get(&joint).is_some_and(JointInfo::is_broken)
    }

    fn link_transform(&self, body: BodyId) -> Option<Transform> {
        let info = self.links.get(&body)?;
        let (translation, rotation) = self.body_pose(info.handle)?;
        Some(Transform {
            translation,
            rotation,
            scale: info.scale,
        })
    }

    fn set_link_world_position(&mut self, body: BodyId, position: Vec3) {
        let Some(handle) = self.body_handle(body) else {
            return;
        };
        if let Some(rb) = self.rigid_body_set.get_mut(handle) {
            rb.set_translation(position, true);
            rb.set_linvel(Vec3::ZERO, true);
        }
    }

    fn set_link_world_pose(&mut self, body: BodyId, position: Vec3, rotation: Quat) {
        let Some(handle) = self.body_handle(body) else {
            return;
        };
        if let Some(rb) = self.rigid_body_set.get_mut(handle) {
            rb.set_translation(position, true);
            rb.set_rotation(rotation, true);
            rb.set_linvel(Vec3::ZERO, true);
            rb.set_angvel(Vec3::ZERO, true);
        }
    }

    fn exclude_mutual_collisions(&mut self, links: &[BodyId]) {
        let Some(first) = links.first() else {
            return;
        };
        // Link ids start at 1, so the tag is never the untagged 0.
        let tag = u128::from(first.0);
        for link in links {
            let Some(handle) = self.body_handle(*link) else {
                continue;
            };
            let Some(body) = self.rigid_body_set.get(handle) else {
                continue;
            };
            for collider in body.colliders() {
                if let Some(collider) = self.collider_set.get_mut(*collider) {
                    let hooks = collider.active_hooks() | ActiveHooks::FILTER_CONTACT_PAIRS;
                    collider.user_data = tag;
                    collider.set_active_hooks(hooks);
                }
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
        let Some((anchor_handle, offset)) = self.socket(target, socket) else {
            return false;
        };
        let Some(link_handle) = self.body_handle(body) else {
            return false;
        };
        let Some((anchor_pos, anchor_rot)) = self.body_pose(anchor_handle) else {
            return false;
        };

        // Replace any previous attachment of this link.
        if let Some((_, _, old)) = self.links.get_mut(&body).and_then(|l| l.attachment.take()) {
            self.impulse_joint_set.remove(old, true);
        }

        let joint: GenericJoint = match rule {
            AttachRule::SnapToTarget => {
                let scale = self.attachments.get(&target).map_or(Vec3::ONE, |a| a.scale);
                self.set_link_world_pose(body, anchor_pos + anchor_rot * offset, anchor_rot);
                if let Some(link) = self.links.get_mut(&body) {
                    link.scale = scale;
                }
                FixedJointBuilder::new()
                    .local_anchor1(offset)
                    .local_anchor2(Vec3::ZERO)
                    .build()
                    .into()
            }
            AttachRule::KeepWorldTransform => {
                let link_pos = self
                    .body_pose(link_handle)
                    .map_or(anchor_pos, |(p, _)| p);
                let local = anchor_rot.inverse() * (link_pos - anchor_pos);
                SphericalJointBuilder::new()
                    .local_anchor1(local)
                    .local_anchor2(Vec3::ZERO)
                    .build()
                    .into()
            }
        };

        let handle = self
            .impulse_joint_set
            .insert(anchor_handle, link_handle, joint, true);
        if let Some(link) = self.links.get_mut(&body) {
            link.attachment = Some((target, rule, handle));
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
