//! Bevy resource wrapping all Rapier3D physics pipeline state.

use std::collections::HashMap;

use bevy::prelude::{Quat, Resource, Transform, Vec3};
use rapier3d::prelude::{
    CCDSolver, ColliderSet, DefaultBroadPhase, Group, ImpulseJointHandle, ImpulseJointSet,
    IntegrationParameters, InteractionGroups, InteractionTestMode, IslandManager,
    MultibodyJointSet, NarrowPhase, PairFilterContext, PhysicsHooks, PhysicsPipeline,
    RigidBodyBuilder, RigidBodyHandle, RigidBodySet, SolverFlags,
};

use tether_core::config::PhysicsConfig;
use tether_core::profile::CollisionChannel;
use tether_core::types::{AttachmentId, BodyId, JointId};

use crate::host::{AttachRule, JointParams, LinkParams};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A chain link body and what it was created from.
pub struct LinkInfo {
    pub handle: RigidBodyHandle,
    pub params: LinkParams,
    /// Rapier bodies carry no scale; kept for rendering.
    pub scale: Vec3,
    /// Joint holding this link to an attachment, if any.
    pub attachment: Option<(AttachmentId, AttachRule, ImpulseJointHandle)>,
}

/// Per-joint metadata stored alongside the rapier handle.
pub struct JointInfo {
    /// `None` once broken: the rapier joint has been removed.
    pub handle: Option<ImpulseJointHandle>,
    pub parent: BodyId,
    pub child: BodyId,
    pub params: JointParams,
}

impl JointInfo {
    pub fn is_broken(&self) -> bool {
        self.handle.is_none()
    }
}

/// An external attachment body and its named socket offsets.
pub struct AttachmentInfo {
    pub handle: RigidBodyHandle,
    pub scale: Vec3,
    /// Socket name → offset in the attachment's local frame.
    pub sockets: HashMap<String, Vec3>,
}

// ---------------------------------------------------------------------------
// RapierContext
// ---------------------------------------------------------------------------

/// All rapier state in a single Bevy resource.
///
/// `PhysicsPipeline::step()` requires mutable access to every set
/// simultaneously, so they must all live together.
#[derive(Resource)]
pub struct RapierContext {
    // -- Rapier sets --
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,

    // -- Pipeline objects --
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub ccd_solver: CCDSolver,

    // -- Parameters --
    pub integration_parameters: IntegrationParameters,
    pub gravity: Vec3,
    /// Number of physics substeps per frame.
    pub substeps: usize,

    // -- Handle mappings --
    pub links: HashMap<BodyId, LinkInfo>,
    pub joints: HashMap<JointId, JointInfo>,
    pub attachments: HashMap<AttachmentId, AttachmentInfo>,
    /// Named collision profiles → interaction groups.
    pub collision_profiles: HashMap<String, InteractionGroups>,

    next_id: u64,
}

impl RapierContext {
    /// Create a new context with given gravity, substep timestep, and
    /// substep count.
    pub fn new(gravity: Vec3, dt: f32, substeps: usize) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = dt;

        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            ccd_solver: CCDSolver::new(),
            integration_parameters,
            gravity,
            substeps,
            links: HashMap::new(),
            joints: HashMap::new(),
            attachments: HashMap::new(),
            collision_profiles: HashMap::new(),
            next_id: 0,
        }
    }

    /// Context configured from a [`PhysicsConfig`].
    pub fn from_config(config: &PhysicsConfig) -> Self {
        Self::new(
            config.gravity_vec(),
            config.substep_dt(),
            config.substeps.max(1) as usize,
        )
    }

    pub(crate) fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn body_handle(&self, body: BodyId) -> Option<RigidBodyHandle> {
        self.links.get(&body).map(|l| l.handle)
    }

    /// Register a named collision profile usable from chain profiles.
    pub fn register_collision_profile(&mut self, name: impl Into<String>, groups: InteractionGroups) {
        self.collision_profiles.insert(name.into(), groups);
    }

    // -- attachments --------------------------------------------------------

    /// Register an external attachment as a kinematic body at `transform`.
    /// Re-registering an id moves the existing body.
    pub fn register_attachment(&mut self, id: AttachmentId, transform: Transform) {
        if self.attachments.contains_key(&id) {
            self.set_attachment_transform(id, transform);
            return;
        }
        let mut body = RigidBodyBuilder::kinematic_position_based()
            .translation(transform.translation)
            .build();
        body.set_rotation(transform.rotation, true);
        let handle = self.rigid_body_set.insert(body);
        self.attachments.insert(
            id,
            AttachmentInfo {
                handle,
                scale: transform.scale,
                sockets: HashMap::new(),
            },
        );
    }

    /// Move an attachment. Attached links follow on the next step.
    pub fn set_attachment_transform(&mut self, id: AttachmentId, transform: Transform) {
        let Some(info) = self.attachments.get_mut(&id) else {
            return;
        };
        info.scale = transform.scale;
        if let Some(body) = self.rigid_body_set.get_mut(info.handle) {
            body.set_translation(transform.translation, true);
            body.set_rotation(transform.rotation, true);
        }
    }

    /// Add a socket at `offset` in the attachment's local frame.
    pub fn add_socket(&mut self, id: AttachmentId, name: &str, offset: Vec3) -> bool {
        let Some(info) = self.attachments.get_mut(&id) else {
            return false;
        };
        info.sockets.insert(name.to_owned(), offset);
        true
    }

    /// Attachment body handle and socket offset.
    pub(crate) fn socket(
        &self,
        target: AttachmentId,
        socket: Option<&str>,
    ) -> Option<(RigidBodyHandle, Vec3)> {
        let info = self.attachments.get(&target)?;
        let offset = match socket {
            None => Vec3::ZERO,
            Some(name) => *info.sockets.get(name)?,
        };
        Some((info.handle, offset))
    }

    pub(crate) fn body_pose(&self, handle: RigidBodyHandle) -> Option<(Vec3, Quat)> {
        let body = self.rigid_body_set.get(handle)?;
        let pose = body.position();
        Some((pose.translation, pose.rotation))
    }

    // -- stepping -----------------------------------------------------------

    /// Run one physics substep.
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            &ChainContactFilter,
            &(),
        );
    }

    /// Run every substep of one frame.
    pub fn step_frame(&mut self) {
        for _ in 0..self.substeps {
            self.step();
        }
    }

    /// Estimated `(force, torque)` load on an intact joint.
    ///
    /// Joints are spring-driven, so the load is the spring's stiffness times
    /// the anchor separation (force) and times the relative rotation angle
    /// (torque).
    pub fn joint_load(&self, joint: JointId) -> Option<(f32, f32)> {
        let info = self.joints.get(&joint)?;
        if info.is_broken() {
            return None;
        }
        let parent = self.body_pose(self.links.get(&info.parent)?.handle)?;
        let child = self.body_pose(self.links.get(&info.child)?.handle)?;

        let offset = Vec3::X * info.params.anchor_offset;
        let parent_anchor = parent.0 + parent.1 * offset;
        let child_anchor = child.0 + child.1 * -offset;
        let separation = parent_anchor.distance(child_anchor);
        let angle = parent.1.angle_between(child.1);

        Some((
            info.params.linear_stiffness * separation,
            info.params.angular_stiffness * angle,
        ))
    }

    /// Break every joint whose estimated load exceeds a non-zero threshold.
    /// Returns the joints broken by this call.
    pub fn apply_breakage(&mut self) -> Vec<JointId> {
        let mut exceeded: Vec<JointId> = self
            .joints
            .iter()
            .filter(|(_, info)| !info.is_broken() && info.params.is_breakable())
            .filter_map(|(&id, info)| {
                let (force, torque) = self.joint_load(id)?;
                let p = &info.params;
                let over_force = p.break_force > 0.0 && force > p.break_force;
                let over_torque = p.break_torque > 0.0 && torque > p.break_torque;
                (over_force || over_torque).then_some(id)
            })
            .collect();
        exceeded.sort_unstable();

        for id in &exceeded {
            self.remove_joint_constraint(*id);
        }
        exceeded
    }

    /// Remove the rapier joint but keep the record, marked broken.
    pub(crate) fn remove_joint_constraint(&mut self, joint: JointId) {
        let Some(info) = self.joints.get_mut(&joint) else {
            return;
        };
        if let Some(handle) = info.handle.take() {
            self.impulse_joint_set.remove(handle, true);
        }
    }
}

// ---------------------------------------------------------------------------
// Contact filtering
// ---------------------------------------------------------------------------

/// Drops contacts between colliders carrying the same non-zero chain tag in
/// `user_data`. Only colliders with `FILTER_CONTACT_PAIRS` hooks reach it.
pub struct ChainContactFilter;

impl PhysicsHooks for ChainContactFilter {
    fn filter_contact_pair(&self, context: &PairFilterContext) -> Option<SolverFlags> {
        let tag = |handle| context.colliders.get(handle).map_or(0, |c| c.user_data);
        let (a, b) = (tag(context.collider1), tag(context.collider2));
        if a != 0 && a == b {
            None
        } else {
            Some(SolverFlags::COMPUTE_IMPULSES)
        }
    }
}

// ---------------------------------------------------------------------------
// Interaction groups
// ---------------------------------------------------------------------------

/// Groups for a link on `channel`: member of its channel, colliding with
/// everything.
pub fn channel_groups(channel: CollisionChannel) -> InteractionGroups {
    InteractionGroups::new(
        Group::from_bits_truncate(1 << channel.bit()),
        Group::ALL,
        InteractionTestMode::And,
    )
}
