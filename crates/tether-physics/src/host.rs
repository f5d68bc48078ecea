//! The interface a chain needs from its physics host.
//!
//! Any engine (rapier3d, a bookkeeping server host, a game engine binding)
//! implements [`ChainHost`]. The chain core only creates, configures,
//! positions, attaches and destroys bodies and joints through it, and only
//! ever holds the opaque [`BodyId`] / [`JointId`] handles it returns.

use bevy::prelude::{Quat, Transform, Vec3};

use tether_core::anchor::SocketLookup;
use tether_core::profile::CollisionClass;
use tether_core::types::{AttachmentId, BodyId, JointId};

// ---------------------------------------------------------------------------
// LinkParams
// ---------------------------------------------------------------------------

/// Everything a host needs to create one link body.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkParams {
    /// Position of this link in the chain, `0` = root.
    pub index: usize,
    pub mesh: Option<String>,
    pub relative_transform: Transform,
    /// `false` = kinematic (LOD with simulation disabled).
    pub simulate_physics: bool,
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub collision: CollisionClass,
    /// Query and physics collision response. `false` = no collision at all.
    pub collision_enabled: bool,
    pub visible: bool,
    /// Half the link's length along its local +X axis.
    pub half_length: f32,
    pub radius: f32,
}

// ---------------------------------------------------------------------------
// JointParams
// ---------------------------------------------------------------------------

/// Motion allowed on one joint axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AxisLimit {
    Free,
    /// Symmetric bound: degrees for angular axes, world units for linear.
    Limited(f32),
}

impl AxisLimit {
    pub const fn is_limited(self) -> bool {
        matches!(self, Self::Limited(_))
    }
}

/// Configuration of one joint between two adjacent links.
///
/// The joint sits halfway between the two link centers: `anchor_offset`
/// along the parent's +X and the same distance along the child's -X.
#[derive(Debug, Clone, PartialEq)]
pub struct JointParams {
    pub swing1: AxisLimit,
    pub swing2: AxisLimit,
    pub twist: AxisLimit,
    /// X, Y, Z.
    pub linear: [AxisLimit; 3],
    /// Spring-only drive: zero damping, zero target.
    pub linear_stiffness: f32,
    pub angular_stiffness: f32,
    /// `0` = never breaks.
    pub break_force: f32,
    /// `0` = never breaks.
    pub break_torque: f32,
    pub anchor_offset: f32,
    /// Whether the two connected links collide with each other.
    pub contacts_enabled: bool,
}

impl JointParams {
    pub fn is_breakable(&self) -> bool {
        self.break_force > 0.0 || self.break_torque > 0.0
    }
}

// ---------------------------------------------------------------------------
// AttachRule
// ---------------------------------------------------------------------------

/// How a link is attached to an external attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachRule {
    /// Move the link onto the target (location, rotation and scale), then
    /// hold it there rigidly.
    SnapToTarget,
    /// Hold the link where it currently is, relative to the target.
    KeepWorldTransform,
}

// ---------------------------------------------------------------------------
// ChainHost
// ---------------------------------------------------------------------------

/// Body, joint and attachment services a chain needs from its host.
///
/// Calls with an unknown handle must be ignored, never panic.
pub trait ChainHost: SocketLookup {
    fn create_link(&mut self, params: &LinkParams) -> BodyId;

    fn destroy_link(&mut self, body: BodyId);

    /// Connect `parent` and `child` as whole bodies.
    fn create_joint(&mut self, parent: BodyId, child: BodyId, params: &JointParams) -> JointId;

    fn destroy_joint(&mut self, joint: JointId);

    /// Force the joint to fail. Breaking a broken joint is a no-op.
    fn break_joint(&mut self, joint: JointId);

    fn is_joint_broken(&self, joint: JointId) -> bool;

    fn link_transform(&self, body: BodyId) -> Option<Transform>;

    fn set_link_world_position(&mut self, body: BodyId, position: Vec3);

    fn set_link_world_pose(&mut self, body: BodyId, position: Vec3, rotation: Quat);

    /// Stop `links` colliding with one another. Their collisions with every
    /// other body are unchanged.
    fn exclude_mutual_collisions(&mut self, links: &[BodyId]);

    /// Attach `body` to `socket` on `target`. Returns `false` if the target
    /// or socket is unknown, leaving the body untouched.
    fn attach_link(
        &mut self,
        body: BodyId,
        target: AttachmentId,
        socket: Option<&str>,
        rule: AttachRule,
    ) -> bool;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
