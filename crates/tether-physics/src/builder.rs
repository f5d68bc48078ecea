//! Chain construction: `N` link bodies and `N - 1` joints from a profile.
//!
//! Joint `i` always connects link `i` to link `i + 1`. The builder maps the
//! profile's physics and constraint settings onto [`LinkParams`] and
//! [`JointParams`] and hands them to the host; it never positions links
//! (see [`crate::binder`]).

use bevy::log::debug;

use tether_core::lod::LodSelection;
use tether_core::profile::{ChainProfile, clamp_segment_count};
use tether_core::types::{BodyId, JointId};

use crate::host::{AxisLimit, ChainHost, JointParams, LinkParams};

// ---------------------------------------------------------------------------
// BuiltChain
// ---------------------------------------------------------------------------

/// The bodies and joints of one build, in chain order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuiltChain {
    pub links: Vec<BodyId>,
    /// `joints[i]` connects `links[i]` and `links[i + 1]`.
    pub joints: Vec<JointId>,
}

impl BuiltChain {
    pub fn segment_count(&self) -> usize {
        self.links.len()
    }
}

// ---------------------------------------------------------------------------
// ChainBuilder
// ---------------------------------------------------------------------------

/// Maps a profile onto link and joint parameters for one build.
#[derive(Debug, Clone)]
pub struct ChainBuilder<'a> {
    profile: &'a ChainProfile,
    segment_count: usize,
    length: f32,
    simulate_physics: bool,
    enable_collisions: bool,
}

impl<'a> ChainBuilder<'a> {
    /// Builder for `segment_count` links at the profile's base length.
    /// The count is clamped to `2..=MAX_SEGMENT_COUNT`.
    pub fn new(profile: &'a ChainProfile, segment_count: usize) -> Self {
        Self {
            profile,
            segment_count: clamp_segment_count(segment_count),
            length: profile.base_length(),
            simulate_physics: true,
            enable_collisions: true,
        }
    }

    /// Override the total chain length (clamped to at least 1).
    #[must_use]
    pub fn with_length(mut self, length: f32) -> Self {
        self.length = length.max(1.0);
        self
    }

    /// Apply the simulate/collision flags of a LOD selection.
    #[must_use]
    pub fn with_lod(mut self, lod: &LodSelection) -> Self {
        self.simulate_physics = lod.simulate_physics;
        self.enable_collisions = lod.enable_collisions;
        self
    }

    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    /// Distance between adjacent link centers.
    #[allow(clippy::cast_precision_loss)]
    pub fn spacing(&self) -> f32 {
        self.length / self.segment_count as f32
    }

    pub fn link_params(&self, index: usize) -> LinkParams {
        let vis = &self.profile.visual;
        let phys = &self.profile.physics;
        LinkParams {
            index,
            mesh: vis.link_mesh.clone(),
            relative_transform: vis.link_relative_transform.to_transform(),
            simulate_physics: self.simulate_physics,
            mass: phys.link_mass,
            linear_damping: phys.linear_damping,
            angular_damping: phys.angular_damping,
            collision: phys.collision_class(),
            collision_enabled: self.enable_collisions,
            visible: true,
            half_length: self.spacing() * 0.5,
            radius: phys.link_radius,
        }
    }

    pub fn joint_params(&self) -> JointParams {
        let c = &self.profile.constraint;
        let swing = if c.enable_swing {
            AxisLimit::Limited(c.max_swing_angle)
        } else {
            AxisLimit::Free
        };
        let twist = if c.enable_twist {
            AxisLimit::Limited(c.max_twist_angle)
        } else {
            AxisLimit::Free
        };
        let linear = if c.linear_limit > 0.0 {
            AxisLimit::Limited(c.linear_limit)
        } else {
            AxisLimit::Free
        };

        JointParams {
            swing1: swing,
            swing2: swing,
            twist,
            linear: [linear; 3],
            linear_stiffness: c.linear_stiffness,
            angular_stiffness: c.angular_stiffness,
            break_force: c.break_force,
            break_torque: c.break_torque,
            anchor_offset: self.spacing() * 0.5,
            contacts_enabled: self.profile.physics.enable_self_collision,
        }
    }

    /// Create every link, then every joint, in the host.
    pub fn build<H: ChainHost + ?Sized>(&self, host: &mut H) -> BuiltChain {
        let links: Vec<BodyId> = (0..self.segment_count)
            .map(|i| host.create_link(&self.link_params(i)))
            .collect();
        if !self.profile.physics.enable_self_collision {
            host.exclude_mutual_collisions(&links);
        }

        let joint_params = self.joint_params();
        let joints = links
            .windows(2)
            .map(|pair| host.create_joint(pair[0], pair[1], &joint_params))
            .collect();

        debug!(
            "tether: built chain '{}' with {} links",
            self.profile.name, self.segment_count
        );

        BuiltChain { links, joints }
    }
}

/// Build a chain of `segment_count` links from `profile`.
///
/// A missing profile means "no chain": nothing is created and `None` is
/// returned.
pub fn build_chain<H: ChainHost + ?Sized>(
    host: &mut H,
    profile: Option<&ChainProfile>,
    segment_count: usize,
) -> Option<BuiltChain> {
    let profile = profile?;
    Some(ChainBuilder::new(profile, segment_count).build(host))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
