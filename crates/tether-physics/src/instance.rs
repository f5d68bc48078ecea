//! [`ChainInstance`]: the runtime owner of one chain's links and joints.
//!
//! A rebuild is always clear, build, lay out, bind, run synchronously to
//! completion. Afterwards either `links.len() == segment_count` and
//! `joints.len() == segment_count - 1`, or both are empty.
//!
//! Only an authoritative instance mutates physical state. Observers keep the
//! configuration they are given (anchors, target length, observer distance)
//! but never create, break or move bodies.

use std::fmt;
use std::sync::Arc;

use bevy::log::{debug, warn};

use tether_core::anchor::Anchor;
use tether_core::lod::{LodSelection, select_lod};
use tether_core::network::ReplicationPlan;
use tether_core::profile::{ChainProfile, clamp_segment_count};
use tether_core::types::{BodyId, JointId};

use crate::binder::{bind_anchors, layout_rest_pose};
use crate::builder::ChainBuilder;
use crate::host::ChainHost;

// ---------------------------------------------------------------------------
// Authority
// ---------------------------------------------------------------------------

/// Whether this execution context may mutate the chain's physical state.
#[derive(Clone, Default)]
pub enum Authority {
    #[default]
    Authoritative,
    /// Receives replicated state, never builds.
    Observer,
    /// Evaluated on every mutation, e.g. backed by a network session.
    ///
    /// Inside an app, a [`Chain`](crate::components::Chain) spawned while
    /// the predicate is false gets its initial build on the first frame the
    /// predicate turns true.
    Dynamic(Arc<dyn Fn() -> bool + Send + Sync>),
}

impl Authority {
    pub fn dynamic(predicate: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        Self::Dynamic(Arc::new(predicate))
    }

    pub fn is_authoritative(&self) -> bool {
        match self {
            Self::Authoritative => true,
            Self::Observer => false,
            Self::Dynamic(predicate) => predicate(),
        }
    }
}

impl fmt::Debug for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authoritative => f.write_str("Authoritative"),
            Self::Observer => f.write_str("Observer"),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

// ---------------------------------------------------------------------------
// ChainState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ChainState {
    /// No links or joints.
    #[default]
    Empty,
    /// Links and joints exist and are anchored.
    Built,
}

// ---------------------------------------------------------------------------
// ChainInstance
// ---------------------------------------------------------------------------

/// One chain in the world.
///
/// The profile is shared and outlives the instance; links and joints are
/// owned exclusively and released through [`ChainInstance::clear`].
#[derive(Debug, Default)]
pub struct ChainInstance {
    profile: Option<Arc<ChainProfile>>,
    start_anchor: Anchor,
    end_anchor: Anchor,
    auto_rebuild: bool,
    authority: Authority,
    target_length: Option<f32>,
    observer_distance: f32,
    /// LOD the current build was made with.
    active_lod: Option<LodSelection>,
    links: Vec<BodyId>,
    joints: Vec<JointId>,
    state: ChainState,
}

impl ChainInstance {
    /// Authoritative instance with auto-rebuild enabled.
    pub fn new(profile: Arc<ChainProfile>) -> Self {
        Self {
            profile: Some(profile),
            auto_rebuild: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_anchors(mut self, start: Anchor, end: Anchor) -> Self {
        self.start_anchor = start;
        self.end_anchor = end;
        self
    }

    #[must_use]
    pub fn with_auto_rebuild(mut self, auto_rebuild: bool) -> Self {
        self.auto_rebuild = auto_rebuild;
        self
    }

    #[must_use]
    pub fn with_authority(mut self, authority: Authority) -> Self {
        self.authority = authority;
        self
    }

    // -- accessors ----------------------------------------------------------

    pub fn profile(&self) -> Option<&Arc<ChainProfile>> {
        self.profile.as_ref()
    }

    /// Replace the profile. Takes effect at the next rebuild.
    pub fn set_profile(&mut self, profile: Option<Arc<ChainProfile>>) {
        self.profile = profile;
    }

    pub fn start_anchor(&self) -> &Anchor {
        &self.start_anchor
    }

    pub fn end_anchor(&self) -> &Anchor {
        &self.end_anchor
    }

    pub fn auto_rebuild(&self) -> bool {
        self.auto_rebuild
    }

    pub fn set_auto_rebuild(&mut self, auto_rebuild: bool) {
        self.auto_rebuild = auto_rebuild;
    }

    pub fn is_authoritative(&self) -> bool {
        self.authority.is_authoritative()
    }

    pub fn state(&self) -> ChainState {
        self.state
    }

    pub fn is_built(&self) -> bool {
        self.state == ChainState::Built
    }

    /// Number of links currently built, `0` when empty.
    pub fn segment_count(&self) -> usize {
        self.links.len()
    }

    pub fn links(&self) -> &[BodyId] {
        &self.links
    }

    /// `joints()[i]` connects `links()[i]` and `links()[i + 1]`.
    pub fn joints(&self) -> &[JointId] {
        &self.joints
    }

    /// The two links joined by joint `index`.
    pub fn joint_links(&self, index: usize) -> Option<(BodyId, BodyId)> {
        if index >= self.joints.len() {
            return None;
        }
        Some((self.links[index], self.links[index + 1]))
    }

    pub fn target_length(&self) -> Option<f32> {
        self.target_length
    }

    pub fn observer_distance(&self) -> f32 {
        self.observer_distance
    }

    pub fn active_lod(&self) -> Option<&LodSelection> {
        self.active_lod.as_ref()
    }

    /// Fraction of physics steps this chain wants, `1.0` when unbuilt.
    pub fn simulation_rate_factor(&self) -> f32 {
        self.active_lod
            .map_or(1.0, |lod| lod.simulation_rate_factor)
    }

    /// Total length the next build will use.
    pub fn effective_length(&self) -> Option<f32> {
        let profile = self.profile.as_ref()?;
        Some(self.target_length.unwrap_or_else(|| profile.base_length()))
    }

    /// Segment count the next build will use: the LOD count for the current
    /// observer distance, scaled by the target length if one is set, and
    /// clamped to `2..=MAX_SEGMENT_COUNT`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn desired_segment_count(&self) -> Option<usize> {
        let profile = self.profile.as_ref()?;
        let lod_count = select_lod(profile, self.observer_distance).segment_count;
        let count = match self.target_length {
            Some(length) => (lod_count as f32 * length / profile.base_length()).round() as usize,
            None => lod_count,
        };
        Some(clamp_segment_count(count))
    }

    /// Replication hint for the current build, `None` without a profile.
    pub fn replication_plan(&self) -> Option<ReplicationPlan> {
        let profile = self.profile.as_ref()?;
        Some(ReplicationPlan::for_chain(&profile.network, self.links.len()))
    }

    /// Bodies the authoritative side replicates, in chain order.
    pub fn replicated_links(&self) -> Vec<BodyId> {
        self.replication_plan()
            .map(|plan| {
                plan.link_indices
                    .iter()
                    .filter_map(|&i| self.links.get(i).copied())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_link_broken<H: ChainHost + ?Sized>(&self, host: &H, index: usize) -> bool {
        self.joints
            .get(index)
            .is_some_and(|joint| host.is_joint_broken(*joint))
    }

    // -- lifecycle ----------------------------------------------------------

    /// Initial build. No-op without a profile or without authority.
    pub fn initialize_from_profile<H: ChainHost + ?Sized>(&mut self, host: &mut H) -> bool {
        if self.profile.is_none() {
            return false;
        }
        self.rebuild(host)
    }

    /// Tear down and build again from the profile. Returns `true` if the
    /// chain ends up built.
    pub fn rebuild<H: ChainHost + ?Sized>(&mut self, host: &mut H) -> bool {
        if !self.is_authoritative() {
            warn!("tether: rebuild dropped, not authoritative");
            return false;
        }
        self.clear(host);

        let Some(profile) = self.profile.clone() else {
            return false;
        };
        let Some(count) = self.desired_segment_count() else {
            return false;
        };
        let lod = select_lod(&profile, self.observer_distance);
        let length = self
            .effective_length()
            .unwrap_or_else(|| profile.base_length());

        let builder = ChainBuilder::new(&profile, count)
            .with_length(length)
            .with_lod(&lod);
        let built = builder.build(host);

        if profile.use_world_space_rest_pose
            && let Some(start) = self.start_anchor.resolve(host)
        {
            let end = if profile.supports_loose_end {
                None
            } else {
                self.end_anchor.resolve(host)
            };
            layout_rest_pose(host, &built.links, start, end, builder.spacing());
        }

        bind_anchors(
            host,
            &built.links,
            &self.start_anchor,
            &self.end_anchor,
            profile.supports_loose_end,
        );

        self.links = built.links;
        self.joints = built.joints;
        self.active_lod = Some(lod);
        self.state = ChainState::Built;
        debug!(
            "tether: chain '{}' rebuilt with {} links (lod {:?})",
            profile.name,
            self.links.len(),
            lod.index
        );
        true
    }

    /// Destroy all joints, then all links.
    pub fn clear<H: ChainHost + ?Sized>(&mut self, host: &mut H) {
        if self.state == ChainState::Empty && self.links.is_empty() {
            return;
        }
        for joint in self.joints.drain(..) {
            host.destroy_joint(joint);
        }
        for link in self.links.drain(..) {
            host.destroy_link(link);
        }
        self.active_lod = None;
        self.state = ChainState::Empty;
        debug!("tether: chain cleared");
    }

    // -- mutation -----------------------------------------------------------

    pub fn set_start_anchor<H: ChainHost + ?Sized>(&mut self, host: &mut H, anchor: Anchor) {
        self.start_anchor = anchor;
        self.rebuild_if_auto(host);
    }

    pub fn set_end_anchor<H: ChainHost + ?Sized>(&mut self, host: &mut H, anchor: Anchor) {
        self.end_anchor = anchor;
        self.rebuild_if_auto(host);
    }

    fn rebuild_if_auto<H: ChainHost + ?Sized>(&mut self, host: &mut H) {
        if self.auto_rebuild && self.profile.is_some() && self.is_authoritative() {
            self.rebuild(host);
        }
    }

    /// Change the chain's total length, keeping the per-segment length of
    /// the active LOD. No-op unless the profile allows dynamic length.
    pub fn set_target_length<H: ChainHost + ?Sized>(&mut self, host: &mut H, length: f32) {
        let Some(profile) = self.profile.as_ref() else {
            return;
        };
        if !profile.allow_dynamic_length_change {
            debug!(
                "tether: '{}' does not allow dynamic length change",
                profile.name
            );
            return;
        }
        if !length.is_finite() {
            return;
        }
        self.target_length = Some(length.max(1.0));
        self.rebuild_if_built(host);
    }

    /// Return to the profile's length.
    pub fn clear_target_length<H: ChainHost + ?Sized>(&mut self, host: &mut H) {
        if self.target_length.take().is_some() {
            self.rebuild_if_built(host);
        }
    }

    fn rebuild_if_built<H: ChainHost + ?Sized>(&mut self, host: &mut H) {
        if self.is_built() && self.is_authoritative() {
            self.rebuild(host);
        }
    }

    /// Force joint `index` to fail. Out-of-range indices and already broken
    /// joints are ignored; the joint stays in [`ChainInstance::joints`].
    pub fn break_link<H: ChainHost + ?Sized>(&mut self, host: &mut H, index: usize) {
        let Some(&joint) = self.joints.get(index) else {
            return;
        };
        if !self.is_authoritative() {
            warn!("tether: break of joint {index} dropped, not authoritative");
            return;
        }
        if !host.is_joint_broken(joint) {
            host.break_joint(joint);
            debug!("tether: joint {index} ({joint}) broken");
        }
    }

    /// Record the observer distance and rebuild if it selects a different
    /// LOD level or segment count. Returns `true` if a rebuild happened.
    pub fn update_lod<H: ChainHost + ?Sized>(&mut self, host: &mut H, distance: f32) -> bool {
        self.observer_distance = distance.max(0.0);
        let Some(profile) = self.profile.as_ref() else {
            return false;
        };
        let Some(active) = self.active_lod else {
            return false;
        };
        let next = select_lod(profile, self.observer_distance);
        if next.index == active.index && next.segment_count == active.segment_count {
            return false;
        }
        if !self.is_authoritative() {
            return false;
        }
        self.rebuild(host)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
