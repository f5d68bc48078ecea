//! Endpoint binding and rest-pose layout.
//!
//! Link 0 establishes the chain's root pose and snaps onto its anchor. The
//! tail is bound only when the chain has no loose end, and then keeps its
//! current world transform so it does not jump when first attached.

use bevy::log::{debug, warn};
use bevy::prelude::{Quat, Vec3};

use tether_core::anchor::Anchor;
use tether_core::types::BodyId;

use crate::host::{AttachRule, ChainHost};

// ---------------------------------------------------------------------------
// Binding
// ---------------------------------------------------------------------------

/// Bind the chain's endpoints to `start` and `end`.
///
/// No-op for an empty chain. Anchors whose attachment cannot be found leave
/// their link untouched.
pub fn bind_anchors<H: ChainHost + ?Sized>(
    host: &mut H,
    links: &[BodyId],
    start: &Anchor,
    end: &Anchor,
    supports_loose_end: bool,
) {
    let (Some(&first), Some(&last)) = (links.first(), links.last()) else {
        return;
    };

    bind_one(host, first, start, AttachRule::SnapToTarget);

    if supports_loose_end {
        debug!("tether: tail {last} left loose");
        return;
    }
    bind_one(host, last, end, AttachRule::KeepWorldTransform);
}

fn bind_one<H: ChainHost + ?Sized>(host: &mut H, link: BodyId, anchor: &Anchor, rule: AttachRule) {
    match anchor {
        Anchor::World(point) => host.set_link_world_position(link, *point),
        Anchor::Socket { target, socket } => {
            if !host.attach_link(link, *target, socket.as_deref(), rule) {
                warn!(
                    "tether: cannot bind {link} to {target} socket {:?}",
                    socket.as_deref().unwrap_or("<origin>")
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Rest pose
// ---------------------------------------------------------------------------

/// Unit direction the chain is laid out along: towards `end` when it is
/// known and distinct from `start`, otherwise +X.
pub fn rest_direction(start: Vec3, end: Option<Vec3>) -> Vec3 {
    end.and_then(|end| (end - start).try_normalize()).unwrap_or(Vec3::X)
}

/// Rest-pose world position of every link.
///
/// Links run from `start` towards `end`, `spacing` apart, so adjacent joint
/// anchors coincide. The end point only gives the direction: binding the
/// tail afterwards is what pins it to the end anchor.
#[allow(clippy::cast_precision_loss)]
pub fn rest_positions(start: Vec3, end: Option<Vec3>, count: usize, spacing: f32) -> Vec<Vec3> {
    let direction = rest_direction(start, end);
    (0..count)
        .map(|i| start + direction * spacing * i as f32)
        .collect()
}

/// Place `links` in their rest pose, each link's +X axis pointing down the
/// chain.
pub fn layout_rest_pose<H: ChainHost + ?Sized>(
    host: &mut H,
    links: &[BodyId],
    start: Vec3,
    end: Option<Vec3>,
    spacing: f32,
) {
    let positions = rest_positions(start, end, links.len(), spacing);
    let rotation = Quat::from_rotation_arc(Vec3::X, rest_direction(start, end));

    for (link, position) in links.iter().zip(positions) {
        host.set_link_world_pose(*link, position, rotation);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
