//! Chain endpoint anchors.
//!
//! An [`Anchor`] is either a fixed world point or a reference to a named
//! socket on an external attachment. Socket anchors are resolved on demand
//! through a [`SocketLookup`], so an anchor never owns or keeps alive what it
//! points at.

use bevy::prelude::{Transform, Vec3};

use crate::types::AttachmentId;

// ---------------------------------------------------------------------------
// SocketLookup
// ---------------------------------------------------------------------------

/// Read-only access to external attachment poses.
pub trait SocketLookup {
    /// World transform of `socket` on `target`, or of `target` itself when
    /// `socket` is `None`. Returns `None` if the target is unknown.
    fn socket_transform(&self, target: AttachmentId, socket: Option<&str>) -> Option<Transform>;
}

// ---------------------------------------------------------------------------
// Anchor
// ---------------------------------------------------------------------------

/// Binding target for one end of a chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Anchor {
    /// Fixed point in world space.
    World(Vec3),
    /// Socket on an external attachment. `socket: None` uses the
    /// attachment's own origin.
    Socket {
        target: AttachmentId,
        socket: Option<String>,
    },
}

impl Default for Anchor {
    fn default() -> Self {
        Self::World(Vec3::ZERO)
    }
}

impl Anchor {
    pub const fn world(point: Vec3) -> Self {
        Self::World(point)
    }

    pub fn socket(target: AttachmentId, socket: impl Into<String>) -> Self {
        Self::Socket {
            target,
            socket: Some(socket.into()),
        }
    }

    pub const fn attachment(target: AttachmentId) -> Self {
        Self::Socket {
            target,
            socket: None,
        }
    }

    pub const fn is_world(&self) -> bool {
        matches!(self, Self::World(_))
    }

    /// Full world transform of the anchor. World points resolve to an
    /// identity-rotation transform at the point.
    pub fn resolve_transform<L: SocketLookup + ?Sized>(&self, lookup: &L) -> Option<Transform> {
        match self {
            Self::World(point) => Some(Transform::from_translation(*point)),
            Self::Socket { target, socket } => lookup.socket_transform(*target, socket.as_deref()),
        }
    }

    /// World location of the anchor, `None` if its attachment is unknown.
    pub fn resolve<L: SocketLookup + ?Sized>(&self, lookup: &L) -> Option<Vec3> {
        self.resolve_transform(lookup).map(|t| t.translation)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
