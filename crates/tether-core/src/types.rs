//! Opaque handles shared between the chain core and its physics host.
//!
//! The core never owns what these refer to. A host hands them out when it
//! creates a body or joint and accepts them back for every later call.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// BodyId
// ---------------------------------------------------------------------------

/// Handle to one rigid link body living in the physics host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u64);

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// JointId
// ---------------------------------------------------------------------------

/// Handle to one two-body joint living in the physics host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JointId(pub u64);

impl std::fmt::Display for JointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "joint#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// AttachmentId
// ---------------------------------------------------------------------------

/// Handle to an external attachable object (a character hand, a hook, a
/// wall ring). Chains only look these up; they never destroy them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttachmentId(pub u64);

impl std::fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "attachment#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_display() {
        assert_eq!(BodyId(3).to_string(), "body#3");
        assert_eq!(JointId(0).to_string(), "joint#0");
        assert_eq!(AttachmentId(12).to_string(), "attachment#12");
    }

    #[test]
    fn handles_order_by_value() {
        let mut ids = vec![BodyId(4), BodyId(1), BodyId(2)];
        ids.sort();
        assert_eq!(ids, vec![BodyId(1), BodyId(2), BodyId(4)]);
    }

    #[test]
    fn handle_json_is_transparent_number() {
        let json = serde_json::to_string(&JointId(7)).unwrap();
        assert_eq!(json, "7");
    }
}
