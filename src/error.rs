//! Reconciliation errors.
//!
//! The engine has no failure modes of its own beyond programming errors, which
//! panic. Everything recoverable comes from the host backend and is passed
//! through with the operation that failed.

use std::fmt;

use thiserror::Error;

/// Host backend operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCall {
    CreateNode,
    ApplyPatch,
    AppendChild,
    RemoveChild,
}

impl fmt::Display for HostCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HostCall::CreateNode => "create node",
            HostCall::ApplyPatch => "apply patch",
            HostCall::AppendChild => "append child",
            HostCall::RemoveChild => "remove child",
        })
    }
}

/// A host failure that invalidated the cycle in flight.
///
/// The cycle is abandoned and never committed; the last committed tree stays
/// the baseline.
#[derive(Debug, Error)]
#[error("host backend failed to {call}")]
pub struct ReconcileError<E: std::error::Error + 'static> {
    pub call: HostCall,
    #[source]
    pub source: E,
}

impl<E: std::error::Error + 'static> ReconcileError<E> {
    pub fn new(call: HostCall, source: E) -> Self {
        Self { call, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{MemoryHostError, NodeId};
    use std::error::Error as _;

    #[test]
    fn test_error_message_and_source() {
        let err = ReconcileError::new(
            HostCall::RemoveChild,
            MemoryHostError::NotAChild {
                parent: NodeId(0),
                child: NodeId(3),
            },
        );

        assert_eq!(err.to_string(), "host backend failed to remove child");
        assert_eq!(
            err.source().map(|s| s.to_string()).as_deref(),
            Some("node NodeId(3) is not a child of NodeId(0)")
        );
    }
}
