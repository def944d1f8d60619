//! Defines errors returned by the other modules

use crate::AttemptId;
use thiserror::Error;

/// The host or another component used the gate out of order. These are bugs
/// elsewhere; they are logged and counted, never raised into the host's event
/// pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    #[error("early() called more than once for {0}")]
    DuplicateEarly(AttemptId),
    #[error("late() called for {0} without a preceding early()")]
    LateWithoutEarly(AttemptId),
    #[error("late() called again for {0} after it was already evaluated")]
    AlreadyEvaluated(AttemptId),
}
