use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The player behind a connection attempt
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerIdentity {
    pub uuid: Uuid,
    pub name: String,
}

/// What the punishment registry found for one player and address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PunishmentVerdict {
    /// Nothing prevents this connection
    NoPunishment,
    /// An active punishment applies; `message` is the rendered text to show
    /// the player
    Punished { message: String },
}

/// Reasons a lookup can fail to produce a verdict
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Punishment registry error: {0}")]
    Backend(String),
    #[error("Punishment lookup timed out")]
    TimedOut,
    #[error("Punishment lookup was dropped before completing")]
    Abandoned,
}

/// The resolved value of a [`PendingLookup`](crate::PendingLookup)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Verdict(PunishmentVerdict),
    Failed(LookupError),
}

impl From<PunishmentVerdict> for LookupOutcome {
    fn from(verdict: PunishmentVerdict) -> Self {
        Self::Verdict(verdict)
    }
}

impl From<LookupError> for LookupOutcome {
    fn from(error: LookupError) -> Self {
        Self::Failed(error)
    }
}
