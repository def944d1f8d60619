use crate::ConnectionDecision;
use warden_enforcement::PlayerIdentity;

use std::{
    net::IpAddr,
    sync::atomic::{AtomicU64, Ordering},
};

/// Identifies one connection attempt for as long as the host is processing it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttemptId(pub u64);

impl std::fmt::Display for AttemptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "attempt {}", self.0)
    }
}

/// Hands out attempt IDs that are unique for the lifetime of the generator
#[derive(Debug, Default)]
pub struct AttemptIdGenerator {
    next: AtomicU64,
}

impl AttemptIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> AttemptId {
        AttemptId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// A connection attempt, as seen by admission listeners
#[derive(Debug, Clone)]
pub struct AdmissionEvent {
    pub attempt: AttemptId,
    pub player: PlayerIdentity,
    pub address: IpAddr,
    pub decision: ConnectionDecision,
}

impl AdmissionEvent {
    /// A new attempt, allowed until somebody decides otherwise
    pub fn new(attempt: AttemptId, player: PlayerIdentity, address: IpAddr) -> Self {
        Self {
            attempt,
            player,
            address,
            decision: ConnectionDecision::allowed(),
        }
    }
}
