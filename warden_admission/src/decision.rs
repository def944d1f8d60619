use serde::{Deserialize, Serialize};

/// The admission outcome of a connection attempt, as it currently stands
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Undecided,
    Allowed,
    /// Refused, with the message to show the connecting player
    Denied(String),
}

impl Verdict {
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied(_))
    }

    pub fn denial_message(&self) -> Option<&str> {
        match self {
            Self::Denied(message) => Some(message),
            Self::Undecided | Self::Allowed => None,
        }
    }
}

/// Who last wrote a [`ConnectionDecision`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WriterId {
    /// The host's initial value
    Host,
    /// A named listener
    Plugin(String),
}

impl WriterId {
    pub fn plugin(name: impl Into<String>) -> Self {
        Self::Plugin(name.into())
    }
}

/// The shared, mutable decision attached to one connection attempt.
///
/// Every listener observing the attempt reads and writes the same decision.
/// Each write records its writer and bumps a revision counter, so that a
/// listener can tell whether anyone else has touched the decision since it
/// last looked, independently of what the verdict happens to contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDecision {
    verdict: Verdict,
    revision: u64,
    last_writer: WriterId,
}

/// A copy of a [`ConnectionDecision`] at one point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionSnapshot {
    pub verdict: Verdict,
    pub revision: u64,
    pub last_writer: WriterId,
}

impl ConnectionDecision {
    /// A decision holding the host's initial verdict
    pub fn new(initial: Verdict) -> Self {
        Self {
            verdict: initial,
            revision: 0,
            last_writer: WriterId::Host,
        }
    }

    /// Connections are allowed unless somebody says otherwise
    pub fn allowed() -> Self {
        Self::new(Verdict::Allowed)
    }

    pub fn verdict(&self) -> &Verdict {
        &self.verdict
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn last_writer(&self) -> &WriterId {
        &self.last_writer
    }

    pub fn set(&mut self, verdict: Verdict, writer: WriterId) {
        tracing::trace!(?verdict, ?writer, revision = self.revision + 1, "Decision updated");
        self.verdict = verdict;
        self.revision += 1;
        self.last_writer = writer;
    }

    pub fn allow(&mut self, writer: WriterId) {
        self.set(Verdict::Allowed, writer);
    }

    pub fn deny(&mut self, message: impl Into<String>, writer: WriterId) {
        self.set(Verdict::Denied(message.into()), writer);
    }

    pub fn snapshot(&self) -> DecisionSnapshot {
        DecisionSnapshot {
            verdict: self.verdict.clone(),
            revision: self.revision,
            last_writer: self.last_writer.clone(),
        }
    }
}

impl Default for ConnectionDecision {
    fn default() -> Self {
        Self::allowed()
    }
}
