use crate::{AdmissionEvent, AdmissionListener, Verdict};

use std::{fmt, sync::Arc};

/// What to tell a refused player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenialNotice {
    pub message: String,
}

impl DenialNotice {
    /// The notice for a final verdict, if it refuses the connection.
    /// Undecided attempts are admitted.
    pub fn from_verdict(verdict: &Verdict) -> Option<Self> {
        verdict.denial_message().map(|message| Self {
            message: message.to_string(),
        })
    }
}

impl fmt::Display for DenialNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Runs connection attempts through a fixed set of listeners, the way a host
/// would: every `early` handler in registration order, then every `late`
/// handler in the same order.
#[derive(Default)]
pub struct AdmissionPipeline {
    listeners: Vec<Arc<dyn AdmissionListener>>,
}

impl AdmissionPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, listener: Arc<dyn AdmissionListener>) {
        tracing::debug!(listener = listener.name(), "Registered admission listener");
        self.listeners.push(listener);
    }

    pub fn listener_names(&self) -> impl Iterator<Item = &str> {
        self.listeners.iter().map(|l| l.name())
    }

    /// Process one attempt to completion. Returns the notice to deliver if
    /// the connection was refused.
    #[tracing::instrument(skip_all, fields(attempt = %event.attempt))]
    pub async fn run(&self, event: &mut AdmissionEvent) -> Option<DenialNotice> {
        for listener in &self.listeners {
            listener.early(event).await;
        }
        for listener in &self.listeners {
            listener.late(event).await;
        }

        let notice = DenialNotice::from_verdict(event.decision.verdict());
        match &notice {
            Some(notice) => tracing::info!(player = ?event.player, %notice, "Connection refused"),
            None => tracing::debug!(player = ?event.player, "Connection admitted"),
        }
        notice
    }
}
