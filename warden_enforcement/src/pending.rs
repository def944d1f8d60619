use crate::{LookupError, LookupOutcome};

use tokio::sync::oneshot;

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

/// Handle to a punishment lookup that is already running.
///
/// Awaiting it yields the lookup's [`LookupOutcome`]. If whatever was meant to
/// produce the outcome goes away without doing so, the handle resolves to
/// [`LookupError::Abandoned`] instead of hanging. Dropping the handle without
/// awaiting it is fine; the result is simply discarded.
#[derive(Debug)]
pub struct PendingLookup {
    receiver: oneshot::Receiver<LookupOutcome>,
}

/// The producing half of a [`PendingLookup`]
#[derive(Debug)]
pub struct LookupResolver {
    sender: oneshot::Sender<LookupOutcome>,
}

impl PendingLookup {
    /// Create a connected resolver and handle
    pub fn channel() -> (LookupResolver, Self) {
        let (sender, receiver) = oneshot::channel();
        (LookupResolver { sender }, Self { receiver })
    }

    /// A handle that has already resolved to `outcome`
    pub fn ready(outcome: impl Into<LookupOutcome>) -> Self {
        let (resolver, lookup) = Self::channel();
        resolver.resolve(outcome);
        lookup
    }
}

impl LookupResolver {
    /// Deliver the outcome. Returns false if the handle was already dropped,
    /// in which case nobody is interested any more.
    pub fn resolve(self, outcome: impl Into<LookupOutcome>) -> bool {
        self.sender.send(outcome.into()).is_ok()
    }
}

impl Future for PendingLookup {
    type Output = LookupOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|result| result.unwrap_or(LookupOutcome::Failed(LookupError::Abandoned)))
    }
}
