//! The two-phase connection gate

use crate::{
    config::{FailurePolicy, GateConfig},
    *,
};
use warden_enforcement::{EnforcementClient, LookupOutcome, PendingLookup, PunishmentVerdict};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::{task::JoinHandle, time::Instant};

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

/// Where a single attempt is in its lifecycle. Transitions only ever move
/// forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AttemptState {
    /// Neither phase has run
    Pending,
    /// The lookup has been started; its result has not been used yet
    EarlyDispatched,
    /// The late phase is waiting on the lookup
    LateEvaluated,
    /// The lookup result has been merged into the decision
    Finalized,
}

/// The early and late handlers bound to one connection attempt, together
/// with what the early phase needs to hand over to the late one.
pub struct AttemptHandlers {
    attempt: AttemptId,
    writer: WriterId,
    failure_policy: FailurePolicy,
    state: AttemptState,
    created_at: Instant,
    at_dispatch: Option<DecisionSnapshot>,
    lookup: Option<PendingLookup>,
}

impl AttemptHandlers {
    pub fn new(attempt: AttemptId, writer: WriterId, failure_policy: FailurePolicy) -> Self {
        Self {
            attempt,
            writer,
            failure_policy,
            state: AttemptState::Pending,
            created_at: Instant::now(),
            at_dispatch: None,
            lookup: None,
        }
    }

    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Start the punishment lookup and return immediately. The decision is
    /// only read, never written, in this phase.
    pub fn early<C>(&mut self, client: &C, event: &AdmissionEvent) -> Result<(), ProtocolViolation>
    where
        C: EnforcementClient + ?Sized,
    {
        if self.state != AttemptState::Pending {
            return Err(ProtocolViolation::DuplicateEarly(self.attempt));
        }

        self.lookup = Some(client.check_connection(&event.player, event.address));
        self.at_dispatch = Some(event.decision.snapshot());
        self.state = AttemptState::EarlyDispatched;

        tracing::debug!(attempt = %self.attempt, player = ?event.player, "Dispatched punishment lookup");
        Ok(())
    }

    /// Wait for the lookup started by [`early`](Self::early) and merge its
    /// result into the decision.
    pub async fn late(&mut self, event: &mut AdmissionEvent) -> Result<(), ProtocolViolation> {
        let (lookup, at_dispatch) = self.begin_late()?;
        let outcome = lookup.await;
        resolve_lookup(
            self.attempt,
            &self.writer,
            &self.failure_policy,
            outcome,
            &at_dispatch,
            event,
        );
        self.finalize();
        Ok(())
    }

    /// Hand over the pending lookup and the dispatch snapshot, moving to
    /// [`AttemptState::LateEvaluated`]. Only allowed once, after `early`.
    fn begin_late(&mut self) -> Result<(PendingLookup, DecisionSnapshot), ProtocolViolation> {
        match self.state {
            AttemptState::Pending => return Err(ProtocolViolation::LateWithoutEarly(self.attempt)),
            AttemptState::LateEvaluated | AttemptState::Finalized => {
                return Err(ProtocolViolation::AlreadyEvaluated(self.attempt))
            }
            AttemptState::EarlyDispatched => {}
        }

        let (Some(lookup), Some(at_dispatch)) = (self.lookup.take(), self.at_dispatch.take())
        else {
            return Err(ProtocolViolation::LateWithoutEarly(self.attempt));
        };

        self.state = AttemptState::LateEvaluated;
        Ok((lookup, at_dispatch))
    }

    fn finalize(&mut self) {
        self.state = AttemptState::Finalized;
    }
}

/// Apply the failure policy to a finished lookup and merge the result into
/// the event's decision
fn resolve_lookup(
    attempt: AttemptId,
    writer: &WriterId,
    failure_policy: &FailurePolicy,
    outcome: LookupOutcome,
    at_dispatch: &DecisionSnapshot,
    event: &mut AdmissionEvent,
) {
    let verdict = apply_failure_policy(attempt, failure_policy, outcome);

    match merge(at_dispatch, &event.decision.snapshot(), writer, &verdict) {
        MergeOutcome::Keep => {
            tracing::trace!(%attempt, ?verdict, "Leaving decision unchanged");
        }
        MergeOutcome::Deny(message) => {
            tracing::info!(%attempt, player = ?event.player, "Denying connection");
            event.decision.deny(message, writer.clone());
        }
    }
}

fn apply_failure_policy(
    attempt: AttemptId,
    failure_policy: &FailurePolicy,
    outcome: LookupOutcome,
) -> PunishmentVerdict {
    let error = match outcome {
        LookupOutcome::Verdict(verdict) => return verdict,
        LookupOutcome::Failed(error) => error,
    };

    match failure_policy {
        FailurePolicy::FailOpen => {
            tracing::warn!(%attempt, "Punishment lookup failed, admitting: {}", error);
            PunishmentVerdict::NoPunishment
        }
        FailurePolicy::FailClosed { message } => {
            tracing::error!(%attempt, "Punishment lookup failed, refusing: {}", error);
            PunishmentVerdict::Punished {
                message: message.clone(),
            }
        }
    }
}

/// Admission listener that checks every connection against the punishment
/// registry.
///
/// The lookup is started in the early phase and only awaited in the late
/// phase, so that it runs concurrently with whatever the other listeners do
/// in between. Attempts are tracked independently; nothing is shared between
/// two attempts except the enforcement client.
pub struct ConnectionGate<C: EnforcementClient> {
    name: String,
    client: C,
    failure_policy: FailurePolicy,
    attempt_timeout: Duration,
    reap_interval: Duration,
    attempts: Mutex<HashMap<AttemptId, AttemptHandlers>>,
    violations: AtomicU64,
}

impl<C: EnforcementClient> ConnectionGate<C> {
    pub fn new(name: impl Into<String>, client: C, config: &GateConfig) -> Self {
        Self {
            name: name.into(),
            client,
            failure_policy: config.failure_policy.clone(),
            attempt_timeout: config.attempt_timeout(),
            reap_interval: config.reap_interval(),
            attempts: Mutex::new(HashMap::new()),
            violations: AtomicU64::new(0),
        }
    }

    pub fn writer_id(&self) -> WriterId {
        WriterId::plugin(self.name.as_str())
    }

    /// State of an attempt the gate is tracking, or `None` if it has nothing
    /// for that attempt (never seen, abandoned, or reaped). Finalized
    /// attempts are kept, without their lookup, until they are reaped.
    pub fn attempt_state(&self, attempt: AttemptId) -> Option<AttemptState> {
        self.attempts.lock().get(&attempt).map(AttemptHandlers::state)
    }

    /// Number of attempts that have been dispatched and not yet finalized
    pub fn outstanding(&self) -> usize {
        self.attempts
            .lock()
            .values()
            .filter(|handlers| handlers.state() != AttemptState::Finalized)
            .count()
    }

    /// Number of attempts held in any state, finalized ones included
    pub fn tracked(&self) -> usize {
        self.attempts.lock().len()
    }

    /// Number of out-of-order calls seen so far
    pub fn violations(&self) -> u64 {
        self.violations.load(Ordering::Relaxed)
    }

    /// The host has given up on this attempt; drop whatever is held for it.
    /// A lookup still in flight completes into nothing.
    pub fn abandon(&self, attempt: AttemptId) -> bool {
        let removed = self.attempts.lock().remove(&attempt).is_some();
        if removed {
            tracing::debug!(%attempt, "Attempt abandoned");
        }
        removed
    }

    /// Drop attempts older than the attempt timeout: those whose late phase
    /// never arrived, and finalized ones that no longer need remembering.
    /// Returns how many were removed.
    pub fn reap_stale(&self, now: Instant) -> usize {
        let Some(threshold) = now.checked_sub(self.attempt_timeout) else {
            return 0;
        };

        let mut attempts = self.attempts.lock();
        let before = attempts.len();
        attempts.retain(|attempt, handlers| {
            let keep = handlers.created_at() >= threshold;
            if !keep && handlers.state() != AttemptState::Finalized {
                tracing::debug!(%attempt, state = ?handlers.state(), "Attempt timed out before finalizing");
            }
            keep
        });
        before - attempts.len()
    }

    /// Run [`reap_stale`](Self::reap_stale) on the configured interval, for
    /// as long as the gate exists. Must be called from within a tokio
    /// runtime.
    pub fn spawn_reaper(self: &Arc<Self>) -> JoinHandle<()>
    where
        C: 'static,
    {
        let gate = Arc::downgrade(self);
        let mut timer = tokio::time::interval(self.reap_interval);

        tokio::spawn(async move {
            loop {
                timer.tick().await;

                let Some(gate) = gate.upgrade() else {
                    tracing::debug!("Connection gate dropped, stopping reaper");
                    break;
                };

                let reaped = gate.reap_stale(Instant::now());
                if reaped > 0 {
                    tracing::debug!(gate = %gate.name, reaped, "Reaped stale attempts");
                }
            }
        })
    }

    fn report(&self, violation: ProtocolViolation) {
        tracing::error!(gate = %self.name, "Protocol violation: {}", violation);
        self.violations.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl<C: EnforcementClient> AdmissionListener for ConnectionGate<C> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn early(&self, event: &mut AdmissionEvent) {
        let result = {
            let mut attempts = self.attempts.lock();
            let handlers = attempts.entry(event.attempt).or_insert_with(|| {
                AttemptHandlers::new(event.attempt, self.writer_id(), self.failure_policy.clone())
            });
            let result = handlers.early(&self.client, event);
            result
        };

        if let Err(violation) = result {
            self.report(violation);
        }
    }

    async fn late(&self, event: &mut AdmissionEvent) {
        let started = {
            let mut attempts = self.attempts.lock();
            let started = match attempts.get_mut(&event.attempt) {
                Some(handlers) => handlers.begin_late(),
                None => Err(ProtocolViolation::LateWithoutEarly(event.attempt)),
            };
            started
        };

        let (lookup, at_dispatch) = match started {
            Ok(started) => started,
            Err(violation) => {
                self.report(violation);
                return;
            }
        };

        // The table is not locked while waiting
        let outcome = lookup.await;
        resolve_lookup(
            event.attempt,
            &self.writer_id(),
            &self.failure_policy,
            outcome,
            &at_dispatch,
            event,
        );

        if let Some(handlers) = self.attempts.lock().get_mut(&event.attempt) {
            handlers.finalize();
        } else {
            tracing::debug!(attempt = %event.attempt, "Attempt discarded while its lookup was pending");
        }
    }
}
