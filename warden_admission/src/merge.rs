use crate::{DecisionSnapshot, Verdict, WriterId};
use warden_enforcement::PunishmentVerdict;

/// What the gate should do to the shared decision once its lookup is in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Leave the decision exactly as it is
    Keep,
    /// Overwrite the decision with a denial carrying this message
    Deny(String),
}

/// Reconcile a punishment lookup with the decision as other listeners have
/// left it.
///
/// `at_dispatch` is the decision as it was when the lookup was started, and
/// `current` is the decision now. The rules, in order:
///
///  - No punishment: the gate never touches the decision. Whatever anyone
///    else did, including a denial, stands.
///  - Punished, but another listener explicitly set the decision to allowed
///    after the lookup was started: that override stands.
///  - Punished otherwise: deny with the lookup's message, replacing any
///    earlier denial message.
pub fn merge(
    at_dispatch: &DecisionSnapshot,
    current: &DecisionSnapshot,
    gate: &WriterId,
    verdict: &PunishmentVerdict,
) -> MergeOutcome {
    let message = match verdict {
        PunishmentVerdict::NoPunishment => return MergeOutcome::Keep,
        PunishmentVerdict::Punished { message } => message,
    };

    let reallowed_since_dispatch = current.revision != at_dispatch.revision
        && current.last_writer != *gate
        && current.verdict == Verdict::Allowed;

    if reallowed_since_dispatch {
        return MergeOutcome::Keep;
    }

    match &current.verdict {
        Verdict::Denied(existing) if existing == message => MergeOutcome::Keep,
        _ => MergeOutcome::Deny(message.clone()),
    }
}
