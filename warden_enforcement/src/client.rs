use crate::{PendingLookup, PlayerIdentity};

use std::net::IpAddr;

/// Starts punishment lookups for connecting players.
///
/// `check_connection` is called from inside the host's event pipeline and must
/// not block; the work happens elsewhere and its result is delivered through
/// the returned [`PendingLookup`], which must always resolve, with
/// [`LookupOutcome::Failed`](crate::LookupOutcome::Failed) if the lookup itself
/// could not be completed. It is called at most once per connection attempt.
pub trait EnforcementClient: Send + Sync {
    fn check_connection(&self, player: &PlayerIdentity, address: IpAddr) -> PendingLookup;
}
