use crate::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;

use std::{future::Future, net::IpAddr, sync::Arc, time::Duration};

/// Kinds of punishment the registry can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PunishmentKind {
    Ban,
    Mute,
    Warn,
    Kick,
}

/// An active punishment, as stored in the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Punishment {
    pub kind: PunishmentKind,
    pub reason: String,
    /// Name of whoever issued the punishment
    pub operator: String,
    pub start: DateTime<Utc>,
    /// `None` for a permanent punishment
    pub end: Option<DateTime<Utc>>,
}

/// Read access to the punishment store. How punishments are stored, created
/// and expired is the store's own business.
pub trait PunishmentRegistry: Send + Sync + 'static {
    /// Find the ban, if any, that applies to this player connecting from this
    /// address
    fn active_ban(
        &self,
        player: &PlayerIdentity,
        address: IpAddr,
    ) -> impl Future<Output = Result<Option<Punishment>, LookupError>> + Send;
}

/// An [`EnforcementClient`] which runs each lookup against a
/// [`PunishmentRegistry`] as a task on the given runtime
pub struct RegistryEnforcer<R: PunishmentRegistry> {
    registry: Arc<R>,
    layout: Arc<DenialLayout>,
    lookup_timeout: Duration,
    runtime: Handle,
}

impl<R: PunishmentRegistry> RegistryEnforcer<R> {
    pub fn new(
        registry: Arc<R>,
        layout: DenialLayout,
        lookup_timeout: Duration,
        runtime: Handle,
    ) -> Self {
        Self {
            registry,
            layout: Arc::new(layout),
            lookup_timeout,
            runtime,
        }
    }
}

impl<R: PunishmentRegistry> EnforcementClient for RegistryEnforcer<R> {
    #[tracing::instrument(skip(self))]
    fn check_connection(&self, player: &PlayerIdentity, address: IpAddr) -> PendingLookup {
        let (resolver, lookup) = PendingLookup::channel();

        let registry = Arc::clone(&self.registry);
        let layout = Arc::clone(&self.layout);
        let lookup_timeout = self.lookup_timeout;
        let player = player.clone();

        self.runtime.spawn(async move {
            let found =
                tokio::time::timeout(lookup_timeout, registry.active_ban(&player, address)).await;

            let outcome = match found {
                Err(_) => {
                    tracing::warn!(?player, %address, "Punishment lookup timed out");
                    LookupOutcome::Failed(LookupError::TimedOut)
                }
                Ok(Err(e)) => {
                    tracing::warn!(?player, %address, "Punishment lookup failed: {}", e);
                    LookupOutcome::Failed(e)
                }
                Ok(Ok(None)) => PunishmentVerdict::NoPunishment.into(),
                Ok(Ok(Some(punishment))) => {
                    tracing::debug!(?player, %address, ?punishment, "Found active punishment");
                    PunishmentVerdict::Punished {
                        message: layout.render(&punishment, Utc::now()),
                    }
                    .into()
                }
            };

            if !resolver.resolve(outcome) {
                tracing::trace!(?player, "Lookup result no longer wanted");
            }
        });

        lookup
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    use std::{
        collections::HashMap,
        net::Ipv4Addr,
    };

    /// Bans keyed by address, with an optional artificial delay
    struct MapRegistry {
        bans: HashMap<IpAddr, Punishment>,
        delay: Duration,
        broken: bool,
    }

    impl MapRegistry {
        fn empty() -> Self {
            Self {
                bans: HashMap::new(),
                delay: Duration::ZERO,
                broken: false,
            }
        }
    }

    impl PunishmentRegistry for MapRegistry {
        async fn active_ban(
            &self,
            _player: &PlayerIdentity,
            address: IpAddr,
        ) -> Result<Option<Punishment>, LookupError> {
            tokio::time::sleep(self.delay).await;
            if self.broken {
                return Err(LookupError::Backend("connection refused".to_string()));
            }
            Ok(self.bans.get(&address).cloned())
        }
    }

    fn player() -> PlayerIdentity {
        PlayerIdentity {
            uuid: Uuid::now_v7(),
            name: "username".to_string(),
        }
    }

    fn enforcer(registry: MapRegistry) -> RegistryEnforcer<MapRegistry> {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        RegistryEnforcer::new(
            Arc::new(registry),
            DenialLayout::new("Banned: %REASON%"),
            Duration::from_millis(200),
            Handle::current(),
        )
    }

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[tokio::test]
    async fn no_ban_found() {
        let lookup = enforcer(MapRegistry::empty()).check_connection(&player(), LOCALHOST);
        assert_eq!(
            lookup.await,
            LookupOutcome::Verdict(PunishmentVerdict::NoPunishment)
        );
    }

    #[tokio::test]
    async fn ban_is_rendered() {
        let mut registry = MapRegistry::empty();
        registry.bans.insert(
            LOCALHOST,
            Punishment {
                kind: PunishmentKind::Ban,
                reason: "griefing".to_string(),
                operator: "Console".to_string(),
                start: Utc::now(),
                end: None,
            },
        );

        let lookup = enforcer(registry).check_connection(&player(), LOCALHOST);
        assert_eq!(
            lookup.await,
            LookupOutcome::Verdict(PunishmentVerdict::Punished {
                message: "Banned: griefing".to_string()
            })
        );
    }

    #[tokio::test]
    async fn backend_failure_resolves() {
        let mut registry = MapRegistry::empty();
        registry.broken = true;

        let lookup = enforcer(registry).check_connection(&player(), LOCALHOST);
        assert!(matches!(
            lookup.await,
            LookupOutcome::Failed(LookupError::Backend(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_registry_times_out() {
        let mut registry = MapRegistry::empty();
        registry.delay = Duration::from_secs(30);

        let lookup = enforcer(registry).check_connection(&player(), LOCALHOST);
        assert_eq!(lookup.await, LookupOutcome::Failed(LookupError::TimedOut));
    }
}
