//! Consulting the punishment registry for a connecting player.
//!
//! [`EnforcementClient`] is the narrow contract the connection gate relies on:
//! start a lookup without blocking, and get back a [`PendingLookup`] that is
//! guaranteed to resolve eventually, either with a [`PunishmentVerdict`] or
//! with a [`LookupError`]. [`RegistryEnforcer`] implements that contract on top
//! of any [`PunishmentRegistry`].

mod verdict;
pub use verdict::*;

mod pending;
pub use pending::*;

mod client;
pub use client::*;

mod registry;
pub use registry::*;

mod layout;
pub use layout::*;
