//! Database vendor support for the punishment registry.
//!
//! The storage layer itself lives elsewhere; this crate supplies everything it
//! needs to know about the engine it is talking to: the dialect-specific SQL
//! fragments and column types, the statements that configure each new
//! physical connection, and the minimum server version below which the
//! registry refuses to start.

pub mod vendor;
pub use vendor::*;

mod version;
pub use version::*;

mod session;
pub use session::*;

mod remote;
pub use remote::*;

pub mod config;

mod errors;
pub use errors::*;
