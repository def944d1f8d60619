//! Connection admission against the punishment registry.
//!
//! A connection attempt passes through two phases, driven by the host for
//! every registered [`AdmissionListener`]: all `early` handlers run, then all
//! `late` handlers. [`ConnectionGate`] starts its punishment lookup in the
//! early phase without waiting for it, lets the other listeners get on with
//! their own checks, and only awaits the result in the late phase, where it is
//! reconciled with whatever the other listeners did to the shared
//! [`ConnectionDecision`] (see [`merge`]).

mod decision;
pub use decision::*;

mod merge;
pub use merge::*;

mod event;
pub use event::*;

mod listener;
pub use listener::*;

mod gate;
pub use gate::*;

mod pipeline;
pub use pipeline::*;

pub mod config;

mod errors;
pub use errors::*;
