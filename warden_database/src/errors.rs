//! Defines errors returned by the other modules

use crate::{ServerVersion, Vendor};
use thiserror::Error;

/// Errors that can occur while connecting to or preparing a database session
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("{vendor} {found} is not supported; at least version {required} is required")]
    UnsupportedVersion {
        vendor: Vendor,
        required: ServerVersion,
        found: ServerVersion,
    },
    #[error("Could not understand the version reported by {vendor}: {reported:?}")]
    UnparseableVersion { vendor: Vendor, reported: String },
    #[error("No network driver is available for {0}")]
    NoDriver(Vendor),
    #[error("Timed out connecting to {0}")]
    ConnectTimeout(Vendor),
    #[error("Connection error: {0}")]
    Connection(#[from] diesel::ConnectionError),
    #[error("Query error: {0}")]
    Query(#[from] diesel::result::Error),
}

/// Convenience definition of a Result type for database operations
pub type DatabaseResult<T> = std::result::Result<T, DatabaseError>;
