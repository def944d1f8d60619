use crate::{DatabaseError, DatabaseResult, Vendor};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::{fmt, str::FromStr};

/// A database server release, compared component by component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ServerVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

/// Error type denoting that a version string held no recognisable version
#[derive(Debug, Clone, Error)]
#[error("Invalid version string {0:?}")]
pub struct InvalidVersion(pub String);

impl ServerVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl FromStr for ServerVersion {
    type Err = InvalidVersion;

    /// Parse the leading version number out of a server-reported string.
    ///
    /// Engines decorate their versions freely (`10.11.2-MariaDB-1:10.11.2+maria~ubu2204`,
    /// `15.3 (Debian 15.3-1)`, `CockroachDB CCL v23.1.11 (...)`), so anything before
    /// the first digit and anything after the dotted number is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidVersion(s.to_owned());

        let start = s.find(|c: char| c.is_ascii_digit()).ok_or_else(invalid)?;
        let rest = &s[start..];
        let end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());

        let mut components = [0u32; 3];
        for (slot, part) in components
            .iter_mut()
            .zip(rest[..end].split('.').take_while(|p| !p.is_empty()))
        {
            *slot = part.parse().map_err(|_| invalid())?;
        }

        let [major, minor, patch] = components;
        Ok(Self::new(major, minor, patch))
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.patch == 0 {
            write!(f, "{}.{}", self.major, self.minor)
        } else {
            write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
        }
    }
}

impl Vendor {
    /// Check a server-reported version string against this vendor's minimum.
    ///
    /// A server below the floor is a configuration error: the punishment
    /// registry must not be started against it.
    pub fn check_version(&self, reported: &str) -> DatabaseResult<()> {
        let Some(required) = self.minimum_server_version() else {
            tracing::debug!(vendor = %self, reported, "No minimum version enforced");
            return Ok(());
        };

        let found: ServerVersion =
            reported
                .parse()
                .map_err(|_| DatabaseError::UnparseableVersion {
                    vendor: *self,
                    reported: reported.to_owned(),
                })?;

        if found < required {
            return Err(DatabaseError::UnsupportedVersion {
                vendor: *self,
                required,
                found,
            });
        }

        Ok(())
    }
}
