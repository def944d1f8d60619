use crate::{DatabaseResult, Vendor};

use std::future::Future;

/// A single physical connection to a database server, as far as bootstrapping
/// it is concerned
pub trait DatabaseSession: Send {
    /// Run `sql`, which must return one row with one text column named
    /// `version`, and return that column
    fn fetch_version(&mut self, sql: &str) -> impl Future<Output = DatabaseResult<String>> + Send;

    /// Run a single statement, discarding any result
    fn run_statement(&mut self, sql: &str) -> impl Future<Output = DatabaseResult<()>> + Send;
}

/// Prepare a freshly opened connection for use by the punishment registry.
///
/// The server's version is checked against the vendor's minimum before any
/// session settings are applied; an unsupported server is reported as an error
/// and the connection is left untouched. Returns the version string the server
/// reported.
#[tracing::instrument(skip(session))]
pub async fn bootstrap_session<S: DatabaseSession>(
    vendor: Vendor,
    session: &mut S,
) -> DatabaseResult<String> {
    let reported = session.fetch_version(vendor.version_query()).await?;
    vendor.check_version(&reported)?;

    for statement in vendor.connection_init_statements() {
        tracing::trace!(%statement, "Running connection init");
        session.run_statement(&statement).await?;
    }

    tracing::info!(%reported, "Database session ready");
    Ok(reported)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::DatabaseError;
    use pretty_assertions::assert_eq;

    /// Records everything run against it, and reports a fixed version
    struct RecordingSession {
        version: String,
        executed: Vec<String>,
    }

    impl RecordingSession {
        fn reporting(version: &str) -> Self {
            Self {
                version: version.to_owned(),
                executed: Vec::new(),
            }
        }
    }

    impl DatabaseSession for RecordingSession {
        async fn fetch_version(&mut self, sql: &str) -> DatabaseResult<String> {
            self.executed.push(sql.to_owned());
            Ok(self.version.clone())
        }

        async fn run_statement(&mut self, sql: &str) -> DatabaseResult<()> {
            self.executed.push(sql.to_owned());
            Ok(())
        }
    }

    #[tokio::test]
    async fn bootstrap_runs_init_after_version_check() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let mut session = RecordingSession::reporting("15.3 (Debian 15.3-1.pgdg120+1)");

        let reported = bootstrap_session(Vendor::PostgreSql, &mut session)
            .await
            .unwrap();

        assert_eq!(reported, "15.3 (Debian 15.3-1.pgdg120+1)");
        assert_eq!(
            session.executed,
            vec![
                "SELECT current_setting('server_version') AS version".to_string(),
                "SET NAMES 'UTF8'".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn bootstrap_splits_mariadb_init() {
        let mut session = RecordingSession::reporting("10.11.2-MariaDB-1:10.11.2+maria~ubu2204");

        bootstrap_session(Vendor::MariaDb, &mut session)
            .await
            .unwrap();

        assert_eq!(session.executed.len(), 3);
        assert_eq!(session.executed[1], "SET NAMES utf8mb4 COLLATE utf8mb4_bin");
        assert!(session.executed[2].starts_with("SET @@SQL_MODE = CONCAT(@@SQL_MODE, ',STRICT_TRANS_TABLES,"));
    }

    #[tokio::test]
    async fn old_server_is_refused_before_init() {
        let mut session = RecordingSession::reporting("5.7.42");

        let result = bootstrap_session(Vendor::MySql, &mut session).await;

        assert!(matches!(
            result,
            Err(DatabaseError::UnsupportedVersion {
                vendor: Vendor::MySql,
                ..
            })
        ));
        // Only the version query ran
        assert_eq!(session.executed, vec!["SELECT VERSION() AS version".to_string()]);
    }

    #[tokio::test]
    async fn unparseable_version_without_floor_is_accepted() {
        let mut session = RecordingSession::reporting("unknown");

        bootstrap_session(Vendor::CockroachDb, &mut session)
            .await
            .unwrap();

        assert_eq!(session.executed.len(), 4);
    }
}
