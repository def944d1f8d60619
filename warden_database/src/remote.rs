//! Network connections to the client/server engines, via diesel-async

use crate::{config::DatabaseConfig, *};

use diesel::{sql_types::Text, QueryableByName};
use diesel_async::{AsyncConnection, AsyncMysqlConnection, AsyncPgConnection, RunQueryDsl};

use std::time::Duration;

#[derive(QueryableByName)]
struct VersionRow {
    #[diesel(sql_type = Text)]
    version: String,
}

impl DatabaseSession for AsyncPgConnection {
    async fn fetch_version(&mut self, sql: &str) -> DatabaseResult<String> {
        let row: VersionRow = diesel::sql_query(sql).get_result(self).await?;
        Ok(row.version)
    }

    async fn run_statement(&mut self, sql: &str) -> DatabaseResult<()> {
        diesel::sql_query(sql).execute(self).await?;
        Ok(())
    }
}

impl DatabaseSession for AsyncMysqlConnection {
    async fn fetch_version(&mut self, sql: &str) -> DatabaseResult<String> {
        let row: VersionRow = diesel::sql_query(sql).get_result(self).await?;
        Ok(row.version)
    }

    async fn run_statement(&mut self, sql: &str) -> DatabaseResult<()> {
        diesel::sql_query(sql).execute(self).await?;
        Ok(())
    }
}

/// A bootstrapped connection to one of the remote engines
pub enum RemoteSession {
    Postgres(AsyncPgConnection),
    Mysql(AsyncMysqlConnection),
}

impl DatabaseSession for RemoteSession {
    async fn fetch_version(&mut self, sql: &str) -> DatabaseResult<String> {
        match self {
            Self::Postgres(conn) => conn.fetch_version(sql).await,
            Self::Mysql(conn) => conn.fetch_version(sql).await,
        }
    }

    async fn run_statement(&mut self, sql: &str) -> DatabaseResult<()> {
        match self {
            Self::Postgres(conn) => conn.run_statement(sql).await,
            Self::Mysql(conn) => conn.run_statement(sql).await,
        }
    }
}

/// Open a connection to the configured database and bootstrap it with
/// [`bootstrap_session`].
///
/// Fails with [`DatabaseError::NoDriver`] for the embedded engine, which has no
/// network protocol to speak.
#[tracing::instrument(skip_all, fields(vendor = %config.vendor))]
pub async fn connect(config: &DatabaseConfig) -> DatabaseResult<RemoteSession> {
    let vendor = config.vendor;

    let establish = async {
        match vendor.driver() {
            DriverFamily::HyperSql => Err(DatabaseError::NoDriver(vendor)),
            DriverFamily::MariaDbConnector => Ok(RemoteSession::Mysql(
                AsyncMysqlConnection::establish(&config.url).await?,
            )),
            DriverFamily::PgWire => Ok(RemoteSession::Postgres(
                AsyncPgConnection::establish(&config.url).await?,
            )),
        }
    };

    let mut session = tokio::time::timeout(Duration::from_secs(config.connect_timeout_secs), establish)
        .await
        .map_err(|_| DatabaseError::ConnectTimeout(vendor))??;

    bootstrap_session(vendor, &mut session).await?;
    Ok(session)
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn embedded_engine_has_no_driver() {
        let config = DatabaseConfig {
            vendor: Vendor::Hsqldb,
            url: "file:/var/lib/warden/bans".to_string(),
            connect_timeout_secs: 10,
        };

        assert!(matches!(
            connect(&config).await,
            Err(DatabaseError::NoDriver(Vendor::Hsqldb))
        ));
    }
}
