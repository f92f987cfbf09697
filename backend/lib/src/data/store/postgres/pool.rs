//! Connection pool for the document store.
//!
//! ## Features
//! - bb8 pool of `diesel-async` PostgreSQL connections
//! - Optional TLS, verified against the platform trust store or a CA bundle
//! - Health check at construction so unreachable databases fail at startup

use std::{fs::File, io::BufReader, sync::Arc, time::Duration};

use diesel::{ConnectionError, ConnectionResult};
use diesel_async::{
    pooled_connection::{bb8::Pool, AsyncDieselConnectionManager, ManagerConfig},
    AsyncPgConnection, RunQueryDsl,
};
use futures::{future::BoxFuture, FutureExt};
use rustls::{version, ClientConfig, RootCertStore, SupportedProtocolVersion};
use rustls_pemfile::certs as load_pem_certs;
use rustls_platform_verifier::ConfigVerifierExt;
use tracing::warn;

use crate::{
    config::{StoreConfig, TlsMode},
    data::store::error::{StoreError, StoreResult},
};

/// Versions offered when verifying against a CA bundle
const PROTOCOL_VERSIONS: &[&SupportedProtocolVersion] = &[&version::TLS13, &version::TLS12];

pub type DbPool = Pool<AsyncPgConnection>;
pub type DbConnection<'a> =
    diesel_async::pooled_connection::bb8::PooledConnection<'a, AsyncPgConnection>;

/// Pool of PostgreSQL connections
pub struct ConnectionPool {
    inner: Arc<DbPool>,
}

impl ConnectionPool {
    /// Create the pool described by `config` and check that it can reach the database.
    pub async fn new(config: &StoreConfig) -> StoreResult<Self> {
        let manager = match &config.tls {
            TlsMode::Disabled => {
                AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url)
            }
            tls => {
                let rustls_config = Arc::new(make_rustls_config(tls)?);

                let mut manager_cfg = ManagerConfig::default();
                manager_cfg.custom_setup = Box::new(move |url: &str| {
                    establish_tls_connection(url, Arc::clone(&rustls_config))
                });
                AsyncDieselConnectionManager::<AsyncPgConnection>::new_with_config(
                    &config.database_url,
                    manager_cfg,
                )
            }
        };

        let timeout = Duration::from_secs(config.timeout_secs);
        let pool = Pool::builder()
            .max_size(config.max_connections)
            .connection_timeout(timeout)
            .idle_timeout(Some(Duration::from_secs(300)))
            .max_lifetime(Some(Duration::from_secs(3600)))
            .build(manager)
            .await
            .map_err(|e| StoreError::Pool(format!("Failed to create pool: {}", e)))?;

        let pool = Self {
            inner: Arc::new(pool),
        };

        // Surface connection/TLS errors at startup instead of on the first request
        {
            let mut conn = pool.get().await?;
            diesel::sql_query("SELECT 1")
                .execute(&mut conn)
                .await
                .map_err(|e| StoreError::Pool(format!("Healthcheck failed: {}", e)))?;
        }

        Ok(pool)
    }

    /// Get a connection from the pool.
    pub async fn get(&self) -> StoreResult<DbConnection<'_>> {
        self.inner
            .get()
            .await
            .map_err(|e| StoreError::Pool(format!("Failed to get connection: {}", e)))
    }
}

fn make_rustls_config(tls: &TlsMode) -> StoreResult<ClientConfig> {
    // the platform verifier builds on the process-wide provider; ignore "already installed"
    let _ = rustls::crypto::ring::default_provider().install_default();

    match tls {
        TlsMode::CaFile { path } => {
            let file = File::open(path)?;
            let mut reader = BufReader::new(file);

            let mut roots = RootCertStore::empty();
            for cert in load_pem_certs(&mut reader) {
                if let Err(err) = roots.add(cert?) {
                    warn!(path = ?path, error = %err, "Failed to add certificate to root store");
                }
            }
            if roots.is_empty() {
                return Err(StoreError::invalid_input(format!(
                    "no usable certificate in {}",
                    path.display()
                )));
            }

            let provider = rustls::crypto::ring::default_provider();
            ClientConfig::builder_with_provider(provider.into())
                .with_protocol_versions(PROTOCOL_VERSIONS)
                .map(|builder| builder.with_root_certificates(roots).with_no_client_auth())
                .map_err(|e| StoreError::invalid_input(format!("TLS configuration: {}", e)))
        }
        TlsMode::Platform | TlsMode::Disabled => Ok(ClientConfig::with_platform_verifier()),
    }
}

fn establish_tls_connection(
    url: &str,
    rustls_config: Arc<ClientConfig>,
) -> BoxFuture<'_, ConnectionResult<AsyncPgConnection>> {
    let fut = async move {
        let tls = tokio_postgres_rustls::MakeRustlsConnect::new((*rustls_config).clone());
        let (client, conn) = tokio_postgres::connect(url, tls)
            .await
            .map_err(|e| ConnectionError::BadConnection(e.to_string()))?;

        AsyncPgConnection::try_from_client_and_connection(client, conn).await
    };
    fut.boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ca_bundle_config_offers_tls12() {
        let builder = ClientConfig::builder_with_provider(
            rustls::crypto::ring::default_provider().into(),
        )
        .with_protocol_versions(PROTOCOL_VERSIONS);

        assert!(builder.is_ok());
        assert!(PROTOCOL_VERSIONS
            .iter()
            .any(|v| v.version == rustls::ProtocolVersion::TLSv1_2));
    }

    #[test]
    fn missing_ca_file_is_an_error() {
        let tls = TlsMode::CaFile {
            path: "/nonexistent/ca.pem".into(),
        };

        assert!(matches!(make_rustls_config(&tls), Err(StoreError::Io(_))));
    }

    #[test]
    fn ca_file_without_certificates_is_rejected() {
        let path = std::env::temp_dir().join(format!("empty-ca-{}.pem", std::process::id()));
        std::fs::write(&path, "not a certificate\n").unwrap();

        let result = make_rustls_config(&TlsMode::CaFile { path: path.clone() });
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(StoreError::InvalidInput(_))));
    }
}
