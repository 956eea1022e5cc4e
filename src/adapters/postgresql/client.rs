//! PostgreSQL client implementation
//!
//! Connection pooling through deadpool-postgres; TLS through native-tls when
//! the configured `ssl_mode` requires it.

use crate::config::schema::PostgreSQLConfig;
use crate::domain::{EtlError, FlatRecord, Result, Table};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::config::Host;
use tokio_postgres::types::ToSql;
use tokio_postgres::NoTls;

/// Schema template; `{table}` is replaced with the configured table name
const TABLE_MIGRATION: &str = include_str!("../../../migrations/001_vaccinations.sql");

/// PostgreSQL client
///
/// The pool connects lazily: constructing a client never touches the network.
pub struct PostgreSQLClient {
    pool: Pool,
    config: PostgreSQLConfig,
}

impl PostgreSQLClient {
    /// Create a new PostgreSQL client
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the connection string cannot be
    /// parsed or the TLS connector cannot be built.
    pub async fn new(config: PostgreSQLConfig) -> Result<Self> {
        let pg_config: tokio_postgres::Config = config
            .connection_string
            .expose_secret()
            .as_ref()
            .parse()
            .map_err(|e| {
                EtlError::Configuration(format!("Invalid PostgreSQL connection string: {}", e))
            })?;

        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let manager = if config.requires_tls() {
            let mut tls_builder = native_tls::TlsConnector::builder();
            match config.ssl_mode.as_str() {
                "require" => {
                    tls_builder.danger_accept_invalid_certs(true);
                }
                "verify-ca" => {
                    tls_builder.danger_accept_invalid_hostnames(true);
                }
                _ => {}
            }
            let connector = tls_builder.build().map_err(|e| {
                EtlError::Configuration(format!("Failed to build TLS connector: {}", e))
            })?;
            let tls = postgres_native_tls::MakeTlsConnector::new(connector);
            Manager::from_config(pg_config, tls, manager_config)
        } else {
            Manager::from_config(pg_config, NoTls, manager_config)
        };

        let timeout = Some(Duration::from_secs(config.connection_timeout_seconds));
        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .wait_timeout(timeout)
            .create_timeout(timeout)
            .recycle_timeout(timeout)
            .build()
            .map_err(|e| {
                EtlError::Configuration(format!("Failed to create connection pool: {}", e))
            })?;

        Ok(Self { pool, config })
    }

    fn load_failure(&self, message: String) -> EtlError {
        EtlError::LoadFailure {
            table: self.config.table_name.clone(),
            message,
        }
    }

    /// Get a connection from the pool
    pub async fn get_connection(&self) -> Result<deadpool_postgres::Object> {
        self.pool.get().await.map_err(|e| {
            self.load_failure(format!("Failed to get connection from pool: {}", e))
        })
    }

    /// Test the connection to PostgreSQL
    pub async fn test_connection(&self) -> Result<()> {
        let client = self.get_connection().await?;

        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| self.load_failure(format!("Connection test failed: {}", e)))?;

        tracing::info!(
            server = %self.connection_string_safe(),
            "PostgreSQL connection test successful"
        );
        Ok(())
    }

    /// Create the destination table if it does not exist
    pub async fn ensure_table(&self) -> Result<()> {
        let client = self.get_connection().await?;

        client
            .batch_execute(&self.migration_sql())
            .await
            .map_err(|e| self.load_failure(format!("Failed to create table: {}", e)))?;

        tracing::info!(table = %self.config.table_name, "PostgreSQL table ready");
        Ok(())
    }

    /// Replace the table contents in a single transaction
    ///
    /// `TRUNCATE` takes an `ACCESS EXCLUSIVE` lock, so concurrent readers
    /// wait for the commit instead of observing an empty table. On any
    /// error the transaction is dropped and rolled back.
    pub async fn replace_rows(&self, table: &Table) -> Result<u64> {
        let mut client = self.get_connection().await?;

        let transaction = client
            .transaction()
            .await
            .map_err(|e| self.load_failure(format!("Failed to begin transaction: {}", e)))?;

        transaction
            .batch_execute(&format!(
                "SET LOCAL statement_timeout = {}; TRUNCATE TABLE {}",
                self.config.statement_timeout_seconds.saturating_mul(1000),
                self.config.table_name
            ))
            .await
            .map_err(|e| self.load_failure(format!("Failed to truncate table: {}", e)))?;

        let statement = transaction
            .prepare(&self.insert_sql())
            .await
            .map_err(|e| self.load_failure(format!("Failed to prepare insert: {}", e)))?;

        let mut inserted = 0u64;
        for (index, record) in table.iter().enumerate() {
            let row_number = i32::try_from(index)
                .map_err(|_| self.load_failure(format!("Row index {} out of range", index)))?;
            // Column order must match FlatRecord::FIELD_NAMES
            let params: [&(dyn ToSql + Sync); 12] = [
                &row_number,
                &record.patient_age,
                &record.patient_biological_sex,
                &record.patient_race_color,
                &record.patient_municipality,
                &record.patient_state_code,
                &record.facility_legal_name,
                &record.vaccine_manufacturer_reference,
                &record.vaccine_category_name,
                &record.vaccine_lot,
                &record.vaccine_manufacturer_name,
                &record.vaccine_application_date,
            ];
            inserted += transaction
                .execute(&statement, &params)
                .await
                .map_err(|e| {
                    self.load_failure(format!("Failed to insert row {}: {}", index, e))
                })?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| self.load_failure(format!("Failed to commit: {}", e)))?;

        Ok(inserted)
    }

    fn migration_sql(&self) -> String {
        TABLE_MIGRATION.replace("{table}", &self.config.table_name)
    }

    fn insert_sql(&self) -> String {
        let columns = FlatRecord::FIELD_NAMES.join(", ");
        let placeholders: Vec<String> = (1..=FlatRecord::FIELD_NAMES.len() + 1)
            .map(|i| format!("${}", i))
            .collect();
        format!(
            "INSERT INTO {} (row_number, {}) VALUES ({})",
            self.config.table_name,
            columns,
            placeholders.join(", ")
        )
    }

    /// Destination table name
    pub fn table_name(&self) -> &str {
        &self.config.table_name
    }

    /// Get the connection string (without credentials)
    pub fn connection_string_safe(&self) -> String {
        redact_connection_string(self.config.connection_string.expose_secret().as_ref())
    }
}

/// Display form of a connection string: hosts, ports and database only
///
/// Built from the parsed configuration, so credentials never appear
/// wherever they were written (userinfo, query parameters or key/value
/// pairs). An unparsable string is fully masked.
pub fn redact_connection_string(connection_string: &str) -> String {
    let Ok(config) = connection_string.parse::<tokio_postgres::Config>() else {
        return "postgresql://***".to_string();
    };

    let ports = config.get_ports();
    let hosts: Vec<String> = config
        .get_hosts()
        .iter()
        .enumerate()
        .map(|(i, host)| {
            let name = match host {
                Host::Tcp(name) => name.clone(),
                #[cfg(unix)]
                Host::Unix(path) => path.display().to_string(),
            };
            match ports.get(i).or(ports.first()) {
                Some(port) => format!("{name}:{port}"),
                None => name,
            }
        })
        .collect();

    let credentials = if config.get_user().is_some() || config.get_password().is_some() {
        "***@"
    } else {
        ""
    };

    format!(
        "postgresql://{credentials}{}/{}",
        hosts.join(","),
        config.get_dbname().unwrap_or_default()
    )
}
