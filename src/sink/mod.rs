//! Cassandra sink: session factory, schema bootstrap, and record insert.
//!
//! Connecting and bootstrapping are separate phases. A session failure is
//! reported to the caller, who decides whether to proceed; bootstrap DDL
//! errors propagate unhandled. Insert failures are returned per record so
//! the pipeline can count them and keep consuming.

pub mod statements;

use scylla::prepared_statement::PreparedStatement;
use scylla::{Session, SessionBuilder};
use snafu::prelude::*;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::config::SinkConfig;
use crate::emit;
use crate::error::{
    CreateKeyspaceSnafu, CreateTableSnafu, InsertSnafu, PrepareInsertSnafu, SessionCreateSnafu,
    SinkError,
};
use crate::metrics::events::BootstrapCompleted;
use crate::schema::UserRecord;

/// Cassandra sink for user records.
pub struct CassandraSink {
    session: Session,
    keyspace: String,
    table: String,
    replication_factor: u32,
    /// Prepared by [`CassandraSink::bootstrap`]; inserts fail before that.
    insert: Option<PreparedStatement>,
}

impl CassandraSink {
    /// Open a session against the configured cluster.
    pub async fn connect(config: &SinkConfig) -> Result<Self, SinkError> {
        let nodes = config.nodes();
        debug!("Connecting to Cassandra nodes: {:?}", nodes);

        let session = match SessionBuilder::new().known_nodes(&nodes).build().await {
            Ok(session) => session,
            Err(e) => {
                error!("Unable to create Cassandra session: {}", e);
                return Err(e).context(SessionCreateSnafu);
            }
        };

        info!("Cassandra session created successfully");
        Ok(Self {
            session,
            keyspace: config.keyspace.clone(),
            table: config.table.clone(),
            replication_factor: config.replication_factor,
            insert: None,
        })
    }

    /// Idempotently create the keyspace and table, then prepare the insert.
    ///
    /// Safe to call on every start; both statements carry `IF NOT EXISTS`.
    pub async fn bootstrap(&mut self) -> Result<(), SinkError> {
        let start = Instant::now();

        self.session
            .query_unpaged(
                statements::create_keyspace(&self.keyspace, self.replication_factor),
                (),
            )
            .await
            .context(CreateKeyspaceSnafu {
                keyspace: self.keyspace.clone(),
            })?;
        info!("Keyspace {} created successfully", self.keyspace);

        self.session
            .query_unpaged(statements::create_table(&self.keyspace, &self.table), ())
            .await
            .context(CreateTableSnafu {
                table: self.table.clone(),
            })?;
        info!("Table {}.{} created successfully", self.keyspace, self.table);

        let prepared = self
            .session
            .prepare(statements::insert_user(&self.keyspace, &self.table))
            .await
            .context(PrepareInsertSnafu)?;
        self.insert = Some(prepared);

        emit!(BootstrapCompleted {
            duration: start.elapsed()
        });
        Ok(())
    }

    /// Insert one user record.
    ///
    /// Logs success per record; on failure the error is returned and the
    /// record is dropped by the caller (no retry).
    pub async fn insert(&self, record: &UserRecord) -> Result<(), SinkError> {
        let prepared = self.insert.as_ref().ok_or(SinkError::NotBootstrapped)?;

        self.session
            .execute_unpaged(
                prepared,
                (
                    record.id,
                    &record.first_name,
                    &record.last_name,
                    &record.gender,
                    &record.address,
                    &record.postcode,
                    &record.email,
                    &record.username,
                    &record.dob,
                    &record.registered_date,
                    &record.phone,
                    &record.picture,
                ),
            )
            .await
            .context(InsertSnafu { id: record.id })?;

        info!("Data inserted for {}", record.full_name());
        Ok(())
    }

    /// Keyspace this sink writes into.
    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    /// Table this sink writes into.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Whether the insert statement has been prepared.
    pub fn is_bootstrapped(&self) -> bool {
        self.insert.is_some()
    }
}

impl std::fmt::Debug for CassandraSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CassandraSink")
            .field("keyspace", &self.keyspace)
            .field("table", &self.table)
            .field("bootstrapped", &self.insert.is_some())
            .finish_non_exhaustive()
    }
}
