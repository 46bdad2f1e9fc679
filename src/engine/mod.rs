//! Query engine
//!
//! Runs one submitted statement against a registered connection. Each call is
//! a self-contained pipeline:
//!
//! ```text
//! Resolve -> Load -> Classify -> Execute -> (Persist) -> Respond
//! ```
//!
//! - **Resolve**: the connection id is looked up in the registry file as it
//!   is on disk right now.
//! - **Load**: the connection `type` selects an [`Adapter`], which loads the
//!   data source into memory.
//! - **Classify**: statements starting with `select`, `pragma` or `with` are
//!   read-class, everything else is write-class ([`StatementClass`]).
//! - **Execute / Persist**: reads return the first result set; writes are
//!   executed and the whole database is written back to its file.
//!
//! Nothing is cached between calls. Callers that may run statements against
//! the same data concurrently must serialize them on
//! [`QueryEngine::data_source`], which is shared by every connection naming
//! the same file.

mod adapter;
mod classify;
mod result;
mod sqlite;

pub use adapter::{Adapter, ConnectionAdapter};
pub use classify::StatementClass;
pub use result::{Column, QueryResult, Row, StatusInfo};
pub use sqlite::SqliteAdapter;

use crate::database::ConnectionRegistry;
use crate::error::Result;
use std::path::PathBuf;
use tracing::info;

pub struct QueryEngine<'a> {
    registry: &'a ConnectionRegistry,
}

impl<'a> QueryEngine<'a> {
    pub fn new(registry: &'a ConnectionRegistry) -> Self {
        Self { registry }
    }

    /// Run `sql` against the connection with id `connection_id`
    /// Resolve a connection to the canonical location of its data
    pub fn data_source(&self, connection_id: &str) -> Result<PathBuf> {
        let connection = self.registry.get(connection_id)?;
        Adapter::for_kind(&connection.kind)?.data_source(&connection)
    }

    pub fn run(&self, connection_id: &str, sql: &str) -> Result<QueryResult> {
        let connection = self.registry.get(connection_id)?;
        let adapter = Adapter::for_kind(&connection.kind)?;

        info!(
            "running {:?} statement on {} connection {}",
            StatementClass::of(sql),
            adapter.kind(),
            connection.id
        );
        adapter.execute(&connection, sql)
    }
}
