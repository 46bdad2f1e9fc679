//! Connection adapters
//!
//! Every connection `type` the engine understands is one variant of
//! [`Adapter`]; all of them are driven through [`ConnectionAdapter`].

use crate::database::ConnectionRecord;
use crate::engine::result::QueryResult;
use crate::engine::sqlite::SqliteAdapter;
use crate::error::{NebulaError, Result};
use std::path::PathBuf;

/// Capability shared by all adapters: run one submitted statement against a connection
pub trait ConnectionAdapter {
    /// Canonical location of the data a connection reads and writes.
    ///
    /// Connections naming the same file through different paths resolve to
    /// the same value.
    fn data_source(&self, connection: &ConnectionRecord) -> Result<PathBuf>;

    fn execute(&self, connection: &ConnectionRecord, sql: &str) -> Result<QueryResult>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adapter {
    Sqlite(SqliteAdapter),
}

impl Adapter {
    /// Adapter for a connection `type`, or `UnsupportedType`
    pub fn for_kind(kind: &str) -> Result<Self> {
        match kind {
            SqliteAdapter::KIND => Ok(Adapter::Sqlite(SqliteAdapter)),
            other => Err(NebulaError::UnsupportedType(other.to_string())),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Adapter::Sqlite(_) => SqliteAdapter::KIND,
        }
    }

    /// Connection types with an adapter
    pub fn supported_kinds() -> &'static [&'static str] {
        &[SqliteAdapter::KIND]
    }
}

impl ConnectionAdapter for Adapter {
    fn data_source(&self, connection: &ConnectionRecord) -> Result<PathBuf> {
        match self {
            Adapter::Sqlite(adapter) => adapter.data_source(connection),
        }
    }

    fn execute(&self, connection: &ConnectionRecord, sql: &str) -> Result<QueryResult> {
        match self {
            Adapter::Sqlite(adapter) => adapter.execute(connection, sql),
        }
    }
}
