//! SQLite adapter
//!
//! The database file named by `config.path` is loaded into memory for every
//! call. Read-class statements run against the copy and are discarded;
//! write-class statements are followed by a full rewrite of the file.

use crate::database::{ConnectionRecord, DatabaseImage};
use crate::engine::adapter::ConnectionAdapter;
use crate::engine::classify::StatementClass;
use crate::engine::result::{Column, QueryResult, Row};
use crate::error::{NebulaError, Result};
use rusqlite::fallible_iterator::FallibleIterator;
use rusqlite::types::ValueRef;
use rusqlite::{Batch, Connection};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqliteAdapter;

impl SqliteAdapter {
    pub const KIND: &'static str = "sqlite";
}

impl SqliteAdapter {
    fn path(connection: &ConnectionRecord) -> Result<&Path> {
        connection
            .config_str("path")
            .map(Path::new)
            .ok_or(NebulaError::MissingConfig {
                kind: Self::KIND,
                key: "path",
            })
    }
}

impl ConnectionAdapter for SqliteAdapter {
    fn data_source(&self, connection: &ConnectionRecord) -> Result<PathBuf> {
        let path = Self::path(connection)?;
        match fs::canonicalize(path) {
            Ok(resolved) => Ok(resolved),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(path.to_path_buf()),
            Err(e) => Err(NebulaError::io(path, e)),
        }
    }

    fn execute(&self, connection: &ConnectionRecord, sql: &str) -> Result<QueryResult> {
        let path = Self::path(connection)?;

        let image = DatabaseImage::load(path)?;
        let statement = sql.trim();

        match StatementClass::of(statement) {
            StatementClass::Read => {
                debug!("read statement on {}", connection.id);
                first_result_set(image.connection(), statement)
            }
            StatementClass::Write => {
                debug!("write statement on {}", connection.id);
                image
                    .connection()
                    .execute_batch(statement)
                    .map_err(execution_error)?;
                image.persist(path)?;
                Ok(QueryResult::ok())
            }
        }
    }
}

/// Run every statement in `sql` and keep the rows of the first one that yields any.
///
/// Statements that produce no rows contribute no result set, so a query over
/// an empty table comes back as an empty tabular result.
fn first_result_set(conn: &Connection, sql: &str) -> Result<QueryResult> {
    let mut batch = Batch::new(conn, sql);
    let mut first: Option<QueryResult> = None;

    while let Some(mut stmt) = batch.next().map_err(execution_error)? {
        let names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let mut rows = stmt.query([]).map_err(execution_error)?;
        let mut collected: Vec<Row> = Vec::new();
        while let Some(row) = rows.next().map_err(execution_error)? {
            if first.is_some() {
                continue;
            }
            let mut obj = Row::new();
            for (idx, name) in names.iter().enumerate() {
                let value = row.get_ref(idx).map_err(execution_error)?;
                obj.insert(name.clone(), to_json(value));
            }
            collected.push(obj);
        }

        if first.is_none() && !collected.is_empty() {
            first = Some(QueryResult::Tabular {
                columns: names.into_iter().map(Column::new).collect(),
                rows: collected,
            });
        }
    }

    Ok(first.unwrap_or_else(QueryResult::empty))
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Array(b.iter().map(|&byte| Value::from(byte)).collect()),
    }
}

fn execution_error(e: rusqlite::Error) -> NebulaError {
    NebulaError::Execution(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};
    use std::fs;
    use std::path::PathBuf;

    fn fixture() -> (tempfile::TempDir, PathBuf, ConnectionRecord) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT, score REAL, raw BLOB);
             INSERT INTO t (name, score, raw) VALUES ('alpha', 1.5, x'0102'), ('beta', NULL, NULL);
             CREATE TABLE empty (id INTEGER);",
        )
        .unwrap();
        drop(conn);

        let mut config = Map::new();
        config.insert("path".to_string(), json!(path.to_string_lossy()));
        let record = ConnectionRecord {
            id: "1".to_string(),
            name: "fixture".to_string(),
            kind: "sqlite".to_string(),
            config,
        };
        (dir, path, record)
    }

    #[test]
    fn test_select_maps_values() {
        let (_dir, _path, record) = fixture();
        let result = SqliteAdapter
            .execute(&record, "SELECT id, name, score, raw FROM t ORDER BY id")
            .unwrap();

        let names: Vec<&str> = result.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "score", "raw"]);
        assert_eq!(
            Value::Object(result.rows()[0].clone()),
            json!({"id": 1, "name": "alpha", "score": 1.5, "raw": [1, 2]})
        );
        assert_eq!(
            Value::Object(result.rows()[1].clone()),
            json!({"id": 2, "name": "beta", "score": null, "raw": null})
        );
    }

    #[test]
    fn test_row_keys_follow_column_order() {
        let (_dir, _path, record) = fixture();
        let result = SqliteAdapter
            .execute(&record, "SELECT name, id FROM t LIMIT 1")
            .unwrap();
        let keys: Vec<&String> = result.rows()[0].keys().collect();
        assert_eq!(keys, vec!["name", "id"]);
    }

    #[test]
    fn test_empty_result_set() {
        let (_dir, _path, record) = fixture();
        let result = SqliteAdapter
            .execute(&record, "SELECT * FROM empty")
            .unwrap();
        assert_eq!(result, QueryResult::empty());
    }

    #[test]
    fn test_multi_statement_read_keeps_first_result_set() {
        let (_dir, _path, record) = fixture();
        let result = SqliteAdapter
            .execute(&record, "SELECT 'first' AS a; SELECT 'second' AS b")
            .unwrap();
        assert_eq!(result.columns(), &[Column::new("a")]);
        assert_eq!(result.rows().len(), 1);
        assert_eq!(result.rows()[0]["a"], json!("first"));
    }

    #[test]
    fn test_read_never_persists() {
        let (_dir, path, record) = fixture();
        let before = fs::read(&path).unwrap();

        // the trailing statement mutates the in-memory copy only
        SqliteAdapter
            .execute(&record, "SELECT 1; DELETE FROM t")
            .unwrap();

        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_pragma_is_read() {
        let (_dir, _path, record) = fixture();
        let result = SqliteAdapter
            .execute(&record, "PRAGMA table_info(t)")
            .unwrap();
        assert_eq!(result.rows().len(), 4);
        assert!(result.columns().iter().any(|c| c.name == "name"));
    }

    #[test]
    fn test_write_persists_and_is_observed() {
        let (_dir, path, record) = fixture();
        let before = fs::read(&path).unwrap();

        let result = SqliteAdapter
            .execute(
                &record,
                "INSERT INTO t (name) VALUES ('gamma'); INSERT INTO t (name) VALUES ('delta')",
            )
            .unwrap();
        assert_eq!(result, QueryResult::ok());
        assert_ne!(fs::read(&path).unwrap(), before);

        let count = SqliteAdapter
            .execute(&record, "SELECT COUNT(*) AS n FROM t")
            .unwrap();
        assert_eq!(count.rows()[0]["n"], json!(4));
    }

    #[test]
    fn test_failed_write_leaves_file_untouched() {
        let (_dir, path, record) = fixture();
        let before = fs::read(&path).unwrap();

        let err = SqliteAdapter
            .execute(&record, "INSERT INTO nowhere VALUES (")
            .unwrap_err();
        assert!(matches!(err, NebulaError::Execution(_)));
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_missing_path_config() {
        let (_dir, _path, mut record) = fixture();
        record.config.clear();
        assert!(matches!(
            SqliteAdapter.execute(&record, "SELECT 1"),
            Err(NebulaError::MissingConfig { key: "path", .. })
        ));

        record.config.insert("path".to_string(), json!(""));
        assert!(matches!(
            SqliteAdapter.execute(&record, "SELECT 1"),
            Err(NebulaError::MissingConfig { .. })
        ));
    }

    #[test]
    fn test_not_a_database() {
        let (_dir, path, record) = fixture();
        fs::write(&path, "not a database ".repeat(300)).unwrap();
        assert!(matches!(
            SqliteAdapter.execute(&record, "SELECT 1"),
            Err(NebulaError::Load { .. })
        ));
    }

    #[test]
    fn test_to_json_non_finite_real() {
        assert_eq!(to_json(ValueRef::Real(f64::NAN)), Value::Null);
        assert_eq!(to_json(ValueRef::Integer(-3)), json!(-3));
        assert_eq!(to_json(ValueRef::Text(b"hi")), json!("hi"));
    }
}
