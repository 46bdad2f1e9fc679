//! Query results returned to callers

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Column descriptor; `label` and `field` always equal `name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub label: String,
    pub field: String,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            field: name.clone(),
            name,
        }
    }
}

/// One result row keyed by column name, in column order
pub type Row = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfo {
    pub message: String,
}

/// Outcome of a statement: rows for reads, a status object for writes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryResult {
    Tabular { columns: Vec<Column>, rows: Vec<Row> },
    Status { info: StatusInfo },
}

impl QueryResult {
    /// Tabular result with no columns and no rows
    pub fn empty() -> Self {
        QueryResult::Tabular {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Status result `{info: {message: "OK"}}`
    pub fn ok() -> Self {
        QueryResult::Status {
            info: StatusInfo {
                message: "OK".to_string(),
            },
        }
    }

    pub fn is_tabular(&self) -> bool {
        matches!(self, QueryResult::Tabular { .. })
    }

    pub fn columns(&self) -> &[Column] {
        match self {
            QueryResult::Tabular { columns, .. } => columns,
            QueryResult::Status { .. } => &[],
        }
    }

    pub fn rows(&self) -> &[Row] {
        match self {
            QueryResult::Tabular { rows, .. } => rows,
            QueryResult::Status { .. } => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_column_fields_match_name() {
        let col = Column::new("id");
        assert_eq!(col.label, "id");
        assert_eq!(col.field, "id");
    }

    #[test]
    fn test_tabular_serialization() {
        let mut row = Row::new();
        row.insert("id".to_string(), json!(1));
        let result = QueryResult::Tabular {
            columns: vec![Column::new("id")],
            rows: vec![row],
        };
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "columns": [{"name": "id", "label": "id", "field": "id"}],
                "rows": [{"id": 1}]
            })
        );
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_value(QueryResult::ok()).unwrap(),
            json!({"info": {"message": "OK"}})
        );
        assert_eq!(
            serde_json::to_value(QueryResult::empty()).unwrap(),
            json!({"columns": [], "rows": []})
        );
    }

    #[test]
    fn test_deserialize_distinguishes_variants() {
        let status: QueryResult =
            serde_json::from_value(json!({"info": {"message": "OK"}})).unwrap();
        assert!(!status.is_tabular());

        let tabular: QueryResult =
            serde_json::from_value(json!({"columns": [], "rows": []})).unwrap();
        assert!(tabular.is_tabular());
        assert!(tabular.rows().is_empty());
    }
}
