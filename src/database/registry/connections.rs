//! Connection registry
//!
//! Connection records live in a single JSON array on disk. Every operation
//! re-reads the array before acting on it, so there is nothing to invalidate
//! when another process edits the file.

use crate::config::NebulaConfig;
use crate::database::core::RecordFile;
use crate::error::{NebulaError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::info;

/// A named, persisted pointer to a data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub id: String,
    pub name: String,
    /// Adapter discriminator, e.g. `sqlite`
    #[serde(rename = "type")]
    pub kind: String,
    /// Adapter-specific settings, opaque to the registry
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl ConnectionRecord {
    /// String value of a config key, if present and non-empty
    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.config
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// A connection as submitted for saving; `id` and `config` may be omitted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,
}

pub struct ConnectionRegistry {
    file: RecordFile<Vec<ConnectionRecord>>,
}

impl ConnectionRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: RecordFile::new(path, Vec::new()),
        }
    }

    pub fn from_config(config: &NebulaConfig) -> Self {
        Self::new(config.connections_path())
    }

    /// Create the connections file if it does not exist yet
    pub fn ensure(&self) -> Result<()> {
        self.file.ensure()
    }

    /// All connections in insertion order
    pub fn list(&self) -> Result<Vec<ConnectionRecord>> {
        self.file.load()
    }

    /// Look up a connection in the current on-disk snapshot
    pub fn find(&self, id: &str) -> Result<Option<ConnectionRecord>> {
        Ok(self.list()?.into_iter().find(|c| c.id == id))
    }

    /// Like [`find`](Self::find), failing with `NotFound` when the id is unknown
    pub fn get(&self, id: &str) -> Result<ConnectionRecord> {
        self.find(id)?
            .ok_or_else(|| NebulaError::connection_not_found(id))
    }

    /// Insert or fully replace a connection.
    ///
    /// A draft whose id matches an existing record replaces that record in
    /// place. Any other draft gets a freshly generated id and is appended.
    pub fn upsert(&self, draft: ConnectionDraft) -> Result<ConnectionRecord> {
        let mut list = self.list()?;

        let position = draft
            .id
            .as_deref()
            .and_then(|id| list.iter().position(|c| c.id == id));

        let id = match position {
            Some(idx) => list[idx].id.clone(),
            None => generate_id(&list),
        };

        let record = ConnectionRecord {
            id,
            name: draft.name,
            kind: draft.kind,
            config: draft.config.unwrap_or_default(),
        };

        match position {
            Some(idx) => list[idx] = record.clone(),
            None => list.push(record.clone()),
        }

        self.file.save(&list)?;
        info!("saved connection {} ({})", record.id, record.name);
        Ok(record)
    }

    /// Remove a connection; removing an unknown id is not an error.
    ///
    /// Returns whether a record was actually removed.
    pub fn remove(&self, id: &str) -> Result<bool> {
        let list = self.list()?;
        let before = list.len();
        let filtered: Vec<ConnectionRecord> = list.into_iter().filter(|c| c.id != id).collect();
        let removed = filtered.len() != before;

        self.file.save(&filtered)?;
        if removed {
            info!("deleted connection {}", id);
        }
        Ok(removed)
    }
}

/// Millisecond timestamp id, bumped until it collides with nothing in `existing`
fn generate_id(existing: &[ConnectionRecord]) -> String {
    let mut candidate = chrono::Utc::now().timestamp_millis();
    loop {
        let id = candidate.to_string();
        if !existing.iter().any(|c| c.id == id) {
            return id;
        }
        candidate += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft(name: &str) -> ConnectionDraft {
        ConnectionDraft {
            id: None,
            name: name.to_string(),
            kind: "sqlite".to_string(),
            config: None,
        }
    }

    fn registry(dir: &tempfile::TempDir) -> ConnectionRegistry {
        ConnectionRegistry::new(dir.path().join("connections.json"))
    }

    #[test]
    fn test_list_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir);
        assert!(registry.list().unwrap().is_empty());
        assert!(dir.path().join("connections.json").exists());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir);

        let mut d = draft("local");
        d.config = Some(json!({"path": "/tmp/a.db"}).as_object().unwrap().clone());
        let saved = registry.upsert(d).unwrap();

        assert!(!saved.id.is_empty());
        assert_eq!(saved.config_str("path"), Some("/tmp/a.db"));
        assert_eq!(registry.list().unwrap(), vec![saved]);
    }

    #[test]
    fn test_config_defaults_to_empty_object() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir);

        let saved = registry.upsert(draft("bare")).unwrap();
        assert!(saved.config.is_empty());

        let raw = std::fs::read_to_string(dir.path().join("connections.json")).unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["config"], json!({}));
        assert_eq!(value[0]["type"], json!("sqlite"));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir);

        let ids: Vec<String> = (0..5)
            .map(|i| registry.upsert(draft(&format!("c{i}"))).unwrap().id)
            .collect();
        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());
    }

    #[test]
    fn test_upsert_preserves_position() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir);

        let a = registry.upsert(draft("A")).unwrap();
        let b = registry.upsert(draft("B")).unwrap();
        let c = registry.upsert(draft("C")).unwrap();

        let updated = registry
            .upsert(ConnectionDraft {
                id: Some(b.id.clone()),
                name: "B2".to_string(),
                kind: "sqlite".to_string(),
                config: Some(json!({"path": "/x.db"}).as_object().unwrap().clone()),
            })
            .unwrap();
        assert_eq!(updated.id, b.id);

        let names: Vec<String> = registry
            .list()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["A", "B2", "C"]);
        assert_eq!(registry.list().unwrap()[0], a);
        assert_eq!(registry.list().unwrap()[2], c);
    }

    #[test]
    fn test_upsert_is_full_replace() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir);

        let mut d = draft("A");
        d.config = Some(json!({"path": "/a.db", "extra": 1}).as_object().unwrap().clone());
        let saved = registry.upsert(d).unwrap();

        let replaced = registry
            .upsert(ConnectionDraft {
                id: Some(saved.id.clone()),
                ..draft("A")
            })
            .unwrap();
        assert!(replaced.config.is_empty());
    }

    #[test]
    fn test_unknown_id_gets_new_id_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir);
        registry.upsert(draft("A")).unwrap();

        let saved = registry
            .upsert(ConnectionDraft {
                id: Some("does-not-exist".to_string()),
                ..draft("B")
            })
            .unwrap();

        assert_ne!(saved.id, "does-not-exist");
        let list = registry.list().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1], saved);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir);
        let a = registry.upsert(draft("A")).unwrap();
        let b = registry.upsert(draft("B")).unwrap();

        assert!(!registry.remove("missing").unwrap());
        assert_eq!(registry.list().unwrap(), vec![a.clone(), b.clone()]);

        assert!(registry.remove(&a.id).unwrap());
        assert!(!registry.remove(&a.id).unwrap());
        assert_eq!(registry.list().unwrap(), vec![b]);
    }

    #[test]
    fn test_get_unknown_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry(&dir);
        assert!(matches!(
            registry.get("nope"),
            Err(NebulaError::NotFound { resource: "connection", .. })
        ));
    }

    #[test]
    fn test_draft_deserialization() {
        let d: ConnectionDraft =
            serde_json::from_str(r#"{"name": "n", "type": "sqlite"}"#).unwrap();
        assert!(d.id.is_none());
        assert!(d.config.is_none());

        let missing_type = serde_json::from_str::<ConnectionDraft>(r#"{"name": "n"}"#);
        assert!(missing_type.is_err());
    }
}
