//! JSON record files
//!
//! A [`RecordFile`] is a single JSON document on disk (an array or an object)
//! that is created with a default value on first access, read in full on every
//! load and rewritten atomically on every save. There is no in-memory cache:
//! the file is the source of truth.

use crate::error::{NebulaError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A JSON document on disk holding a value of type `T`
#[derive(Debug, Clone)]
pub struct RecordFile<T> {
    path: PathBuf,
    default: T,
}

impl<T> RecordFile<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    pub fn new(path: impl Into<PathBuf>, default: T) -> Self {
        Self {
            path: path.into(),
            default,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Make sure the file exists, writing the default value if it does not.
    ///
    /// Missing parent directories are created. A file that appears while the
    /// default is being written is left as it is.
    pub fn ensure(&self) -> Result<()> {
        match fs::metadata(&self.path) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let content = serde_json::to_string(&self.default)?;
                let tmp = staged(&self.path, content.as_bytes())?;
                match tmp.persist_noclobber(&self.path) {
                    Ok(_) => {
                        info!("created new record file {:?}", self.path);
                        Ok(())
                    }
                    Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Ok(()),
                    Err(e) => Err(NebulaError::io(&self.path, e.error)),
                }
            }
            Err(e) => Err(NebulaError::io(&self.path, e)),
        }
    }

    /// Read the file, falling back to the default value when it does not parse.
    ///
    /// An unparsable file is copied aside to `<name>.corrupt-<unix-millis>`
    /// before the default is returned, so that the next save cannot destroy
    /// the only copy.
    pub fn load(&self) -> Result<T> {
        self.ensure()?;
        let raw = fs::read_to_string(&self.path).map_err(|e| NebulaError::io(&self.path, e))?;
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                let backup = self.preserve_corrupt()?;
                warn!(
                    "failed to parse record file {:?} ({}), using default; original kept at {:?}",
                    self.path, e, backup
                );
                Ok(self.default.clone())
            }
        }
    }

    /// Read the file, failing when it does not parse
    pub fn load_strict(&self) -> Result<T> {
        self.ensure()?;
        let raw = fs::read_to_string(&self.path).map_err(|e| NebulaError::io(&self.path, e))?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Replace the file content with `value`
    pub fn save(&self, value: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(value)?;
        write_atomic(&self.path, content.as_bytes())?;
        debug!("saved record file {:?}", self.path);
        Ok(())
    }

    fn preserve_corrupt(&self) -> Result<PathBuf> {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "records".to_string());
        let backup = self.path.with_file_name(format!(
            "{}.corrupt-{}",
            file_name,
            chrono::Utc::now().timestamp_millis()
        ));
        fs::copy(&self.path, &backup).map_err(|e| NebulaError::io(&backup, e))?;
        Ok(backup)
    }
}

/// Overwrite `path` with `bytes` so that readers see either the old or the new
/// content, never a partial write.
///
/// The bytes go to a temporary file next to the file `path` resolves to, which
/// is then renamed over it. Symlinks are followed and the permissions of an
/// existing file are kept.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let (target, permissions) = write_target(path)?;
    let tmp = staged(&target, bytes)?;
    if let Some(permissions) = permissions {
        tmp.as_file()
            .set_permissions(permissions)
            .map_err(|e| NebulaError::io(tmp.path(), e))?;
    }
    tmp.persist(&target)
        .map_err(|e| NebulaError::io(&target, e.error))?;
    Ok(())
}

/// Resolve the file a write to `path` lands on, with its current permissions.
///
/// A path that does not exist yet is returned unchanged.
pub(crate) fn write_target(path: &Path) -> Result<(PathBuf, Option<fs::Permissions>)> {
    match fs::canonicalize(path) {
        Ok(target) => {
            let permissions = fs::metadata(&target)
                .map_err(|e| NebulaError::io(&target, e))?
                .permissions();
            Ok((target, Some(permissions)))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok((path.to_path_buf(), None)),
        Err(e) => Err(NebulaError::io(path, e)),
    }
}

/// Temporary file holding `bytes`, in the directory of `path`
fn staged(path: &Path, bytes: &[u8]) -> Result<tempfile::NamedTempFile> {
    let dir = parent_dir(path);
    fs::create_dir_all(dir).map_err(|e| NebulaError::io(dir, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| NebulaError::io(dir, e))?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| NebulaError::io(tmp.path(), e))?;
    Ok(tmp)
}

/// Directory a file lives in, `.` for bare file names
pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_ensure_creates_parents_and_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("records.json");
        let file = RecordFile::new(&path, json!([]));

        file.ensure().unwrap();

        assert!(path.exists());
        let raw = fs::read_to_string(&path).unwrap();
        assert_eq!(serde_json::from_str::<Value>(&raw).unwrap(), json!([]));
    }

    #[test]
    fn test_ensure_keeps_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        fs::write(&path, r#"[{"a": 1}]"#).unwrap();

        let file = RecordFile::new(&path, json!([]));
        file.ensure().unwrap();

        assert_eq!(file.load().unwrap(), json!([{"a": 1}]));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let file = RecordFile::new(dir.path().join("settings.json"), json!({"theme": "dark"}));

        file.save(&json!({"theme": "light", "font": 12})).unwrap();

        assert_eq!(file.load().unwrap(), json!({"theme": "light", "font": 12}));
        // pretty printed with two-space indentation
        let raw = fs::read_to_string(file.path()).unwrap();
        assert!(raw.contains("\n  \"theme\""));
    }

    #[test]
    fn test_corrupt_file_falls_back_and_is_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("connections.json");
        fs::write(&path, "{ not json").unwrap();

        let file = RecordFile::new(&path, json!([]));
        assert_eq!(file.load().unwrap(), json!([]));

        let backups: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .filter(|e| {
                e.file_name()
                    .to_string_lossy()
                    .starts_with("connections.json.corrupt-")
            })
            .collect();
        assert_eq!(backups.len(), 1);
        assert_eq!(
            fs::read_to_string(backups[0].path()).unwrap(),
            "{ not json"
        );
    }

    #[test]
    fn test_load_strict_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "[1, 2").unwrap();

        let file = RecordFile::new(&path, json!({}));
        assert!(matches!(
            file.load_strict(),
            Err(NebulaError::Serialization(_))
        ));
    }

    #[test]
    fn test_write_atomic_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        fs::write(&path, b"old content that is longer").unwrap();

        write_atomic(&path, b"new").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"new");
        // no temp files left behind
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_first_load_never_overwrites_concurrent_save() {
        for _ in 0..100 {
            let dir = tempfile::tempdir().unwrap();
            let file = std::sync::Arc::new(RecordFile::new(
                dir.path().join("settings.json"),
                json!({"theme": "dark"}),
            ));

            let loader = {
                let file = std::sync::Arc::clone(&file);
                std::thread::spawn(move || file.load().unwrap())
            };
            file.save(&json!({"theme": "light"})).unwrap();
            loader.join().unwrap();

            assert_eq!(file.load().unwrap(), json!({"theme": "light"}));
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_follows_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real.json");
        let link = dir.path().join("link.json");
        fs::write(&real, "[]").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        write_atomic(&link, b"[1]").unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read(&real).unwrap(), b"[1]");
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "[]").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        write_atomic(&path, b"[2]").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}

