//! In-memory SQLite database images
//!
//! A [`DatabaseImage`] holds the complete content of a SQLite file inside an
//! in-memory connection. Loading copies every page of the file into memory
//! through a read-only handle, so the file is never touched; persisting copies
//! the whole in-memory database back out and atomically replaces the file.
//! The connection is closed when the image is dropped.

use crate::database::core::record_file::{parent_dir, write_target};
use crate::error::{NebulaError, Result};
use rusqlite::backup::Backup;
use rusqlite::{Connection, OpenFlags};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Pages copied per backup step
const PAGES_PER_STEP: std::os::raw::c_int = 1024;

pub struct DatabaseImage {
    conn: Connection,
}

impl DatabaseImage {
    /// Load the database stored at `path` into memory.
    ///
    /// Fails with [`NebulaError::Io`] when the file cannot be read and with
    /// [`NebulaError::Load`] when its content is not a SQLite database.
    pub fn load(path: &Path) -> Result<Self> {
        let size = fs::metadata(path)
            .map_err(|e| NebulaError::io(path, e))?
            .len();

        let load_err = |e: rusqlite::Error| NebulaError::Load {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let source = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(load_err)?;

        // reading the page size is the first access to the file header
        let page_size: i64 = source
            .query_row("PRAGMA page_size", [], |row| row.get(0))
            .map_err(load_err)?;

        let mut conn = Connection::open_in_memory().map_err(load_err)?;
        conn.execute_batch(&format!("PRAGMA page_size = {}", page_size))
            .map_err(load_err)?;
        {
            let backup = Backup::new(&source, &mut conn).map_err(load_err)?;
            backup
                .run_to_completion(PAGES_PER_STEP, Duration::ZERO, None)
                .map_err(load_err)?;
        }

        debug!("loaded {} bytes from {:?} into memory", size, path);
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Write the whole in-memory database over the file at `path`.
    ///
    /// The image is written to a temporary file next to the file `path`
    /// resolves to and renamed over it, so readers never observe a
    /// half-written database. Symlinks are followed and the file keeps its
    /// permissions.
    pub fn persist(&self, path: &Path) -> Result<()> {
        let (target, permissions) = write_target(path)?;
        let dir = parent_dir(&target);
        let tmp = tempfile::Builder::new()
            .prefix(".nebula-")
            .suffix(".sqlite-tmp")
            .tempfile_in(dir)
            .map_err(|e| NebulaError::io(dir, e))?;

        let write_err =
            |e: rusqlite::Error| NebulaError::io(tmp.path(), std::io::Error::other(e));
        {
            let mut out = Connection::open(tmp.path()).map_err(write_err)?;
            Backup::new(&self.conn, &mut out)
                .and_then(|backup| backup.run_to_completion(PAGES_PER_STEP, Duration::ZERO, None))
                .map_err(write_err)?;
        }

        if let Some(permissions) = permissions {
            tmp.as_file()
                .set_permissions(permissions)
                .map_err(|e| NebulaError::io(tmp.path(), e))?;
        }
        tmp.persist(&target)
            .map_err(|e| NebulaError::io(&target, e.error))?;
        debug!("persisted in-memory database to {:?}", path);
        Ok(())
    }

    /// Close the connection, reporting any error SQLite raises on close
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| NebulaError::Execution(e.to_string()))
    }
}
