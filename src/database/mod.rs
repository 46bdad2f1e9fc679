//! Database module
//!
//! This module provides all persistence for nebula, organized into:
//!
//! - **core**: storage primitives (JSON record files, in-memory SQLite images)
//! - **registry**: the connection registry and the settings store
//!
//! # Architecture
//!
//! ```text
//! database/
//! ├── core/             # Foundation
//! │   ├── record_file   # JSON document on disk, create-if-absent, atomic save
//! │   └── image         # SQLite file loaded wholesale into memory
//! │
//! └── registry/         # Persistent records
//!     ├── connections   # connections.json (array)
//!     └── settings      # settings.json (object)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use nebula::database::{ConnectionDraft, ConnectionRegistry};
//!
//! let registry = ConnectionRegistry::new("/tmp/nebula/connections.json");
//! let saved = registry.upsert(ConnectionDraft {
//!     id: None,
//!     name: "local".to_string(),
//!     kind: "sqlite".to_string(),
//!     config: None,
//! })?;
//! assert_eq!(registry.list()?, vec![saved]);
//! ```

pub mod core;
pub mod registry;

pub use core::{write_atomic, DatabaseImage, RecordFile};
pub use registry::{
    default_settings, ConnectionDraft, ConnectionRecord, ConnectionRegistry, Settings,
    SettingsStore,
};
