#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! Nebula - connection registry and query engine for a local database client
//!
//! Nebula keeps a small registry of named data sources, stores application
//! settings, and runs SQL statements against SQLite database files. It is the
//! backend of a desktop client: the GUI shell talks to it through a
//! request/response façade, and the same façade drives the `nebula` CLI.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | `display` | Table formatting with `tabled` | `tabled` |
//! | `cli` | CLI binary | `display` + `clap`, `tracing-subscriber` |
//!
//! # Architecture
//!
//! - **[`database`]**: persistence
//!   - `core`: JSON record files and in-memory SQLite images
//!   - `registry`: the connection registry and the settings store
//! - **[`engine`]**: statement classification, adapters and query results
//! - **[`server`]**: the request/response façade and its stdio transport
//! - **[`dialog`]**: file selection for new connections
//! - **[`config`]**: configuration management
//! - **[`output`]**: output formats shared by CLI commands
//!
//! # Quick Start
//!
//! ## Registry and query engine
//!
//! ```rust,ignore
//! use nebula::database::{ConnectionDraft, ConnectionRegistry};
//! use nebula::engine::QueryEngine;
//!
//! let registry = ConnectionRegistry::new("/tmp/nebula/connections.json");
//! let conn = registry.upsert(ConnectionDraft {
//!     id: None,
//!     name: "app".to_string(),
//!     kind: "sqlite".to_string(),
//!     config: serde_json::json!({"path": "/tmp/app.db"}).as_object().cloned(),
//! })?;
//!
//! let engine = QueryEngine::new(&registry);
//! engine.run(&conn.id, "CREATE TABLE t (v INTEGER)")?;
//! let result = engine.run(&conn.id, "SELECT * FROM t")?;
//! ```
//!
//! ## Façade
//!
//! ```rust,ignore
//! use nebula::server::{create_router, Dispatcher, IpcContext};
//! use nebula::NebulaConfig;
//!
//! let config = NebulaConfig::new(&None)?;
//! let dispatcher = Dispatcher::new(create_router(), IpcContext::from_config(config));
//! let settings = dispatcher.call("settings.load", serde_json::Value::Null).await?;
//! ```

pub mod config;
pub mod database;
pub mod dialog;
pub mod engine;
pub mod error;
pub mod output;
pub mod server;

// =============================================================================
// Configuration and errors
// =============================================================================

pub use config::NebulaConfig;
pub use error::{NebulaError, Result};

// =============================================================================
// Database Module
// =============================================================================

pub use database::{
    default_settings, ConnectionDraft, ConnectionRecord, ConnectionRegistry, DatabaseImage,
    RecordFile, Settings, SettingsStore,
};

// =============================================================================
// Engine Module
// =============================================================================

pub use engine::{
    Adapter, Column, ConnectionAdapter, QueryEngine, QueryResult, Row, SqliteAdapter,
    StatementClass,
};

// =============================================================================
// Façade
// =============================================================================

pub use dialog::{CommandFilePicker, FilePicker, NoFilePicker};
pub use output::OutputFormat;
pub use server::{create_router, Dispatcher, IpcContext, IpcMethod, Router};
