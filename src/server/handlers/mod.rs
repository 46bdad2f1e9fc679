//! Façade method handlers
//!
//! Each handler implements the `IpcMethod` trait and provides one operation.
//!
//! # Handler Organization
//!
//! Handlers are organized by namespace:
//!
//! - `system` - Introspection methods (system.info, system.methods)
//! - `connections` - Connection registry (connections.load, connections.save, connections.delete)
//! - `settings` - Application settings (settings.load, settings.save)
//! - `query` - Statement execution (query.run)
//! - `dialog` - File selection (dialog.openFile)

pub mod connections;
pub mod dialog;
pub mod query;
pub mod settings;
pub mod system;

// Re-export all handlers for convenience
pub use connections::{
    ConnectionsDeleteHandler, ConnectionsLoadHandler, ConnectionsSaveHandler,
};
pub use dialog::DialogOpenFileHandler;
pub use query::QueryRunHandler;
pub use settings::{SettingsLoadHandler, SettingsSaveHandler};
pub use system::{SystemInfoHandler, SystemMethodsHandler};
