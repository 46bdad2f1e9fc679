//! Persistent registries built on JSON record files
//!
//! - `connections`: the connection registry (`connections.json`)
//! - `settings`: the application settings object (`settings.json`)

mod connections;
mod settings;

pub use connections::{ConnectionDraft, ConnectionRecord, ConnectionRegistry};
pub use settings::{default_settings, Settings, SettingsStore};
