//! Request/response façade for nebula
//!
//! The façade is the single entry point the GUI shell (or any other client)
//! uses: it accepts named requests, routes them to handlers and answers each
//! with exactly one result or error envelope.
//!
//! # Architecture
//!
//! - `protocol` - Protocol types (request/response envelopes, error codes)
//! - `handler` - Handler trait and context for method implementations
//! - `sink` - Request-scoped reply sink enforcing a single terminal response
//! - `locks` - Keyed locks serializing work per connection and per record file
//! - `router` - Registry-based method routing and dispatch
//! - `handlers` - Individual method handler implementations
//! - `stdio` - Line-delimited JSON transport over stdin/stdout
//!
//! # Usage
//!
//! ```rust,ignore
//! use nebula::server::{create_router, Dispatcher, IpcContext};
//!
//! let context = IpcContext::from_config(config);
//! let dispatcher = Dispatcher::new(create_router(), context);
//! let connections = dispatcher.call("connections.load", serde_json::Value::Null).await?;
//! ```

pub mod handler;
pub mod handlers;
pub mod locks;
pub mod protocol;
pub mod router;
pub mod sink;
pub mod stdio;

// Re-export commonly used types
pub use handler::{IpcContext, IpcError, IpcMethod, IpcRequest, IpcResult};
pub use locks::KeyedLocks;
pub use protocol::{
    Ack, ErrorCode, ErrorData, RequestEnvelope, ResponseEnvelope, ResponseType, SystemInfo,
};
pub use router::{Dispatcher, Router};
pub use sink::{IpcSink, IpcSinkError};
pub use stdio::{serve, serve_stdio};

// =============================================================================
// Router Creation
// =============================================================================

/// Create a router with all handlers registered
pub fn create_router() -> Router {
    use handlers::*;

    let mut router = Router::new();

    // System handlers
    router.register::<SystemInfoHandler>();
    router.register::<SystemMethodsHandler>();

    // Connection registry handlers
    router.register::<ConnectionsLoadHandler>();
    router.register::<ConnectionsSaveHandler>();
    router.register::<ConnectionsDeleteHandler>();

    // Settings handlers
    router.register::<SettingsLoadHandler>();
    router.register::<SettingsSaveHandler>();

    // Query handlers
    router.register::<QueryRunHandler>();

    // Dialog handlers
    router.register::<DialogOpenFileHandler>();

    router
}

// =============================================================================
// Tests
// =============================================================================
