//! Handler trait and context module for façade methods
//!
//! This module defines the `IpcMethod` trait which all method handlers
//! implement, along with the `IpcContext` which gives them access to the
//! connection registry, the settings store, the file picker and the
//! serialization locks.

use crate::config::NebulaConfig;
use crate::database::{ConnectionRegistry, SettingsStore};
use crate::dialog::{picker_from_config, FilePicker};
use crate::error::NebulaError;
use crate::server::locks::KeyedLocks;
use crate::server::protocol::{ErrorCode, ErrorData, RequestEnvelope};
use crate::server::sink::{IpcSink, IpcSinkError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

// =============================================================================
// Context
// =============================================================================

/// Shared state handed to every handler
pub struct IpcContext {
    /// Nebula configuration (data_dir, file picker)
    pub config: NebulaConfig,

    /// Registry of saved connections (`connections.json`)
    pub connections: ConnectionRegistry,

    /// Application settings (`settings.json`)
    pub settings: SettingsStore,

    /// Serialization locks for the registry, the settings and each connection
    pub locks: KeyedLocks,

    picker: Box<dyn FilePicker>,

    /// Registered method names, filled in by the dispatcher
    methods: Vec<&'static str>,
}

impl IpcContext {
    /// Create a context from NebulaConfig
    pub fn from_config(config: NebulaConfig) -> Self {
        let picker = picker_from_config(config.file_picker.as_deref());
        Self {
            connections: ConnectionRegistry::from_config(&config),
            settings: SettingsStore::from_config(&config),
            locks: KeyedLocks::new(),
            picker,
            methods: Vec::new(),
            config,
        }
    }

    /// Replace the file picker
    pub fn with_picker(mut self, picker: Box<dyn FilePicker>) -> Self {
        self.picker = picker;
        self
    }

    /// Create the data directory and both record files if absent
    pub fn init(&self) -> crate::error::Result<()> {
        self.connections.ensure()?;
        self.settings.ensure()
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &str {
        &self.config.data_dir
    }

    pub fn picker(&self) -> &dyn FilePicker {
        self.picker.as_ref()
    }

    /// Names of all methods the dispatcher routes, sorted
    pub fn methods(&self) -> &[&'static str] {
        &self.methods
    }

    pub(crate) fn set_methods(&mut self, mut methods: Vec<&'static str>) {
        methods.sort_unstable();
        self.methods = methods;
    }
}

impl Default for IpcContext {
    fn default() -> Self {
        Self::from_config(NebulaConfig::default())
    }
}

// =============================================================================
// Request
// =============================================================================

/// Processed request with guaranteed ID
#[derive(Debug, Clone)]
pub struct IpcRequest {
    /// Request correlation ID (client-provided or server-generated)
    pub id: String,

    /// Method name
    pub method: String,

    /// Raw parameters
    pub params: Value,
}

impl IpcRequest {
    /// Create a new request from an envelope, generating an ID if not provided
    pub fn from_envelope(envelope: RequestEnvelope) -> Self {
        let id = envelope
            .id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        Self {
            id,
            method: envelope.method,
            params: envelope.params,
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Result type for handlers
pub type IpcResult<T> = Result<T, IpcError>;

/// Error type for handlers
#[derive(Debug, Clone)]
pub struct IpcError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<Value>,
}

impl IpcError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParams, message)
    }

    pub fn operation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::OperationFailed, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Convert to ErrorData
    pub fn to_error_data(&self) -> ErrorData {
        match &self.details {
            Some(details) => {
                ErrorData::with_details(self.code, self.message.clone(), details.clone())
            }
            None => ErrorData::new(self.code, self.message.clone()),
        }
    }
}

impl std::fmt::Display for IpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for IpcError {}

impl From<NebulaError> for IpcError {
    fn from(err: NebulaError) -> Self {
        let code = match &err {
            NebulaError::NotFound { .. } => ErrorCode::NotFound,
            NebulaError::UnsupportedType(_) => ErrorCode::UnsupportedType,
            NebulaError::MissingConfig { .. } => ErrorCode::MissingConfig,
            NebulaError::Load { .. } => ErrorCode::LoadFailed,
            NebulaError::Execution(_) => ErrorCode::ExecutionFailed,
            NebulaError::Io { .. } => ErrorCode::IoError,
            NebulaError::Serialization(_) => ErrorCode::InternalError,
        };
        let mut error = Self::new(code, err.to_string());
        if let NebulaError::Load { path, .. } | NebulaError::Io { path, .. } = &err {
            error.details = Some(serde_json::json!({ "path": path.to_string_lossy() }));
        }
        error
    }
}

impl From<anyhow::Error> for IpcError {
    fn from(err: anyhow::Error) -> Self {
        Self::operation_failed(err.to_string())
    }
}

impl From<serde_json::Error> for IpcError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_params(err.to_string())
    }
}

impl From<IpcSinkError> for IpcError {
    fn from(err: IpcSinkError) -> Self {
        Self::internal(err.to_string())
    }
}

/// Run blocking filesystem/database work off the async executor
pub async fn blocking<T, E, F>(f: F) -> IpcResult<T>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<IpcError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| IpcError::internal(format!("worker task failed: {}", e)))?
        .map_err(Into::into)
}

// =============================================================================
// Handler Trait
// =============================================================================

/// Trait for façade method handlers
///
/// Each method handler implements this trait to define:
/// - The method name (e.g., "query.run")
/// - How to parse and validate parameters
/// - How to execute the method
#[async_trait]
pub trait IpcMethod: Send + Sync + 'static {
    /// Fully qualified method name, e.g., "connections.save"
    const METHOD: &'static str;

    /// Parameter type for this method
    type Params: DeserializeOwned + Send;

    /// Validate parameters after parsing
    fn validate(_params: &Self::Params) -> IpcResult<()> {
        Ok(())
    }

    /// Execute the method, sending exactly one result via the sink
    async fn handle(
        ctx: Arc<IpcContext>,
        req: IpcRequest,
        params: Self::Params,
        sink: IpcSink,
    ) -> IpcResult<()>;
}

// =============================================================================
// Handler Registration
// =============================================================================

/// Type-erased handler function
pub type DynHandler = Box<
    dyn Fn(Arc<IpcContext>, IpcRequest, IpcSink) -> futures::future::BoxFuture<'static, IpcResult<()>>
        + Send
        + Sync,
>;

/// Create a type-erased handler from an IpcMethod implementation
pub fn make_handler<M: IpcMethod>() -> DynHandler {
    Box::new(move |ctx, req, sink| {
        Box::pin(async move {
            // absent params behave like an empty object
            let raw = match &req.params {
                Value::Null => Value::Object(Default::default()),
                other => other.clone(),
            };
            let params: M::Params = serde_json::from_value(raw)?;

            M::validate(&params)?;

            M::handle(ctx, req, params, sink).await
        })
    })
}

// =============================================================================
// Tests
// =============================================================================
