//! Router module for registry-based method dispatch
//!
//! This module provides the `Router`, which maintains a registry of method
//! handlers, and the `Dispatcher`, which parses request envelopes, runs the
//! matching handler and guarantees exactly one terminal response.

use crate::server::handler::{make_handler, DynHandler, IpcContext, IpcMethod, IpcRequest};
use crate::server::protocol::{ErrorData, RequestEnvelope, ResponseEnvelope};
use crate::server::sink::IpcSink;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, warn};

// =============================================================================
// Router
// =============================================================================

/// Router mapping method names to handlers
pub struct Router {
    handlers: HashMap<&'static str, DynHandler>,
}

impl Router {
    /// Create a new empty router
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a method handler
    pub fn register<M: IpcMethod>(&mut self) -> &mut Self {
        self.handlers.insert(M::METHOD, make_handler::<M>());
        self
    }

    /// Check if a method is registered
    pub fn has_method(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Get all registered method names
    pub fn method_names(&self) -> Vec<&'static str> {
        self.handlers.keys().copied().collect()
    }

    /// Get the handler for a method
    pub fn get_handler(&self, method: &str) -> Option<&DynHandler> {
        self.handlers.get(method)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Message Dispatcher
// =============================================================================

/// Dispatcher combining the router with the shared handler context
pub struct Dispatcher {
    router: Arc<Router>,
    context: Arc<IpcContext>,
}

impl Dispatcher {
    /// Create a new dispatcher
    pub fn new(router: Router, mut context: IpcContext) -> Self {
        context.set_methods(router.method_names());
        Self {
            router: Arc::new(router),
            context: Arc::new(context),
        }
    }

    /// Get a reference to the context
    pub fn context(&self) -> &Arc<IpcContext> {
        &self.context
    }

    /// Dispatch one raw JSON message; the response is sent on `tx`
    pub async fn dispatch(&self, message: &str, tx: UnboundedSender<ResponseEnvelope>) {
        match serde_json::from_str::<RequestEnvelope>(message) {
            Ok(envelope) => self.dispatch_envelope(envelope, tx).await,
            Err(e) => {
                let id = uuid::Uuid::new_v4().to_string();
                let sink = IpcSink::new(tx, id);
                let _ = sink.send_error(ErrorData::invalid_request(format!(
                    "Failed to parse request: {}",
                    e
                )));
            }
        }
    }

    /// Dispatch a parsed envelope
    ///
    /// 1. Assigns an id if the client gave none
    /// 2. Validates the method exists
    /// 3. Executes the handler
    /// 4. Ensures a terminal response is sent
    pub async fn dispatch_envelope(
        &self,
        envelope: RequestEnvelope,
        tx: UnboundedSender<ResponseEnvelope>,
    ) {
        let request = IpcRequest::from_envelope(envelope);
        let sink = IpcSink::new(tx, request.id.clone());

        let Some(handler) = self.router.get_handler(&request.method) else {
            warn!("unknown method {}", request.method);
            let _ = sink.send_error(ErrorData::unknown_method(&request.method));
            return;
        };

        debug!("dispatching {} (id {})", request.method, request.id);
        let method = request.method.clone();
        let result = handler(Arc::clone(&self.context), request, sink.clone()).await;

        match result {
            Err(e) => {
                debug!("{} failed: {}", method, e);
                let _ = sink.send_error(e.to_error_data());
            }
            Ok(()) if !sink.terminal_sent() => {
                let _ = sink.send_error(ErrorData::internal(format!(
                    "{} completed without a result",
                    method
                )));
            }
            Ok(()) => {}
        }
    }

    /// Invoke a method in-process and return its result payload
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, ErrorData> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let envelope = RequestEnvelope {
            id: None,
            method: method.to_string(),
            params,
        };
        self.dispatch_envelope(envelope, tx).await;

        let response = rx
            .recv()
            .await
            .ok_or_else(|| ErrorData::internal("no response produced"))?;

        if response.is_error() {
            Err(serde_json::from_value(response.data)
                .unwrap_or_else(|e| ErrorData::internal(e.to_string())))
        } else {
            Ok(response.data)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
