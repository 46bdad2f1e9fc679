//! Request-scoped reply sink
//!
//! `IpcSink` carries exactly one terminal response (result or error) for a
//! request back to the transport. Sending a second terminal message fails.

use crate::server::protocol::{ErrorData, ResponseEnvelope};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

/// Errors that can occur when sending via [`IpcSink`]
#[derive(Debug, Clone, Error)]
pub enum IpcSinkError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The transport side of the channel has gone away
    #[error("Send error: reply channel closed")]
    Closed,
    #[error("terminal message already sent")]
    TerminalAlreadySent,
}

#[derive(Clone)]
pub struct IpcSink {
    tx: UnboundedSender<ResponseEnvelope>,
    id: String,
    terminal_sent: Arc<AtomicBool>,
}

impl IpcSink {
    pub fn new(tx: UnboundedSender<ResponseEnvelope>, id: String) -> Self {
        Self {
            tx,
            id,
            terminal_sent: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn terminal_sent(&self) -> bool {
        self.terminal_sent.load(Ordering::SeqCst)
    }

    /// Send the successful result for this request
    pub fn send_result<T: Serialize>(&self, data: T) -> Result<(), IpcSinkError> {
        let data =
            serde_json::to_value(data).map_err(|e| IpcSinkError::Serialization(e.to_string()))?;
        self.mark_terminal()?;
        self.send(ResponseEnvelope::result(self.id.clone(), data))
    }

    /// Send the error response for this request
    pub fn send_error(&self, error: ErrorData) -> Result<(), IpcSinkError> {
        self.mark_terminal()?;
        self.send(ResponseEnvelope::error(self.id.clone(), error))
    }

    fn mark_terminal(&self) -> Result<(), IpcSinkError> {
        self.terminal_sent
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(|_| IpcSinkError::TerminalAlreadySent)
    }

    fn send(&self, envelope: ResponseEnvelope) -> Result<(), IpcSinkError> {
        self.tx.send(envelope).map_err(|_| IpcSinkError::Closed)
    }
}
