//! System handlers for introspection methods
//!
//! This module provides handlers for system-level methods like `system.info`
//! which allow clients to discover server capabilities.

use crate::server::handler::{IpcContext, IpcMethod, IpcRequest, IpcResult};
use crate::server::protocol::SystemInfo;
use crate::server::sink::IpcSink;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// =============================================================================
// system.info
// =============================================================================

/// Parameters for system.info (empty)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SystemInfoParams {}

/// Handler for system.info method
pub struct SystemInfoHandler;

#[async_trait]
impl IpcMethod for SystemInfoHandler {
    const METHOD: &'static str = "system.info";

    type Params = SystemInfoParams;

    async fn handle(
        ctx: Arc<IpcContext>,
        _req: IpcRequest,
        _params: Self::Params,
        sink: IpcSink,
    ) -> IpcResult<()> {
        sink.send_result(SystemInfo::new(ctx.data_dir()))?;
        Ok(())
    }
}

// =============================================================================
// system.methods
// =============================================================================

/// Parameters for system.methods (empty)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SystemMethodsParams {}

/// Response for system.methods
#[derive(Debug, Clone, Serialize)]
pub struct SystemMethodsResponse {
    /// Sorted list of available methods
    pub methods: Vec<&'static str>,
}

/// Handler for system.methods
pub struct SystemMethodsHandler;

#[async_trait]
impl IpcMethod for SystemMethodsHandler {
    const METHOD: &'static str = "system.methods";

    type Params = SystemMethodsParams;

    async fn handle(
        ctx: Arc<IpcContext>,
        _req: IpcRequest,
        _params: Self::Params,
        sink: IpcSink,
    ) -> IpcResult<()> {
        sink.send_result(SystemMethodsResponse {
            methods: ctx.methods().to_vec(),
        })?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
