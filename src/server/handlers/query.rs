//! Query handler
//!
//! `query.run` resolves the connection, loads its database, runs the
//! statement and, for writes, persists the result. Calls against the same
//! data file are serialized so that load/execute/persist never interleave,
//! even across connections naming that file through different paths.

use crate::engine::QueryEngine;
use crate::server::handler::{blocking, IpcContext, IpcError, IpcMethod, IpcRequest, IpcResult};
use crate::server::locks::data_source_key;
use crate::server::sink::IpcSink;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// =============================================================================
// query.run
// =============================================================================

/// Parameters for query.run
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRunParams {
    /// Registered connection to run against
    pub connection_id: String,

    /// Statement text; may hold several `;`-separated statements
    pub sql: String,
}

/// Handler for query.run method
pub struct QueryRunHandler;

#[async_trait]
impl IpcMethod for QueryRunHandler {
    const METHOD: &'static str = "query.run";

    type Params = QueryRunParams;

    fn validate(params: &Self::Params) -> IpcResult<()> {
        if params.connection_id.is_empty() {
            return Err(IpcError::invalid_params("connectionId must not be empty"));
        }
        Ok(())
    }

    async fn handle(
        ctx: Arc<IpcContext>,
        _req: IpcRequest,
        params: Self::Params,
        sink: IpcSink,
    ) -> IpcResult<()> {
        let ctx_for_resolve = Arc::clone(&ctx);
        let id = params.connection_id.clone();
        let source = blocking(move || {
            QueryEngine::new(&ctx_for_resolve.connections).data_source(&id)
        })
        .await?;

        let key = data_source_key(&source);
        let guard = ctx.locks.lock(&key).await;
        let ctx_for_run = Arc::clone(&ctx);
        let result = blocking(move || {
            QueryEngine::new(&ctx_for_run.connections).run(&params.connection_id, &params.sql)
        })
        .await;
        drop(guard);
        ctx.locks.forget(&key).await;

        sink.send_result(result?)?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
