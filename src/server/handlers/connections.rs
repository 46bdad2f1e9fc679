//! Connection registry handlers
//!
//! `connections.load`, `connections.save` and `connections.delete`. Mutations
//! hold the registry lock so concurrent saves cannot lose each other's records.

use crate::database::ConnectionDraft;
use crate::server::handler::{blocking, IpcContext, IpcError, IpcMethod, IpcRequest, IpcResult};
use crate::server::locks::REGISTRY_KEY;
use crate::server::protocol::Ack;
use crate::server::sink::IpcSink;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// =============================================================================
// connections.load
// =============================================================================

/// Parameters for connections.load (empty)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConnectionsLoadParams {}

/// Handler for connections.load method
pub struct ConnectionsLoadHandler;

#[async_trait]
impl IpcMethod for ConnectionsLoadHandler {
    const METHOD: &'static str = "connections.load";

    type Params = ConnectionsLoadParams;

    async fn handle(
        ctx: Arc<IpcContext>,
        _req: IpcRequest,
        _params: Self::Params,
        sink: IpcSink,
    ) -> IpcResult<()> {
        let connections = blocking(move || ctx.connections.list()).await?;
        sink.send_result(connections)?;
        Ok(())
    }
}

// =============================================================================
// connections.save
// =============================================================================

/// Handler for connections.save method
///
/// Params are the connection itself: `{id?, name, type, config?}`.
pub struct ConnectionsSaveHandler;

#[async_trait]
impl IpcMethod for ConnectionsSaveHandler {
    const METHOD: &'static str = "connections.save";

    type Params = ConnectionDraft;

    fn validate(params: &Self::Params) -> IpcResult<()> {
        if params.kind.trim().is_empty() {
            return Err(IpcError::invalid_params("connection type must not be empty"));
        }
        Ok(())
    }

    async fn handle(
        ctx: Arc<IpcContext>,
        _req: IpcRequest,
        params: Self::Params,
        sink: IpcSink,
    ) -> IpcResult<()> {
        let _guard = ctx.locks.lock(REGISTRY_KEY).await;
        let ctx_for_save = Arc::clone(&ctx);
        let saved = blocking(move || ctx_for_save.connections.upsert(params)).await?;
        sink.send_result(saved)?;
        Ok(())
    }
}

// =============================================================================
// connections.delete
// =============================================================================

/// Parameters for connections.delete
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionsDeleteParams {
    /// Id of the connection to remove; unknown ids succeed
    pub id: String,
}

/// Handler for connections.delete method
pub struct ConnectionsDeleteHandler;

#[async_trait]
impl IpcMethod for ConnectionsDeleteHandler {
    const METHOD: &'static str = "connections.delete";

    type Params = ConnectionsDeleteParams;

    async fn handle(
        ctx: Arc<IpcContext>,
        _req: IpcRequest,
        params: Self::Params,
        sink: IpcSink,
    ) -> IpcResult<()> {
        let _guard = ctx.locks.lock(REGISTRY_KEY).await;
        let ctx_for_remove = Arc::clone(&ctx);
        blocking(move || ctx_for_remove.connections.remove(&params.id)).await?;

        sink.send_result(Ack::ok())?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::handlers::testing;
    use crate::server::protocol::ErrorCode;
    use serde_json::{json, Value};

    #[test]
    fn test_delete_params_deserialization() {
        let params: ConnectionsDeleteParams = serde_json::from_str(r#"{"id": "17"}"#).unwrap();
        assert_eq!(params.id, "17");
        assert!(serde_json::from_str::<ConnectionsDeleteParams>("{}").is_err());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let (_dir, dispatcher) = testing::dispatcher();

        let empty = dispatcher.call("connections.load", Value::Null).await.unwrap();
        assert_eq!(empty, json!([]));

        let saved = dispatcher
            .call(
                "connections.save",
                json!({"name": "local", "type": "sqlite", "config": {"path": "/tmp/a.db"}}),
            )
            .await
            .unwrap();
        let id = saved["id"].as_str().unwrap().to_string();
        assert!(!id.is_empty());
        assert_eq!(saved["type"], "sqlite");

        let loaded = dispatcher.call("connections.load", Value::Null).await.unwrap();
        assert_eq!(loaded, json!([saved]));
    }

    #[tokio::test]
    async fn test_save_without_config_defaults_to_empty_object() {
        let (_dir, dispatcher) = testing::dispatcher();
        let saved = dispatcher
            .call("connections.save", json!({"name": "n", "type": "sqlite"}))
            .await
            .unwrap();
        assert_eq!(saved["config"], json!({}));
    }

    #[tokio::test]
    async fn test_save_invalid_params() {
        let (_dir, dispatcher) = testing::dispatcher();

        let err = dispatcher
            .call("connections.save", json!({"name": "no type"}))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParams);

        let err = dispatcher
            .call("connections.save", json!({"name": "blank", "type": "  "}))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParams);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_dir, dispatcher) = testing::dispatcher();
        let saved = dispatcher
            .call("connections.save", json!({"name": "a", "type": "sqlite"}))
            .await
            .unwrap();

        let ack = dispatcher
            .call("connections.delete", json!({"id": "does-not-exist"}))
            .await
            .unwrap();
        assert_eq!(ack, json!({"ok": true}));
        assert_eq!(
            dispatcher.call("connections.load", Value::Null).await.unwrap(),
            json!([saved.clone()])
        );

        dispatcher
            .call("connections.delete", json!({"id": saved["id"]}))
            .await
            .unwrap();
        assert_eq!(
            dispatcher.call("connections.load", Value::Null).await.unwrap(),
            json!([])
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_keep_every_record() {
        let (_dir, dispatcher) = testing::dispatcher();
        let dispatcher = Arc::new(dispatcher);

        let mut tasks = Vec::new();
        for i in 0..10 {
            let dispatcher = Arc::clone(&dispatcher);
            tasks.push(tokio::spawn(async move {
                dispatcher
                    .call(
                        "connections.save",
                        json!({"name": format!("c{}", i), "type": "sqlite"}),
                    )
                    .await
                    .unwrap()
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let loaded = dispatcher.call("connections.load", Value::Null).await.unwrap();
        let records = loaded.as_array().unwrap();
        assert_eq!(records.len(), 10);

        let mut ids: Vec<_> = records.iter().map(|r| r["id"].clone()).collect();
        ids.sort_by_key(|id| id.to_string());
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }
}
