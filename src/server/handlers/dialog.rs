//! File dialog handler
//!
//! `dialog.openFile` asks the configured picker for a file and returns its
//! path, or `null` when the user cancelled.

use crate::server::handler::{blocking, IpcContext, IpcMethod, IpcRequest, IpcResult};
use crate::server::sink::IpcSink;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Parameters for dialog.openFile (empty)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DialogOpenFileParams {}

/// Handler for dialog.openFile method
pub struct DialogOpenFileHandler;

#[async_trait]
impl IpcMethod for DialogOpenFileHandler {
    const METHOD: &'static str = "dialog.openFile";

    type Params = DialogOpenFileParams;

    async fn handle(
        ctx: Arc<IpcContext>,
        _req: IpcRequest,
        _params: Self::Params,
        sink: IpcSink,
    ) -> IpcResult<()> {
        let picked = blocking(move || ctx.picker().pick_file()).await?;
        let path = picked.map(|p| p.to_string_lossy().to_string());
        sink.send_result(path)?;
        Ok(())
    }
}
