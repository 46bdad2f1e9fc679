//! Settings handlers
//!
//! `settings.load` returns the stored object (`{"theme": "dark"}` on first
//! use); `settings.save` replaces it wholesale.

use crate::database::Settings;
use crate::server::handler::{blocking, IpcContext, IpcMethod, IpcRequest, IpcResult};
use crate::server::locks::SETTINGS_KEY;
use crate::server::protocol::Ack;
use crate::server::sink::IpcSink;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// =============================================================================
// settings.load
// =============================================================================

/// Parameters for settings.load (empty)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SettingsLoadParams {}

/// Handler for settings.load method
pub struct SettingsLoadHandler;

#[async_trait]
impl IpcMethod for SettingsLoadHandler {
    const METHOD: &'static str = "settings.load";

    type Params = SettingsLoadParams;

    async fn handle(
        ctx: Arc<IpcContext>,
        _req: IpcRequest,
        _params: Self::Params,
        sink: IpcSink,
    ) -> IpcResult<()> {
        let settings = blocking(move || ctx.settings.load()).await?;
        sink.send_result(settings)?;
        Ok(())
    }
}

// =============================================================================
// settings.save
// =============================================================================

/// Handler for settings.save method
///
/// Params are the settings object itself; absent params store `{}`.
pub struct SettingsSaveHandler;

#[async_trait]
impl IpcMethod for SettingsSaveHandler {
    const METHOD: &'static str = "settings.save";

    type Params = Settings;

    async fn handle(
        ctx: Arc<IpcContext>,
        _req: IpcRequest,
        params: Self::Params,
        sink: IpcSink,
    ) -> IpcResult<()> {
        let _guard = ctx.locks.lock(SETTINGS_KEY).await;
        let ctx_for_save = Arc::clone(&ctx);
        blocking(move || ctx_for_save.settings.save(&params)).await?;
        sink.send_result(Ack::ok())?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
