use nebula::server::{serve_stdio, Dispatcher};
use std::sync::Arc;

pub async fn run(dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
    serve_stdio(dispatcher).await
}
