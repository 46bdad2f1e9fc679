//! Line-delimited JSON transport
//!
//! Each input line is one request envelope; each output line is one response
//! envelope. Requests are dispatched concurrently, so responses may arrive out
//! of order and must be matched by `id`. Blank lines are skipped.

use crate::server::protocol::ResponseEnvelope;
use crate::server::router::Dispatcher;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

/// Serve requests from `reader` until EOF, writing responses to `writer`.
///
/// Returns once every in-flight request has been answered.
pub async fn serve<R, W>(dispatcher: Arc<Dispatcher>, reader: R, writer: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<ResponseEnvelope>();

    let writer_task = tokio::spawn(async move {
        let mut writer = writer;
        while let Some(envelope) = rx.recv().await {
            let mut line = serde_json::to_vec(&envelope)?;
            line.push(b'\n');
            writer.write_all(&line).await?;
            writer.flush().await?;
        }
        Ok::<_, anyhow::Error>(())
    });

    let mut in_flight = JoinSet::new();
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        debug!("received: {}", line);

        let dispatcher = Arc::clone(&dispatcher);
        let tx = tx.clone();
        in_flight.spawn(async move { dispatcher.dispatch(&line, tx).await });
    }
    info!("input closed, waiting for {} pending requests", in_flight.len());

    while let Some(joined) = in_flight.join_next().await {
        if let Err(e) = joined {
            error!("request task failed: {}", e);
        }
    }
    drop(tx);

    writer_task
        .await
        .map_err(|e| anyhow::anyhow!("writer task failed: {}", e))?
}

/// Serve on the process's stdin and stdout
pub async fn serve_stdio(dispatcher: Arc<Dispatcher>) -> anyhow::Result<()> {
    info!("serving requests on stdio");
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    serve(dispatcher, stdin, tokio::io::stdout()).await
}
