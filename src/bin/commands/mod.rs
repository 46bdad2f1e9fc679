pub mod config;
pub mod connections;
pub mod pick_file;
pub mod query;
pub mod serve;
pub mod settings;

use anyhow::anyhow;
use nebula::server::Dispatcher;
use nebula::OutputFormat;
use serde::Serialize;
use serde_json::Value;

/// Call a façade method, turning an error response into an `anyhow` error
pub(crate) async fn call(
    dispatcher: &Dispatcher,
    method: &str,
    params: Value,
) -> anyhow::Result<Value> {
    dispatcher
        .call(method, params)
        .await
        .map_err(|e| anyhow!("{} failed: {}", method, e))
}

/// Print a serializable value in one of the JSON formats
pub(crate) fn print_json<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(value)?),
        _ => println!("{}", serde_json::to_string(value)?),
    }
    Ok(())
}
