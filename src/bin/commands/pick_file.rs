use super::{call, print_json};
use nebula::server::Dispatcher;
use nebula::OutputFormat;
use serde_json::Value;

pub async fn run(dispatcher: &Dispatcher, output_format: OutputFormat) -> anyhow::Result<()> {
    let picked = call(dispatcher, "dialog.openFile", Value::Null).await?;

    if output_format.is_json() {
        return print_json(&picked, output_format);
    }
    match picked.as_str() {
        Some(path) => println!("{}", path),
        None => eprintln!("no file selected"),
    }
    Ok(())
}
