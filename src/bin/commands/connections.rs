use super::{call, print_json};
use anyhow::anyhow;
use clap::{Args, Subcommand};
use nebula::output::render_rows;
use nebula::server::Dispatcher;
use nebula::{ConnectionRecord, OutputFormat};
use serde_json::{json, Map, Value};

/// Arguments for the Connections command
#[derive(Args)]
pub struct ConnectionsArgs {
    #[clap(subcommand)]
    pub command: Option<ConnectionsCommands>,
}

/// Connections subcommands
#[derive(Subcommand)]
pub enum ConnectionsCommands {
    /// List saved connections (default when no subcommand)
    List,

    /// Save a new connection, or replace the one with the given id
    Save {
        /// Id of an existing connection to replace
        #[clap(long)]
        id: Option<String>,

        /// Display name
        #[clap(long)]
        name: String,

        /// Connection type
        #[clap(long = "type", default_value = "sqlite")]
        kind: String,

        /// Database file path (sets config.path)
        #[clap(long)]
        path: Option<String>,

        /// Extra config entry as KEY=VALUE; VALUE is read as JSON when it parses
        #[clap(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },

    /// Delete a connection; unknown ids are ignored
    Delete {
        /// Connection id
        #[clap(value_name = "ID")]
        id: String,
    },
}

pub async fn run(
    dispatcher: &Dispatcher,
    args: ConnectionsArgs,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match args.command {
        None | Some(ConnectionsCommands::List) => {
            let records = call(dispatcher, "connections.load", Value::Null).await?;
            let records: Vec<ConnectionRecord> = serde_json::from_value(records)?;
            print_records(&records, output_format)
        }
        Some(ConnectionsCommands::Save {
            id,
            name,
            kind,
            path,
            set,
        }) => {
            let mut config = Map::new();
            if let Some(path) = path {
                config.insert("path".to_string(), Value::String(path));
            }
            for entry in &set {
                let (key, value) = parse_config_entry(entry)?;
                config.insert(key, value);
            }

            let mut params = json!({"name": name, "type": kind, "config": config});
            if let Some(id) = id {
                params["id"] = Value::String(id);
            }

            let saved = call(dispatcher, "connections.save", params).await?;
            let saved: ConnectionRecord = serde_json::from_value(saved)?;
            print_records(&[saved], output_format)
        }
        Some(ConnectionsCommands::Delete { id }) => {
            let ack = call(dispatcher, "connections.delete", json!({"id": id})).await?;
            if output_format.is_json() {
                print_json(&ack, output_format)
            } else {
                println!("deleted connection {}", id);
                Ok(())
            }
        }
    }
}

fn print_records(records: &[ConnectionRecord], output_format: OutputFormat) -> anyhow::Result<()> {
    let columns: Vec<String> = ["id", "name", "type", "config"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    let rows = records
        .iter()
        .map(|r| match serde_json::to_value(r)? {
            Value::Object(map) => Ok(map),
            _ => Err(anyhow!("connection record is not an object")),
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    println!("{}", render_rows(&columns, &rows, output_format)?);
    Ok(())
}

/// Split `KEY=VALUE`; VALUE becomes JSON if it parses, a string otherwise
fn parse_config_entry(entry: &str) -> anyhow::Result<(String, Value)> {
    let (key, value) = entry
        .split_once('=')
        .ok_or_else(|| anyhow!("config entry must look like KEY=VALUE: {}", entry))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(anyhow!("config entry has an empty key: {}", entry));
    }
    let value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}
