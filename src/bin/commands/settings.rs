use super::{call, print_json};
use anyhow::anyhow;
use clap::{Args, Subcommand};
use nebula::output::render_rows;
use nebula::server::Dispatcher;
use nebula::OutputFormat;
use serde_json::{Map, Value};

/// Arguments for the Settings command
#[derive(Args)]
pub struct SettingsArgs {
    #[clap(subcommand)]
    pub command: Option<SettingsCommands>,
}

/// Settings subcommands
#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show current settings (default when no subcommand)
    Show,

    /// Replace all settings with a JSON object, e.g. '{"theme": "light"}'
    Set {
        #[clap(value_name = "JSON")]
        json: String,
    },
}

pub async fn run(
    dispatcher: &Dispatcher,
    args: SettingsArgs,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match args.command {
        None | Some(SettingsCommands::Show) => {
            let settings = call(dispatcher, "settings.load", Value::Null).await?;
            print_settings(settings, output_format)
        }
        Some(SettingsCommands::Set { json }) => {
            let settings: Value = serde_json::from_str(&json)
                .map_err(|e| anyhow!("settings must be a JSON object: {}", e))?;
            if !settings.is_object() {
                return Err(anyhow!("settings must be a JSON object"));
            }
            call(dispatcher, "settings.save", settings.clone()).await?;
            print_settings(settings, output_format)
        }
    }
}

fn print_settings(settings: Value, output_format: OutputFormat) -> anyhow::Result<()> {
    if output_format.is_json() {
        return print_json(&settings, output_format);
    }

    let Value::Object(settings) = settings else {
        return Err(anyhow!("settings are not a JSON object"));
    };
    let columns = vec!["key".to_string(), "value".to_string()];
    let rows: Vec<Map<String, Value>> = settings
        .into_iter()
        .map(|(key, value)| {
            let mut row = Map::new();
            row.insert("key".to_string(), Value::String(key));
            row.insert("value".to_string(), value);
            row
        })
        .collect();

    println!("{}", render_rows(&columns, &rows, output_format)?);
    Ok(())
}
