use super::{call, print_json};
use clap::Args;
use nebula::output::render_rows;
use nebula::server::Dispatcher;
use nebula::{OutputFormat, QueryResult};
use serde_json::json;

/// Arguments for the Query command
#[derive(Args)]
pub struct QueryArgs {
    /// Connection id, see `nebula connections list`
    #[clap(value_name = "CONNECTION_ID")]
    pub connection_id: String,

    /// SQL statement(s) to run
    #[clap(value_name = "SQL")]
    pub sql: String,
}

pub async fn run(
    dispatcher: &Dispatcher,
    args: QueryArgs,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let QueryArgs { connection_id, sql } = args;

    let data = call(
        dispatcher,
        "query.run",
        json!({"connectionId": connection_id, "sql": sql}),
    )
    .await?;

    match serde_json::from_value::<QueryResult>(data)? {
        QueryResult::Tabular { columns, rows } => {
            let names: Vec<String> = columns.into_iter().map(|c| c.name).collect();
            println!("{}", render_rows(&names, &rows, output_format)?);
            Ok(())
        }
        status @ QueryResult::Status { .. } if output_format.is_json() => {
            print_json(&status, output_format)
        }
        QueryResult::Status { info } => {
            println!("{}", info.message);
            Ok(())
        }
    }
}
