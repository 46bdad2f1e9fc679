use super::print_json;
use nebula::{NebulaConfig, OutputFormat};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ConfigInfo {
    config_file: String,
    data_dir: String,
    connections_file: String,
    settings_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_picker: Option<String>,
}

pub fn run(config: &NebulaConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    if output_format.is_json() {
        let info = ConfigInfo {
            config_file: NebulaConfig::config_file_path(),
            data_dir: config.data_dir.clone(),
            connections_file: config.connections_path().to_string_lossy().to_string(),
            settings_file: config.settings_path().to_string_lossy().to_string(),
            file_picker: config.file_picker.clone(),
        };
        return print_json(&info, output_format);
    }

    println!("Config File:        {}", NebulaConfig::config_file_path());
    println!("{}", config.summary());
    Ok(())
}
