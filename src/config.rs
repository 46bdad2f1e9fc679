use anyhow::{anyhow, Result};
use config::Config;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct NebulaConfig {
    /// Path to the directory holding the connection and settings records
    pub data_dir: String,

    /// External command used for the open-file dialog, e.g. `zenity --file-selection`
    pub file_picker: Option<String>,
}

const EMPTY_CONFIG: &str = r#"### nebula configuration file

### directory for connection and settings records
# data_dir = "~/.nebula"

### command printing a chosen file path on stdout (non-zero exit = cancelled)
# file_picker = "zenity --file-selection"
"#;

const CONNECTIONS_FILE: &str = "connections.json";
const SETTINGS_FILE: &str = "settings.json";

impl Default for NebulaConfig {
    fn default() -> Self {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| ".".to_string());

        Self {
            data_dir: format!("{}/.nebula", home_dir),
            file_picker: None,
        }
    }
}

impl NebulaConfig {
    /// Function to create and initialize a new configuration
    pub fn new(path: &Option<String>) -> Result<NebulaConfig> {
        let mut builder = Config::builder();

        // By default use $HOME/.nebula/nebula.toml as the configuration file path
        let home_dir = dirs::home_dir()
            .ok_or_else(|| anyhow!("Could not find home directory"))?
            .to_str()
            .ok_or_else(|| anyhow!("Could not convert home directory path to string"))?
            .to_owned();

        let nebula_dir = format!("{}/.nebula", home_dir.as_str());

        match path {
            Some(p) => {
                let path = Path::new(p.as_str());
                if path.exists() {
                    let path_str = path
                        .to_str()
                        .ok_or_else(|| anyhow!("Could not convert path to string"))?;
                    builder = builder.add_source(config::File::with_name(path_str));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file: {}", e))?;
                }
            }
            None => {
                std::fs::create_dir_all(nebula_dir.as_str())
                    .map_err(|e| anyhow!("Unable to create nebula directory: {}", e))?;
                let p = format!("{}/nebula.toml", nebula_dir.as_str());
                if Path::new(p.as_str()).exists() {
                    builder = builder.add_source(config::File::with_name(p.as_str()));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG).map_err(|e| {
                        anyhow!("Unable to create config file {}: {}", p.as_str(), e)
                    })?;
                }
            }
        }

        // E.g., `NEBULA_DATA_DIR=/tmp/nebula ./nebula` would set the data directory
        builder = builder.add_source(config::Environment::with_prefix("NEBULA"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        let data_dir = match config.get("data_dir") {
            Some(p) => expand_home(p, &home_dir),
            None => nebula_dir,
        };

        let file_picker = config
            .get("file_picker")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(NebulaConfig {
            data_dir,
            file_picker,
        })
    }

    /// Configuration rooted at an explicit data directory, without touching any config file
    pub fn with_data_dir(data_dir: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            file_picker: None,
        }
    }

    /// Path to the JSON array of connection records
    pub fn connections_path(&self) -> PathBuf {
        Path::new(self.data_dir.trim_end_matches('/')).join(CONNECTIONS_FILE)
    }

    /// Path to the JSON settings object
    pub fn settings_path(&self) -> PathBuf {
        Path::new(self.data_dir.trim_end_matches('/')).join(SETTINGS_FILE)
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        let lines = [
            format!("Data Directory:     {}", self.data_dir),
            format!("Connections File:   {}", self.connections_path().display()),
            format!("Settings File:      {}", self.settings_path().display()),
            format!(
                "File Picker:        {}",
                self.file_picker.as_deref().unwrap_or("(not configured)")
            ),
        ];
        lines.join("\n")
    }

    /// Get the config file path
    pub fn config_file_path() -> String {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| "~".to_string());
        format!("{}/.nebula/nebula.toml", home_dir)
    }
}

fn expand_home(path: &str, home_dir: &str) -> String {
    match path.strip_prefix("~") {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => format!("{}{}", home_dir, rest),
        _ => path.to_string(),
    }
}
