//! File selection for new connections
//!
//! The GUI shell owns the native dialog; outside of it the choice is delegated
//! to an external picker command configured as `file_picker`.

use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, warn};

/// Asks the user for a file; `None` means the user cancelled
pub trait FilePicker: Send + Sync {
    fn pick_file(&self) -> Result<Option<PathBuf>>;
}

/// Runs an external command and takes the first line it prints as the path.
///
/// A non-zero exit status or empty output is treated as a cancel.
#[derive(Debug, Clone)]
pub struct CommandFilePicker {
    program: String,
    args: Vec<String>,
}

impl CommandFilePicker {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a command line such as `zenity --file-selection` on whitespace
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(String::from);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }
}

impl FilePicker for CommandFilePicker {
    fn pick_file(&self) -> Result<Option<PathBuf>> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|e| anyhow!("Failed to run file picker '{}': {}", self.program, e))?;

        if !output.status.success() {
            debug!("file picker exited with {}, treating as cancel", output.status);
            return Ok(None);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(PathBuf::from))
    }
}

/// Picker used when none is configured; always reports a cancel
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFilePicker;

impl FilePicker for NoFilePicker {
    fn pick_file(&self) -> Result<Option<PathBuf>> {
        warn!("no file picker configured, set `file_picker` in the nebula config");
        Ok(None)
    }
}

/// Picker for an optional configured command line
pub fn picker_from_config(command: Option<&str>) -> Box<dyn FilePicker> {
    match command.and_then(CommandFilePicker::from_command_line) {
        Some(picker) => Box::new(picker),
        None => Box::new(NoFilePicker),
    }
}
