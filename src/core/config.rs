//! Location configuration (`grassflow.json`) and JSON input helpers.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::io;
use crate::location::{DEFAULT_CLEANUP_EXECUTABLE, DEFAULT_GRASS_EXECUTABLE, PERMANENT_MAPSET};

pub const CONFIG_FILE_NAME: &str = "grassflow.json";
pub const CONFIG_ENV_VAR: &str = "GRASSFLOW_CONFIG";

/// Contents of `grassflow.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationConfig {
    /// GRASS database directory; `~` and `$VARS` are expanded on load.
    pub database: PathBuf,

    pub location: String,

    /// Omitted means `PERMANENT`; an explicit `null` disables the default.
    #[serde(default = "default_mapset")]
    pub default_mapset: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epsg: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_file: Option<PathBuf>,

    #[serde(default = "default_grass_executable")]
    pub grass_executable: String,

    #[serde(default = "default_cleanup_executable")]
    pub cleanup_executable: String,
}

fn default_mapset() -> Option<String> {
    Some(PERMANENT_MAPSET.to_string())
}

fn default_grass_executable() -> String {
    DEFAULT_GRASS_EXECUTABLE.to_string()
}

fn default_cleanup_executable() -> String {
    DEFAULT_CLEANUP_EXECUTABLE.to_string()
}

impl LocationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.database.as_os_str().is_empty() {
            return Err(Error::config_invalid_value(
                "database",
                None,
                "Database path must not be empty",
            ));
        }

        check_dir_name("location", Some(&self.location))?;
        check_dir_name("default_mapset", self.default_mapset.as_deref())?;

        for (key, value) in [
            ("grass_executable", &self.grass_executable),
            ("cleanup_executable", &self.cleanup_executable),
        ] {
            if value.trim().is_empty() {
                return Err(Error::config_invalid_value(
                    key,
                    Some(value.clone()),
                    "Executable must not be empty",
                ));
            }
        }

        Ok(())
    }
}

fn check_dir_name(key: &str, value: Option<&str>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };

    if value.is_empty() || value.contains('/') || value == "." || value == ".." {
        return Err(Error::config_invalid_value(
            key,
            Some(value.to_string()),
            "Must be a single, non-empty directory name",
        ));
    }

    Ok(())
}

/// Config file to use: explicit flag, then `GRASSFLOW_CONFIG`, then `./grassflow.json`.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    match std::env::var(CONFIG_ENV_VAR) {
        Ok(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => PathBuf::from(CONFIG_FILE_NAME),
    }
}

pub fn load(explicit: Option<&Path>) -> Result<LocationConfig> {
    let path = config_path(explicit);

    if !path.exists() {
        return Err(
            Error::config_missing_key("location", Some(path.display().to_string()))
                .with_message(format!("Configuration file not found: {}", path.display()))
                .with_hint(format!(
                    "Create {} or pass --config <path> (or set {})",
                    CONFIG_FILE_NAME, CONFIG_ENV_VAR
                )),
        );
    }

    let content = io::read_file(&path, &format!("read {}", path.display()))?;
    parse(&content, &path.display().to_string())
}

/// Parse and validate configuration text; `origin` names the source in errors.
pub fn parse(content: &str, origin: &str) -> Result<LocationConfig> {
    let mut config: LocationConfig =
        serde_json::from_str(content).map_err(|e| Error::config_invalid_json(origin, e))?;

    let raw = config.database.to_string_lossy().into_owned();
    let expanded = shellexpand::full(&raw).map_err(|e| {
        Error::config_invalid_value("database", Some(raw.clone()), e.to_string())
    })?;
    config.database = PathBuf::from(expanded.as_ref());

    config.validate()?;
    Ok(config)
}

/// Read a JSON spec from a literal string, a file (`@path`) or stdin (`-`).
pub fn read_json_spec_to_string(spec: &str) -> Result<String> {
    use std::io::IsTerminal;

    if spec.trim() == "-" {
        let mut buf = String::new();
        let mut stdin = std::io::stdin();
        if stdin.is_terminal() {
            return Err(Error::validation_invalid_argument(
                "json",
                "Cannot read JSON from stdin when stdin is a TTY",
                None,
                None,
            ));
        }
        stdin
            .read_to_string(&mut buf)
            .map_err(|e| Error::internal_io(e.to_string(), Some("read stdin".to_string())))?;
        return Ok(buf);
    }

    if let Some(path) = spec.strip_prefix('@') {
        if path.trim().is_empty() {
            return Err(Error::validation_invalid_argument(
                "json",
                "Invalid JSON spec '@' (missing file path)",
                None,
                None,
            ));
        }

        return io::read_file(Path::new(path), &format!("read {}", path));
    }

    Ok(spec.to_string())
}

/// Detect JSON input (object, array or quoted string).
pub fn is_json_input(input: &str) -> bool {
    matches!(input.trim_start().chars().next(), Some('{' | '[' | '"'))
}
