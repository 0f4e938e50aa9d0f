//! Configuration file discovery for the CLI.
//!
//! The first existing file among the candidates wins:
//!
//! 1. the `--config` path, which must exist;
//! 2. `lc.toml` next to the input file;
//! 3. `lc/config.toml` in the working directory;
//! 4. `config.toml` in the platform config directory for lc.
//!
//! Without any of them the defaults of [`AppConfig`] apply.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use lc::{LcError, config::AppConfig};

/// Name of the per-directory configuration file.
const DIRECTORY_CONFIG: &str = "lc.toml";

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigError> for LcError {
    fn from(err: ConfigError) -> Self {
        LcError::Config(err.to_string())
    }
}

/// Loads the configuration that applies to compiling `input`.
///
/// # Errors
///
/// Returns an error if `explicit_path` does not exist, or if the selected
/// file cannot be read or parsed.
pub fn load_config(
    explicit_path: Option<impl AsRef<Path>>,
    input: impl AsRef<Path>,
) -> Result<AppConfig, LcError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::MissingFile(path.to_path_buf()).into());
        }
        return load_config_file(path);
    }

    match candidates(input.as_ref()).into_iter().find(|path| path.exists()) {
        Some(path) => load_config_file(&path),
        None => {
            debug!("No configuration file found, using default configuration");
            Ok(AppConfig::default())
        }
    }
}

/// Implicit configuration locations, most specific first.
fn candidates(input: &Path) -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(3);
    if let Some(dir) = input.parent() {
        paths.push(dir.join(DIRECTORY_CONFIG));
    }
    paths.push(Path::new("lc").join("config.toml"));
    match ProjectDirs::from("org", "lc", "lc") {
        Some(dirs) => paths.push(dirs.config_dir().join("config.toml")),
        None => debug!("Could not determine platform-specific config directory"),
    }
    paths
}

fn load_config_file(path: &Path) -> Result<AppConfig, LcError> {
    info!(path:% = path.display(); "Loading configuration");
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|err| {
        ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
        .into()
    })
}
