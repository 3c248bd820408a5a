//! Configuration loading and root folder resolution
//!
//! Every value resolves through the same priority order: command-line
//! argument, then environment variable, then the TOML config file, then
//! a compiled default.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing::{info, warn};

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "roster", version, about = "Professional contact roster service")]
pub struct Args {
    /// Folder holding the service database
    #[arg(long, env = "ROSTER_ROOT_FOLDER")]
    pub root_folder: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "ROSTER_BIND")]
    pub bind: Option<SocketAddr>,
}

/// Optional config file at `<config_dir>/roster/config.toml`
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    root_folder: Option<PathBuf>,
    bind: Option<SocketAddr>,
}

/// Resolved runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub root_folder: PathBuf,
    pub bind: SocketAddr,
}

impl Settings {
    /// Resolve settings from arguments, environment, config file and
    /// defaults
    ///
    /// clap already folds the environment tier into `args`, so anything
    /// still unset here falls through to the config file and then the
    /// compiled default.
    pub fn resolve(args: Args) -> Self {
        let file = load_config_file();

        let root_folder = args
            .root_folder
            .or(file.root_folder)
            .unwrap_or_else(default_root_folder);

        let bind = args
            .bind
            .or(file.bind)
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8000)));

        Self { root_folder, bind }
    }

    /// Create the root folder if it doesn't exist
    pub fn ensure_root_folder(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder).with_context(|| {
            format!("Failed to create root folder {}", self.root_folder.display())
        })
    }

    /// Path of the service database inside the root folder
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join("roster.db")
    }
}

fn load_config_file() -> ConfigFile {
    let path = match dirs::config_dir() {
        Some(dir) => dir.join("roster").join("config.toml"),
        None => return ConfigFile::default(),
    };

    if !path.exists() {
        return ConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str::<ConfigFile>(&content) {
            Ok(config) => {
                info!("Loaded config file: {}", path.display());
                config
            }
            Err(err) => {
                warn!("Ignoring malformed config file {}: {}", path.display(), err);
                ConfigFile::default()
            }
        },
        Err(err) => {
            warn!("Failed to read config file {}: {}", path.display(), err);
            ConfigFile::default()
        }
    }
}

fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("roster"))
        .unwrap_or_else(|| PathBuf::from("./roster_data"))
}
