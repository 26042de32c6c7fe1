use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::notado::NOTADO_GRAPHQL_ENDPOINT;

#[derive(Parser, Debug)]
#[command(name = "noctober", version)]
#[command(about = "Sync your Kobo highlights to Notado", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config", global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sync Kobo highlights to Notado
    #[command(visible_alias = "s")]
    Sync {
        /// Path to KoboReader.sqlite, overrides device.database
        #[arg(short, long)]
        database: Option<PathBuf>,
    },
    /// Show how many highlights are on the device
    Count {
        #[arg(short, long)]
        database: Option<PathBuf>,
    },
    /// Print version and platform details
    Details,
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".noctober")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendMode {
    /// Every batch goes out in one request.
    #[default]
    Combined,
    /// One request per batch, stopping at the first failure.
    PerBatch,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Notado {
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub send_mode: SendMode,
}

impl Default for Notado {
    fn default() -> Self {
        Self {
            token: String::new(),
            endpoint: default_endpoint(),
            timeout_seconds: default_timeout_seconds(),
            send_mode: SendMode::default(),
        }
    }
}

fn default_endpoint() -> String {
    NOTADO_GRAPHQL_ENDPOINT.to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Device {
    #[serde(default)]
    pub database: Option<PathBuf>,
    #[serde(default)]
    pub upload_store_highlights: bool,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub notado: Notado,
    #[serde(default)]
    pub device: Device,
}

impl Config {
    pub fn new(path: &Path) -> Result<Self> {
        let yaml_str = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Config::from_yaml(&yaml_str)
    }

    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        let yaml_with_env = Config::substitute_env_vars(yaml_str)?;
        let config: Config = serde_yaml::from_str(&yaml_with_env)?;
        Ok(config)
    }

    /// Replaces `${VAR}` and `${VAR:-default}` with values from the environment.
    fn substitute_env_vars(yaml_str: &str) -> Result<String> {
        let mut result = yaml_str.to_string();
        let mut offset = 0;

        while let Some(start) = result[offset..].find("${") {
            let actual_start = offset + start;
            let Some(end) = result[actual_start..].find('}') else {
                break;
            };
            let var_name = &result[actual_start + 2..actual_start + end];

            let env_value = match var_name.split_once(":-") {
                Some((actual_var, default_val)) => {
                    env::var(actual_var).unwrap_or_else(|_| default_val.to_string())
                }
                None => env::var(var_name).unwrap_or_else(|_| {
                    tracing::warn!(variable = var_name, "environment variable not found");
                    String::new()
                }),
            };

            result.replace_range(actual_start..actual_start + end + 1, &env_value);
            offset = actual_start + env_value.len();
        }

        Ok(result)
    }
}
