//! Viewer configuration, loaded the way the teacher's TUI loads its own
//! `viewer::Config` — a `toml` file under the user's config directory,
//! falling back to defaults when absent.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_url: String,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

fn default_refresh_interval() -> u64 {
    5
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(|p| p.to_path_buf()).or_else(|| {
            let dir = dirs::config_dir()?;
            let default_path = dir.join("guardian").join("viewer.toml");
            default_path.exists().then_some(default_path)
        });

        match config_path {
            Some(path) => {
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config file: {}", path.display()))?;
                toml::from_str(&content)
                    .with_context(|| format!("failed to parse config file: {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8080".to_string(),
            refresh_interval_secs: default_refresh_interval(),
        }
    }
}
