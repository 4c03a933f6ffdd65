use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub issues: IssuesConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProjectConfig {
    /// Directory holding this project's context files.
    pub context_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7419".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct IssuesConfig {
    /// Repository the issue lister runs in. The `gh` CLI resolves the
    /// tracked repo from this directory's git remote.
    #[serde(default = "default_repo_dir")]
    pub repo_dir: PathBuf,
    #[serde(default = "default_open_limit")]
    pub open_limit: usize,
    #[serde(default = "default_closed_limit")]
    pub closed_limit: usize,
}

impl Default for IssuesConfig {
    fn default() -> Self {
        Self {
            repo_dir: default_repo_dir(),
            open_limit: default_open_limit(),
            closed_limit: default_closed_limit(),
        }
    }
}

fn default_repo_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_open_limit() -> usize {
    100
}
fn default_closed_limit() -> usize {
    50
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.project.context_dir.as_os_str().is_empty() {
        anyhow::bail!("project.context_dir must not be empty");
    }

    if config.issues.open_limit == 0 {
        anyhow::bail!("issues.open_limit must be > 0");
    }
    if config.issues.closed_limit == 0 {
        anyhow::bail!("issues.closed_limit must be > 0");
    }

    Ok(config)
}
