use crate::error::{NeemError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default file name looked up in the working directory.
pub const CONFIG_FILE: &str = "neem.yaml";

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ReasonerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasonerConfig {
    #[serde(default = "default_reasoner_url")]
    pub url: String,
    /// Per-request timeout. Unset means calls block until the reasoner
    /// answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_reasoner_url() -> String {
    "http://localhost:62226/rosprolog".to_string()
}

impl ReasonerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            url: default_reasoner_url(),
            timeout_secs: None,
        }
    }
}

// ---------------------------------------------------------------------------
// NeemConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeemConfig {
    /// `neem-interface.pl` to load into KnowRob on startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface_path: Option<PathBuf>,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    /// NEEM directory remembered by the `load_neem_to_kb` data query.
    #[serde(default)]
    pub neem_uri: String,
}

fn default_pool_size() -> usize {
    4
}

impl Default for NeemConfig {
    fn default() -> Self {
        Self {
            interface_path: None,
            pool_size: default_pool_size(),
            neem_uri: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reasoner: ReasonerConfig,
    #[serde(default)]
    pub neem: NeemConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(NeemError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let data = std::fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Load `path` if given, else `neem.yaml` in `dir` if it exists, else
    /// defaults. An explicitly named file must exist.
    pub fn resolve(path: Option<&Path>, dir: &Path) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let candidate = dir.join(CONFIG_FILE);
                if candidate.exists() {
                    Self::load(&candidate)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Worker count for trajectory insertion, never below one.
    pub fn pool_size(&self) -> usize {
        self.neem.pool_size.max(1)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        let url = self.reasoner.url.trim();
        if url.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "reasoner.url is empty".to_string(),
            });
        } else if !(url.starts_with("http://") || url.starts_with("https://")) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("reasoner.url '{url}' must start with http:// or https://"),
            });
        }

        if self.neem.pool_size == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "neem.pool_size is 0; using 1 worker".to_string(),
            });
        }

        if let Some(path) = &self.neem.interface_path {
            if !path.exists() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "neem.interface_path '{}' does not exist on this machine",
                        path.display()
                    ),
                });
            }
        }

        warnings
    }
}
