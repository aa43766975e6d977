use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use neem_core::{Config, NeemInterface};
use rosprolog_client::{HttpPrologClient, Reasoner};

/// Resolve the effective configuration.
///
/// Priority:
/// 1. `--config` flag / `NEEM_CONFIG` env var (passed in as `explicit`)
/// 2. `neem.yaml` in the current directory
/// 3. Built-in defaults
///
/// `reasoner_url` (from `--reasoner-url` / `NEEM_REASONER_URL`) replaces the
/// file's `reasoner.url`.
pub fn resolve_config(explicit: Option<&Path>, reasoner_url: Option<&str>) -> anyhow::Result<Config> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    resolve_config_in(&cwd, explicit, reasoner_url)
}

fn resolve_config_in(
    dir: &Path,
    explicit: Option<&Path>,
    reasoner_url: Option<&str>,
) -> anyhow::Result<Config> {
    let mut config = Config::resolve(explicit, dir).context("failed to load config")?;
    if let Some(url) = reasoner_url {
        config.reasoner.url = url.to_string();
    }
    Ok(config)
}

/// HTTP client for the configured reasoner.
pub fn connect(config: &Config) -> anyhow::Result<Arc<dyn Reasoner>> {
    let client = HttpPrologClient::with_timeout(&config.reasoner.url, config.reasoner.timeout())
        .with_context(|| format!("failed to build client for {}", config.reasoner.url))?;
    Ok(Arc::new(client))
}

/// NEEM interface over the configured reasoner.
pub fn interface(config: &Config) -> anyhow::Result<NeemInterface> {
    Ok(NeemInterface::from_config(connect(config)?, config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let config = resolve_config_in(dir.path(), None, None).unwrap();
        assert_eq!(config.reasoner.url, Config::default().reasoner.url);
    }

    #[test]
    fn picks_up_file_in_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("neem.yaml"),
            "reasoner:\n  url: http://kb:9000/rosprolog\n",
        )
        .unwrap();
        let config = resolve_config_in(dir.path(), None, None).unwrap();
        assert_eq!(config.reasoner.url, "http://kb:9000/rosprolog");
    }

    #[test]
    fn url_override_wins_over_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("neem.yaml"),
            "reasoner:\n  url: http://kb:9000/rosprolog\n",
        )
        .unwrap();
        let config = resolve_config_in(dir.path(), None, Some("http://other/rosprolog")).unwrap();
        assert_eq!(config.reasoner.url, "http://other/rosprolog");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(resolve_config_in(dir.path(), Some(&missing), None).is_err());
    }
}
