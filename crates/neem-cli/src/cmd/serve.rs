use anyhow::Context;
use neem_core::config::{Config, WarnLevel};
use neem_server::AppState;

use crate::settings;

pub fn run(config: &Config) -> anyhow::Result<()> {
    for w in config.validate() {
        match w.level {
            WarnLevel::Warning => tracing::warn!("{}", w.message),
            WarnLevel::Error => anyhow::bail!("invalid config: {}", w.message),
        }
    }

    // Built outside the runtime: the blocking client and the worker pool are
    // dropped here, after the runtime has shut down.
    let state = AppState::from_config(settings::connect(config)?, config)
        .context("failed to set up the NEEM interface")?;
    let host = config.server.host.clone();
    let port = config.server.port;
    let reasoner_url = config.reasoner.url.clone();

    let rt = tokio::runtime::Runtime::new()?;
    let app_state = state.clone();
    rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind((host.as_str(), port))
            .await
            .with_context(|| format!("failed to bind {host}:{port}"))?;
        let addr = listener.local_addr()?;
        println!(
            "NEEM interface → http://{addr}{}  (reasoner {})",
            neem_server::API_PREFIX,
            reasoner_url
        );

        tokio::select! {
            res = neem_server::serve_on(app_state, listener) => res,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                Ok(())
            }
        }
    })?;

    drop(rt);
    drop(state);
    Ok(())
}
