use std::sync::Arc;

use neem_core::{Config, NeemData, NeemInterface};
use rosprolog_client::Reasoner;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub data: Arc<NeemData>,
}

impl AppState {
    pub fn new(data: NeemData) -> Self {
        Self {
            data: Arc::new(data),
        }
    }

    /// Build the NEEM interface on top of `reasoner` as configured.
    pub fn from_config(reasoner: Arc<dyn Reasoner>, config: &Config) -> neem_core::Result<Self> {
        let neem = NeemInterface::from_config(reasoner, config)?;
        Ok(Self::new(NeemData::new(
            Arc::new(neem),
            config.neem.neem_uri.clone(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosprolog_client::MockReasoner;

    #[test]
    fn from_config_uses_pool_size() {
        let mut config = Config::default();
        config.neem.pool_size = 3;
        let state = AppState::from_config(Arc::new(MockReasoner::new()), &config).unwrap();
        assert_eq!(state.data.neem().pool_size(), 3);
    }
}
