use crate::error::Result;
use crate::neem::{EpisodeContext, NeemInterface};

/// Scope guard for one recorded episode.
///
/// Starting the guard starts the episode; [`finish`](Episode::finish) stops
/// it and writes the NEEM. If the guard is dropped without `finish` (early
/// return, panic) the episode is still stopped and any error is logged.
pub struct Episode<'a> {
    neem: &'a NeemInterface,
    top_level_action: String,
    episode: String,
    output_path: String,
    finished: bool,
}

impl<'a> Episode<'a> {
    pub fn start(
        neem: &'a NeemInterface,
        ctx: &EpisodeContext,
        output_path: impl Into<String>,
        start_time: Option<f64>,
    ) -> Result<Self> {
        let top_level_action = neem.start_episode(ctx, start_time)?;
        let episode = neem.episode_for_action(&top_level_action)?;
        tracing::info!(episode = %episode, action = %top_level_action, "episode started");
        Ok(Self {
            neem,
            top_level_action,
            episode,
            output_path: output_path.into(),
            finished: false,
        })
    }

    pub fn top_level_action(&self) -> &str {
        &self.top_level_action
    }

    pub fn episode(&self) -> &str {
        &self.episode
    }

    pub fn neem(&self) -> &NeemInterface {
        self.neem
    }

    /// Stop the episode and write the NEEM to the output path.
    pub fn finish(mut self) -> Result<()> {
        self.finished = true;
        self.neem.stop_episode(&self.output_path, None)?;
        tracing::info!(episode = %self.episode, path = %self.output_path, "episode written");
        Ok(())
    }
}

impl Drop for Episode<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = self.neem.stop_episode(&self.output_path, None) {
            tracing::warn!(episode = %self.episode, error = %e, "failed to stop episode on drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosprolog_client::{Bindings, MockReasoner};
    use std::sync::Arc;

    fn mock() -> Arc<MockReasoner> {
        Arc::new(
            MockReasoner::new()
                .on("mem_episode_start", vec![Bindings::new().with("Action", "act_1")])
                .on("is_setting_for", vec![Bindings::new().with("Episode", "ep_1")]),
        )
    }

    #[test]
    fn finish_stops_exactly_once() {
        let mock = mock();
        let neem = NeemInterface::new(mock.clone(), 1).unwrap();
        let episode = Episode::start(&neem, &EpisodeContext::default(), "/tmp/neem", Some(1.0)).unwrap();
        assert_eq!(episode.top_level_action(), "act_1");
        assert_eq!(episode.episode(), "ep_1");
        episode.finish().unwrap();
        assert_eq!(mock.queries_containing("mem_episode_stop('/tmp/neem'").len(), 1);
    }

    #[test]
    fn drop_stops_unfinished_episode() {
        let mock = mock();
        let neem = NeemInterface::new(mock.clone(), 1).unwrap();
        {
            let _episode = Episode::start(&neem, &EpisodeContext::default(), "/tmp/neem", None).unwrap();
        }
        assert_eq!(mock.queries_containing("mem_episode_stop").len(), 1);
        assert!(mock.queries()[1].contains("is_setting_for(Episode, 'act_1')"));
    }
}
