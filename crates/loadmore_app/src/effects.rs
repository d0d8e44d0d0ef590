use std::time::Duration;

use loadmore_core::{Effect, FailureReason, LoadedPage, Msg, PageOutcome};
use loadmore_engine::{EngineEvent, EngineHandle, LoadError, PageResponse};
use loadmore_logging::{loadmore_debug, loadmore_warn};

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    /// Dispatches effects to the engine and returns how many request chains
    /// were started.
    pub fn run(&self, effects: Vec<Effect>) -> usize {
        let mut started = 0;
        for effect in effects {
            match effect {
                Effect::FetchPage {
                    instance,
                    url,
                    referrer,
                    retry_budget,
                } => {
                    loadmore_debug!(
                        "FetchPage instance={} retry_budget={} url={} referrer={:?}",
                        instance,
                        retry_budget,
                        url,
                        referrer
                    );
                    self.engine.fetch_page(instance, url, referrer, retry_budget);
                    started += 1;
                }
            }
        }
        started
    }

    /// Blocks until a request chain completes, logging retries on the way.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        loop {
            match self.engine.recv_timeout(timeout)? {
                EngineEvent::Retrying {
                    instance,
                    attempt,
                    remaining,
                    error,
                } => {
                    loadmore_debug!(
                        "instance {} attempt {} failed ({}); {} retries left",
                        instance,
                        attempt,
                        error,
                        remaining
                    );
                }
                EngineEvent::PageCompleted { instance, result } => {
                    return Some(Msg::PageLoaded {
                        instance,
                        outcome: map_result(instance, result),
                    });
                }
            }
        }
    }
}

fn map_result(instance: usize, result: Result<PageResponse, LoadError>) -> PageOutcome {
    match result {
        Ok(page) => PageOutcome::Loaded(LoadedPage {
            fragments: page.fragments.into_iter().map(|f| f.html).collect(),
            next_url: page.next_url,
            page_url: Some(page.url),
        }),
        Err(err) => {
            loadmore_warn!("instance {} failed: {}", instance, err);
            PageOutcome::Failed(match err {
                LoadError::Transport { .. } => FailureReason::Transport,
                LoadError::Contract { .. } => FailureReason::ContractViolation,
            })
        }
    }
}
