use std::time::Duration;

use anyhow::anyhow;
use loadmore_core::{
    update, BoundInstance, Effect, InstanceId, InstancePhase, LoaderState, LoaderViewModel, Msg,
};
use loadmore_engine::DiscoveredList;
use loadmore_logging::loadmore_info;

use crate::effects::EffectRunner;

/// Single-threaded event loop around the core state machine.
///
/// Activations are dispatched in rounds: every targeted instance that is idle
/// is activated once, then the driver waits until each started chain settles.
/// Instances that end a round in error are not re-activated.
pub struct Driver {
    state: LoaderState,
    effects: EffectRunner,
    settle_timeout: Duration,
}

impl Driver {
    pub fn new(retry_budget: u32, effects: EffectRunner, settle_timeout: Duration) -> Self {
        Self {
            state: LoaderState::with_retry_budget(retry_budget),
            effects,
            settle_timeout,
        }
    }

    pub fn bind(&mut self, lists: Vec<DiscoveredList>) -> Vec<InstanceId> {
        let bound = lists.into_iter().map(to_bound_instance).collect();
        self.dispatch(Msg::InstancesBound(bound));
        self.state.instance_ids()
    }

    pub fn view(&self) -> LoaderViewModel {
        self.state.view()
    }

    /// Runs rounds until nothing is left to load or `max_rounds` is reached.
    /// Returns the number of rounds that started at least one chain.
    pub fn run(&mut self, targets: &[InstanceId], max_rounds: Option<u32>) -> anyhow::Result<u32> {
        let mut rounds = 0;
        while max_rounds.map_or(true, |max| rounds < max) {
            if self.run_round(targets)? == 0 {
                break;
            }
            rounds += 1;
        }
        Ok(rounds)
    }

    /// Activates every idle target once and waits for all started chains.
    pub fn run_round(&mut self, targets: &[InstanceId]) -> anyhow::Result<usize> {
        let mut pending = 0;
        for &instance in targets {
            let idle = self
                .state
                .instance(instance)
                .is_some_and(|list| list.phase() == InstancePhase::Idle);
            if !idle {
                continue;
            }
            let effects = self.dispatch(Msg::LoadMoreClicked { instance });
            pending += self.effects.run(effects);
        }

        let started = pending;
        while pending > 0 {
            let msg = self.effects.next_msg(self.settle_timeout).ok_or_else(|| {
                anyhow!(
                    "no response within {:?} ({} request chain(s) outstanding)",
                    self.settle_timeout,
                    pending
                )
            })?;
            if let Msg::PageLoaded { instance, .. } = &msg {
                let instance = *instance;
                pending -= 1;
                self.dispatch(msg);
                if let Some(list) = self.state.instance(instance) {
                    loadmore_info!("instance {} is now {:?}", instance, list.phase());
                }
            }
        }
        Ok(started)
    }

    fn dispatch(&mut self, msg: Msg) -> Vec<Effect> {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        effects
    }
}

fn to_bound_instance(list: DiscoveredList) -> BoundInstance {
    BoundInstance {
        next_url: list.next_url,
        classes: list.classes,
        label: list.label,
        loading_label: list.loading_label,
        results_html: list.results_html,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use loadmore_core::{InstancePhase, CLASS_ERROR, CLASS_HAS_MORE};
    use loadmore_engine::{DiscoveredList, EngineHandle, FetchSettings};
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::Driver;
    use crate::effects::EffectRunner;

    fn list(next_url: &str) -> DiscoveredList {
        DiscoveredList {
            next_url: next_url.to_string(),
            classes: vec!["has-more-button".to_string()],
            label: "Load more".to_string(),
            loading_label: Some("Loading...".to_string()),
            results_html: String::new(),
        }
    }

    fn driver_for(server: &MockServer) -> Driver {
        let settings = FetchSettings {
            base_url: Some(Url::parse(&server.uri()).unwrap()),
            ..FetchSettings::default()
        };
        let engine = EngineHandle::new(settings).unwrap();
        Driver::new(3, EffectRunner::new(engine), Duration::from_secs(10))
    }

    #[test]
    fn pages_until_cursor_runs_out() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let server = runtime.block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/a/1"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .insert_header("next-url", "/a/2")
                        .set_body_json(json!([{ "html": "<li>A1</li>" }])),
                )
                .expect(1)
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path("/a/2"))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(json!([{ "html": "<li>A2</li>" }])),
                )
                .expect(1)
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path("/b/1"))
                .respond_with(ResponseTemplate::new(500))
                .expect(4)
                .mount(&server)
                .await;
            server
        });

        let mut driver = driver_for(&server);
        let ids = driver.bind(vec![list("/a/1"), list("/b/1")]);
        let rounds = driver.run(&ids, None).unwrap();

        assert_eq!(rounds, 2);
        let view = driver.view();
        let a = &view.instances[0];
        assert_eq!(a.phase, InstancePhase::Done);
        assert_eq!(a.results_html, "<li>A1</li><li>A2</li>");
        assert!(!a.classes.contains(&CLASS_HAS_MORE.to_string()));
        let b = &view.instances[1];
        assert_eq!(b.phase, InstancePhase::Error);
        assert!(b.classes.contains(&CLASS_ERROR.to_string()));
        assert_eq!(b.control.as_ref().unwrap().data_next, "/b/1");
        assert_eq!(b.control.as_ref().unwrap().label, "Load more");

        runtime.block_on(server.verify());
    }

    #[test]
    fn max_rounds_stops_early() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let server = runtime.block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/p"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .insert_header("next-url", "/p")
                        .set_body_json(json!([{ "html": "<li>again</li>" }])),
                )
                .expect(2)
                .mount(&server)
                .await;
            server
        });

        let mut driver = driver_for(&server);
        let ids = driver.bind(vec![list("/p")]);

        assert_eq!(driver.run(&ids, Some(2)).unwrap(), 2);
        let view = driver.view();
        assert_eq!(view.instances[0].phase, InstancePhase::Idle);
        assert_eq!(view.instances[0].pages_loaded, 2);

        runtime.block_on(server.verify());
    }

    #[test]
    fn absolute_start_follows_relative_cursor_without_base() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let server = runtime.block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/c/1"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .insert_header("next-url", "/c/2")
                        .set_body_json(json!([{ "html": "<li>C1</li>" }])),
                )
                .expect(1)
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path("/c/2"))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(json!([{ "html": "<li>C2</li>" }])),
                )
                .expect(1)
                .mount(&server)
                .await;
            server
        });

        let engine = EngineHandle::new(FetchSettings::default()).unwrap();
        let mut driver = Driver::new(3, EffectRunner::new(engine), Duration::from_secs(10));
        let ids = driver.bind(vec![list(&format!("{}/c/1", server.uri()))]);

        assert_eq!(driver.run(&ids, None).unwrap(), 2);
        let view = driver.view();
        assert_eq!(view.instances[0].phase, InstancePhase::Done);
        assert_eq!(view.instances[0].results_html, "<li>C1</li><li>C2</li>");

        runtime.block_on(server.verify());
    }
}
