use crate::{Effect, ListInstance, LoaderState, Msg, PageOutcome, TerminalOutcome};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: LoaderState, msg: Msg) -> (LoaderState, Vec<Effect>) {
    let effects = match msg {
        Msg::InstancesBound(bound) => {
            state.bind(bound);
            Vec::new()
        }
        Msg::LoadMoreClicked { instance } => {
            let retry_budget = state.retry_budget();
            state
                .instance_mut(instance)
                .and_then(|list| activate(list, retry_budget))
                .into_iter()
                .collect()
        }
        Msg::PageLoaded { instance, outcome } => {
            if let Some(list) = state.instance_mut(instance) {
                settle(list, outcome);
            }
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Idle/Error -> Fetching. Rejected while fetching or once done.
fn activate(list: &mut ListInstance, retry_budget: u32) -> Option<Effect> {
    if list.is_fetching || list.is_end_of_data {
        return None;
    }
    // A removed control cannot be activated.
    list.dom.control()?;
    let url = list.next_url.clone()?;

    list.is_fetching = true;
    list.dom.begin_loading();
    Some(Effect::FetchPage {
        instance: list.id,
        url,
        referrer: list.referrer.clone(),
        retry_budget,
    })
}

/// Fetching -> Idle | Done | Error. Completions for an instance that is not
/// fetching are stale and ignored.
fn settle(list: &mut ListInstance, outcome: PageOutcome) {
    if !list.is_fetching {
        return;
    }
    list.is_fetching = false;

    let terminal = match outcome {
        PageOutcome::Failed(reason) => {
            list.dom.show_error();
            TerminalOutcome::Error(reason)
        }
        PageOutcome::Loaded(page) => {
            list.dom.append_fragments(&page.fragments);
            list.fragments_appended += page.fragments.len();
            list.pages_loaded += 1;
            list.dom.finish_loading();
            if page.page_url.is_some() {
                list.referrer = page.page_url;
            }

            match page.next_url {
                Some(next) if !page.fragments.is_empty() => {
                    list.next_url = Some(next);
                    TerminalOutcome::Continuing
                }
                _ => {
                    list.is_end_of_data = true;
                    list.dom.mark_exhausted();
                    TerminalOutcome::Done
                }
            }
        }
    };

    list.last_outcome = Some(terminal);
}
