use std::collections::BTreeMap;

use crate::view_model::{ControlView, InstancePhase, InstanceView};
use crate::view_model::{LoaderViewModel, TerminalOutcome};
use crate::{BoundInstance, InstanceDom};

pub type InstanceId = usize;

/// Additional attempts granted to every accepted activation.
pub const DEFAULT_RETRY_BUDGET: u32 = 3;

/// One paginating list and its isolated state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListInstance {
    pub(crate) id: InstanceId,
    pub(crate) next_url: Option<String>,
    /// Absolute URL of the last page loaded; relative cursors resolve against it.
    pub(crate) referrer: Option<String>,
    pub(crate) is_fetching: bool,
    pub(crate) is_end_of_data: bool,
    pub(crate) dom: InstanceDom,
    pub(crate) pages_loaded: u32,
    pub(crate) fragments_appended: usize,
    pub(crate) last_outcome: Option<TerminalOutcome>,
}

impl ListInstance {
    fn from_bound(id: InstanceId, bound: BoundInstance) -> Self {
        Self {
            id,
            next_url: Some(bound.next_url),
            referrer: None,
            is_fetching: false,
            is_end_of_data: false,
            dom: InstanceDom::new(
                bound.classes,
                bound.label,
                bound.loading_label,
                bound.results_html,
            ),
            pages_loaded: 0,
            fragments_appended: 0,
            last_outcome: None,
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn next_url(&self) -> Option<&str> {
        self.next_url.as_deref()
    }

    pub fn referrer(&self) -> Option<&str> {
        self.referrer.as_deref()
    }

    pub fn is_fetching(&self) -> bool {
        self.is_fetching
    }

    pub fn is_end_of_data(&self) -> bool {
        self.is_end_of_data
    }

    pub fn dom(&self) -> &InstanceDom {
        &self.dom
    }

    pub fn phase(&self) -> InstancePhase {
        if self.is_end_of_data {
            InstancePhase::Done
        } else if self.is_fetching {
            InstancePhase::Fetching
        } else if matches!(self.last_outcome, Some(TerminalOutcome::Error(_))) {
            InstancePhase::Error
        } else {
            InstancePhase::Idle
        }
    }

    fn view(&self) -> InstanceView {
        let control = match (self.dom.control(), self.next_url.as_ref()) {
            (Some(control), Some(next)) => Some(ControlView {
                data_next: next.clone(),
                label: control.label.clone(),
            }),
            _ => None,
        };
        InstanceView {
            instance: self.id,
            phase: self.phase(),
            classes: self.dom.classes().map(ToOwned::to_owned).collect(),
            control,
            results_html: self.dom.results_html().to_string(),
            pages_loaded: self.pages_loaded,
            fragments_appended: self.fragments_appended,
            last_outcome: self.last_outcome,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderState {
    instances: BTreeMap<InstanceId, ListInstance>,
    retry_budget: u32,
    next_id: InstanceId,
}

impl Default for LoaderState {
    fn default() -> Self {
        Self::with_retry_budget(DEFAULT_RETRY_BUDGET)
    }
}

impl LoaderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retry_budget(retry_budget: u32) -> Self {
        Self {
            instances: BTreeMap::new(),
            retry_budget,
            next_id: 1,
        }
    }

    pub fn retry_budget(&self) -> u32 {
        self.retry_budget
    }

    pub fn instance(&self, id: InstanceId) -> Option<&ListInstance> {
        self.instances.get(&id)
    }

    pub fn instance_ids(&self) -> Vec<InstanceId> {
        self.instances.keys().copied().collect()
    }

    pub fn fetching_count(&self) -> usize {
        self.instances.values().filter(|i| i.is_fetching).count()
    }

    pub fn view(&self) -> LoaderViewModel {
        LoaderViewModel {
            instances: self.instances.values().map(ListInstance::view).collect(),
            fetching: self.fetching_count(),
        }
    }

    pub(crate) fn bind(&mut self, bound: Vec<BoundInstance>) {
        for instance in bound {
            let id = self.next_id;
            self.next_id += 1;
            self.instances.insert(id, ListInstance::from_bound(id, instance));
        }
    }

    pub(crate) fn instance_mut(&mut self, id: InstanceId) -> Option<&mut ListInstance> {
        self.instances.get_mut(&id)
    }
}
