use crate::{FailureReason, InstanceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstancePhase {
    #[default]
    Idle,
    Fetching,
    Error,
    /// Terminal: the control is gone and no further request is issued.
    Done,
}

/// How an accepted activation ended. Exactly one per activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalOutcome {
    Continuing,
    Done,
    Error(FailureReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoaderViewModel {
    pub instances: Vec<InstanceView>,
    pub fetching: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceView {
    pub instance: InstanceId,
    pub phase: InstancePhase,
    pub classes: Vec<String>,
    pub control: Option<ControlView>,
    pub results_html: String,
    pub pages_loaded: u32,
    pub fragments_appended: usize,
    pub last_outcome: Option<TerminalOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlView {
    pub data_next: String,
    pub label: String,
}
