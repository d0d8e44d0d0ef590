use crate::InstanceId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Instances discovered on the page, in document order.
    InstancesBound(Vec<BoundInstance>),
    /// User activated the "load more" control of an instance.
    LoadMoreClicked { instance: InstanceId },
    /// A request chain for an instance reached its end.
    PageLoaded {
        instance: InstanceId,
        outcome: PageOutcome,
    },
    /// Fallback for placeholder wiring.
    NoOp,
}

/// Everything captured about one container at bind time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundInstance {
    pub next_url: String,
    pub classes: Vec<String>,
    pub label: String,
    pub loading_label: Option<String>,
    pub results_html: String,
}

/// A validated page: fragments in response order and the cursor, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadedPage {
    pub fragments: Vec<String>,
    pub next_url: Option<String>,
    /// Absolute URL the page was served from.
    pub page_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    Loaded(LoadedPage),
    Failed(FailureReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Retry budget exhausted on transport failures, or the URL was unusable.
    Transport,
    /// 2xx response whose body did not have the expected shape.
    ContractViolation,
}
