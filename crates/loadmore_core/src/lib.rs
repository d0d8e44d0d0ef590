//! Loadmore core: pure per-instance state machine and view-model helpers.
mod dom;
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use dom::{InstanceDom, LoadMoreControl, CLASS_ERROR, CLASS_HAS_MORE, CLASS_LOADING};
pub use effect::Effect;
pub use msg::{BoundInstance, FailureReason, LoadedPage, Msg, PageOutcome};
pub use state::{InstanceId, ListInstance, LoaderState, DEFAULT_RETRY_BUDGET};
pub use update::update;
pub use view_model::{ControlView, InstancePhase, InstanceView, LoaderViewModel, TerminalOutcome};
