//! Loadmore engine: page binding, paginated fetching with retry, and IO.
mod binder;
mod engine;
mod fetch;
mod persist;
mod retry;
mod types;
mod validate;

pub use binder::{bind_instances, BindError, BinderSettings, DiscoveredList};
pub use engine::EngineHandle;
pub use fetch::{
    ChannelProgressSink, FetchSettings, PageFetcher, ProgressSink, ReqwestPageFetcher,
    DEFAULT_NEXT_URL_HEADER,
};
pub use persist::{prepare_output_dir, PersistError, SnapshotWriter};
pub use retry::fetch_page_with_retry;
pub use types::{
    ContractViolation, EngineError, EngineEvent, FailureKind, FetchError, InstanceId,
    ItemFragment, LoadError, PageResponse, RawPage,
};
pub use validate::parse_page_body;
