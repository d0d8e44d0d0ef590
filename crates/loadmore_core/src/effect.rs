use crate::InstanceId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch the next page for an instance, retrying transport failures up to
    /// `retry_budget` additional times. A relative `url` is resolved against
    /// `referrer`, the absolute URL of the page that supplied it.
    FetchPage {
        instance: InstanceId,
        url: String,
        referrer: Option<String>,
        retry_budget: u32,
    },
}
