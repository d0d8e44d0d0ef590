use loadmore_logging::{loadmore_debug, loadmore_warn};

use crate::{
    parse_page_body, EngineEvent, InstanceId, LoadError, PageFetcher, PageResponse, ProgressSink,
};

/// Runs one logical "fetch next page" chain.
///
/// Retryable transport failures re-issue the identical request immediately
/// while `retry_budget` is above zero, so a chain makes at most
/// `retry_budget + 1` requests. A 2xx response with a malformed body ends the
/// chain at once. `referrer` is the absolute URL of the previous page, if any.
pub async fn fetch_page_with_retry(
    fetcher: &dyn PageFetcher,
    instance: InstanceId,
    url: &str,
    referrer: Option<&str>,
    retry_budget: u32,
    sink: &dyn ProgressSink,
) -> Result<PageResponse, LoadError> {
    let mut remaining = retry_budget;
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match fetcher.fetch_page(url, referrer).await {
            Ok(raw) => {
                let fragments = parse_page_body(&raw.body)
                    .map_err(|violation| LoadError::Contract { attempts, violation })?;
                loadmore_debug!(
                    "instance={} attempt={} fragments={} next={:?}",
                    instance,
                    attempts,
                    fragments.len(),
                    raw.next_url
                );
                return Ok(PageResponse {
                    url: raw.url,
                    fragments,
                    next_url: raw.next_url,
                    attempts,
                });
            }
            Err(error) if error.kind.is_retryable() && remaining > 0 => {
                remaining -= 1;
                loadmore_warn!(
                    "instance={} attempt={} failed: {}; retrying ({} left)",
                    instance,
                    attempts,
                    error,
                    remaining
                );
                sink.emit(EngineEvent::Retrying {
                    instance,
                    attempt: attempts,
                    remaining,
                    error,
                });
            }
            Err(last) => return Err(LoadError::Transport { attempts, last }),
        }
    }
}
