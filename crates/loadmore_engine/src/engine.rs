use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use crate::fetch::{ChannelProgressSink, FetchSettings, PageFetcher, ReqwestPageFetcher};
use crate::{fetch_page_with_retry, EngineError, EngineEvent, InstanceId};

enum EngineCommand {
    FetchPage {
        instance: InstanceId,
        url: String,
        referrer: Option<String>,
        retry_budget: u32,
    },
}

/// Runs request chains on a background tokio runtime.
///
/// Chains for different instances run concurrently. The handle does not
/// deduplicate: callers gate activations per instance.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: FetchSettings) -> Result<Self, EngineError> {
        let fetcher = ReqwestPageFetcher::new(settings)?;
        Self::with_fetcher(Arc::new(fetcher))
    }

    pub fn with_fetcher(fetcher: Arc<dyn PageFetcher>) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let fetcher = fetcher.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(fetcher.as_ref(), command, event_tx).await;
                });
            }
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn fetch_page(
        &self,
        instance: InstanceId,
        url: impl Into<String>,
        referrer: Option<String>,
        retry_budget: u32,
    ) {
        let _ = self.cmd_tx.send(EngineCommand::FetchPage {
            instance,
            url: url.into(),
            referrer,
            retry_budget,
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    fetcher: &dyn PageFetcher,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::FetchPage {
            instance,
            url,
            referrer,
            retry_budget,
        } => {
            let sink = ChannelProgressSink::new(event_tx.clone());
            let result = fetch_page_with_retry(
                fetcher,
                instance,
                &url,
                referrer.as_deref(),
                retry_budget,
                &sink,
            )
            .await;
            let _ = event_tx.send(EngineEvent::PageCompleted { instance, result });
        }
    }
}
