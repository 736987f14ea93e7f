//! Poller: keeps every view and the OLT counters refreshed in the background

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::current_epoch_ms;
use crate::fetcher::RemoteFetcher;
use crate::records::OltStats;
use crate::state::StateHandle;
use crate::view::LoadOutcome;
use crate::DashboardError;

/// How often the summary counters are refreshed
pub const STATS_POLLING_INTERVAL: Duration = Duration::from_secs(60);

/// Load one view from the backend
///
/// The ticket is taken and the result applied under the state lock; the
/// request itself runs without it.
pub async fn refresh_view(
    fetcher: &RemoteFetcher,
    state: &StateHandle,
    name: &str,
    force: bool,
) -> crate::Result<LoadOutcome> {
    let (ticket, path) = {
        let mut state_lock = state.write().await;
        let view = state_lock
            .view_mut(name)
            .ok_or_else(|| DashboardError::UnknownView(name.to_string()))?;
        (view.begin_load(force), view.path().to_string())
    };

    let payload = fetcher.fetch(&path, ticket.force).await;

    let mut state_lock = state.write().await;
    let view = state_lock
        .view_mut(name)
        .ok_or_else(|| DashboardError::UnknownView(name.to_string()))?;
    let outcome = view.complete(ticket, payload, current_epoch_ms());

    match &outcome {
        LoadOutcome::Loaded(count) => {
            tracing::debug!("View '{}' loaded {} records", name, count)
        }
        LoadOutcome::Failed(message) => {
            tracing::warn!("Refreshing '{}' failed: {}", name, message)
        }
        LoadOutcome::Stale => {}
    }
    Ok(outcome)
}

/// Load the summary counters; failures keep the previous counters
pub async fn refresh_stats(fetcher: &RemoteFetcher, state: &StateHandle, path: &str) {
    match fetcher.fetch(path, false).await {
        Ok(payload) => {
            let stats = OltStats::from_raw(&payload);
            tracing::debug!("OLT stats: {:?}", stats);
            state.write().await.update_stats(stats, current_epoch_ms());
        }
        Err(e) => {
            tracing::warn!("Refreshing OLT stats failed: {}", e);
            state.write().await.stats_failed(e.user_message());
        }
    }
}

/// Runs one refresh loop per view plus one for the counters
pub struct Poller {
    fetcher: Arc<RemoteFetcher>,
    state: StateHandle,
    intervals: Vec<(String, Duration)>,
    stats_path: String,
    cancel: CancellationToken,
}

impl Poller {
    pub fn new(
        fetcher: Arc<RemoteFetcher>,
        config: &Config,
        state: StateHandle,
        cancel: CancellationToken,
    ) -> Self {
        let intervals = config
            .views
            .iter()
            .map(|v| (v.name.clone(), v.polling_interval()))
            .collect();
        Self {
            fetcher,
            state,
            intervals,
            stats_path: config.backend.stats_path.clone(),
            cancel,
        }
    }

    /// Start polling. Returns when the cancellation token is triggered.
    pub async fn run(&self) {
        let mut handles = Vec::new();

        for (name, interval) in &self.intervals {
            let fetcher = Arc::clone(&self.fetcher);
            let state = Arc::clone(&self.state);
            let cancel = self.cancel.clone();
            let name = name.clone();
            let interval = *interval;

            handles.push(tokio::spawn(async move {
                view_loop(fetcher, state, name, interval, cancel).await;
            }));
        }

        let fetcher = Arc::clone(&self.fetcher);
        let state = Arc::clone(&self.state);
        let cancel = self.cancel.clone();
        let stats_path = self.stats_path.clone();
        handles.push(tokio::spawn(async move {
            loop {
                refresh_stats(&fetcher, &state, &stats_path).await;
                tokio::select! {
                    _ = tokio::time::sleep(STATS_POLLING_INTERVAL) => {}
                    _ = cancel.cancelled() => break,
                }
            }
        }));

        self.cancel.cancelled().await;

        for handle in handles {
            let _ = handle.await;
        }
    }
}

async fn view_loop(
    fetcher: Arc<RemoteFetcher>,
    state: StateHandle,
    name: String,
    interval: Duration,
    cancel: CancellationToken,
) {
    loop {
        if let Err(e) = refresh_view(&fetcher, &state, &name, false).await {
            tracing::warn!("Polling '{}' stopped: {}", name, e);
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = cancel.cancelled() => {
                tracing::debug!("Polling loop for '{}' cancelled", name);
                break;
            }
        }
    }
}
