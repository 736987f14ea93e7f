//! OLT Dashboard - live view of a fiber access network
//!
//! Polls an OLT management backend for ONU and OLT lists, keeps a filtered
//! and paginated window per list, follows a traffic feed, and serves it all
//! as a small web dashboard.

pub mod actions;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetcher;
pub mod io;
pub mod normalize;
pub mod page;
pub mod poller;
pub mod query;
pub mod records;
pub mod state;
pub mod traffic;
pub mod view;

pub use config::{load_config, Config};
pub use error::{DashboardError, Result};

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio_util::sync::CancellationToken;

use crate::fetcher::RemoteFetcher;
use crate::io::{HttpClient, ReqwestHttpClient};
use crate::poller::Poller;
use crate::state::StateHandle;
use crate::traffic::{FeedConnector, TcpFeedConnector, TrafficFeed};

/// Milliseconds since the Unix epoch
pub fn current_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Assembles a dashboard, with optional test doubles for its I/O seams
pub struct OltDashboardBuilder {
    config: Config,
    http: Option<Arc<dyn HttpClient>>,
    connector: Option<Box<dyn FeedConnector>>,
    cancel: Option<CancellationToken>,
}

impl OltDashboardBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            http: None,
            connector: None,
            cancel: None,
        }
    }

    pub fn with_http_client(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    pub fn with_feed_connector(mut self, connector: Box<dyn FeedConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    pub fn with_cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn build(self) -> Result<OltDashboard> {
        self.config.validate()?;

        let timeout = Duration::from_secs(self.config.backend.request_timeout_seconds.max(1));
        let http = match self.http {
            Some(http) => http,
            None => Arc::new(ReqwestHttpClient::with_timeout(timeout)?),
        };
        let fetcher = Arc::new(RemoteFetcher::new(&self.config.backend.base_url, http));
        let cancel = self.cancel.unwrap_or_default();
        let state = state::new_state_handle(&self.config);

        let poller = Poller::new(
            Arc::clone(&fetcher),
            &self.config,
            Arc::clone(&state),
            cancel.clone(),
        );

        let traffic = if self.config.traffic.enabled {
            let connector = self
                .connector
                .unwrap_or_else(|| Box::new(TcpFeedConnector::new(timeout)));
            Some(TrafficFeed::new(
                self.config.traffic.clone(),
                connector,
                Arc::clone(&state),
                cancel.clone(),
            ))
        } else {
            None
        };

        Ok(OltDashboard {
            config: self.config,
            state,
            fetcher,
            poller,
            traffic,
            cancel,
        })
    }
}

/// A fully wired dashboard service
pub struct OltDashboard {
    config: Config,
    state: StateHandle,
    fetcher: Arc<RemoteFetcher>,
    poller: Poller,
    traffic: Option<TrafficFeed>,
    cancel: CancellationToken,
}

impl OltDashboard {
    pub fn state(&self) -> StateHandle {
        Arc::clone(&self.state)
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run until the cancellation token fires or ctrl-c is received
    pub async fn start(self) -> Result<()> {
        let cancel_for_signal = self.cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Shutdown signal received");
                    cancel_for_signal.cancel();
                }
                Err(e) => tracing::error!("Failed to listen for ctrl-c: {}", e),
            }
        });

        if self.config.dashboard.enabled {
            let dashboard_port = self.config.dashboard.port;
            let router = dashboard::build_router(Arc::clone(&self.state), Arc::clone(&self.fetcher));
            let cancel_for_dashboard = self.cancel.clone();

            tokio::spawn(async move {
                let addr = SocketAddr::from(([0, 0, 0, 0], dashboard_port));
                tracing::info!("Dashboard listening on http://{}", addr);

                let listener = match tokio::net::TcpListener::bind(addr).await {
                    Ok(l) => l,
                    Err(e) => {
                        tracing::error!(
                            "Failed to bind dashboard to port {}: {}. Continuing without dashboard.",
                            dashboard_port,
                            e
                        );
                        return;
                    }
                };

                axum::serve(listener, router)
                    .with_graceful_shutdown(async move {
                        cancel_for_dashboard.cancelled().await;
                    })
                    .await
                    .ok();

                tracing::debug!("Dashboard stopped");
            });
        }

        let traffic_handle = self
            .traffic
            .map(|feed| tokio::spawn(async move { feed.run().await }));

        tracing::info!(
            "OLT dashboard started against {}",
            self.fetcher.base_url()
        );

        // Blocks until cancelled
        self.poller.run().await;

        if let Some(handle) = traffic_handle {
            let _ = handle.await;
        }
        tracing::info!("OLT dashboard stopped");

        Ok(())
    }
}
