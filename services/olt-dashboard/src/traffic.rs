//! Traffic feed
//!
//! The backend pushes throughput samples over a TCP stream of
//! newline-delimited JSON events. While that stream is unavailable the feed
//! fills the window with simulated samples. Every sample and the connection
//! status carry their origin, so simulated values are never presented as
//! live ones.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

use crate::config::TrafficConfig;
use crate::state::StateHandle;
use crate::DashboardError;

/// Where a sample came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleOrigin {
    Live,
    Simulated,
}

/// State of the push channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConnectionStatus {
    Connecting,
    Live,
    Simulated { reason: String },
}

impl ConnectionStatus {
    pub fn origin(&self) -> SampleOrigin {
        match self {
            ConnectionStatus::Live => SampleOrigin::Live,
            _ => SampleOrigin::Simulated,
        }
    }

    /// Short label for the dashboard
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "Connecting",
            ConnectionStatus::Live => "Live",
            ConnectionStatus::Simulated { .. } => "Simulated",
        }
    }
}

/// One throughput reading in Gbps
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficSample {
    pub in_gbps: f64,
    pub out_gbps: f64,
    pub average_gbps: f64,
    pub timestamp_epoch_ms: u64,
    pub origin: SampleOrigin,
}

/// Raw event as sent by the backend
#[derive(Debug, Deserialize)]
struct TrafficEvent {
    #[serde(rename = "inGbps", default)]
    in_gbps: Option<f64>,
    #[serde(rename = "outGbps", default)]
    out_gbps: Option<f64>,
    #[serde(rename = "promedio", default)]
    average: Option<f64>,
}

/// Parse one event line into a live sample
pub fn parse_event(line: &str, now_ms: u64) -> crate::Result<TrafficSample> {
    let event: TrafficEvent = serde_json::from_str(line)
        .map_err(|e| DashboardError::Malformed(format!("Traffic event: {}", e)))?;

    if event.in_gbps.is_none() && event.out_gbps.is_none() && event.average.is_none() {
        return Err(DashboardError::Malformed(
            "Traffic event has no throughput fields".to_string(),
        ));
    }

    let in_gbps = event.in_gbps.unwrap_or(0.0);
    let out_gbps = event.out_gbps.unwrap_or(0.0);
    Ok(TrafficSample {
        in_gbps,
        out_gbps,
        average_gbps: event.average.unwrap_or((in_gbps + out_gbps) / 2.0),
        timestamp_epoch_ms: now_ms,
        origin: SampleOrigin::Live,
    })
}

/// A plausible sample for when the push channel is down
pub fn simulated_sample(now_ms: u64) -> TrafficSample {
    let mut rng = rand::rng();
    let in_gbps = rng.random_range(1.0..1.5);
    let out_gbps = rng.random_range(0.8..1.4);
    TrafficSample {
        in_gbps,
        out_gbps,
        average_gbps: (in_gbps + out_gbps) / 2.0,
        timestamp_epoch_ms: now_ms,
        origin: SampleOrigin::Simulated,
    }
}

/// Rolling window of the most recent samples
#[derive(Debug, Clone)]
pub struct TrafficWindow {
    samples: VecDeque<TrafficSample>,
    capacity: usize,
    status: ConnectionStatus,
}

impl TrafficWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            status: ConnectionStatus::Connecting,
        }
    }

    pub fn push(&mut self, sample: TrafficSample) {
        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn set_status(&mut self, status: ConnectionStatus) {
        if self.status != status {
            tracing::info!("Traffic feed status: {:?}", status);
            self.status = status;
        }
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    pub fn samples(&self) -> impl Iterator<Item = &TrafficSample> {
        self.samples.iter()
    }

    pub fn latest(&self) -> Option<&TrafficSample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Serializable picture of the traffic window
#[derive(Debug, Clone, Serialize)]
pub struct TrafficSnapshot {
    pub status: ConnectionStatus,
    pub latest: Option<TrafficSample>,
    pub samples: Vec<TrafficSample>,
}

impl From<&TrafficWindow> for TrafficSnapshot {
    fn from(window: &TrafficWindow) -> Self {
        Self {
            status: window.status.clone(),
            latest: window.latest().cloned(),
            samples: window.samples.iter().cloned().collect(),
        }
    }
}

/// Source of event lines from the push channel
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait LineSource: Send {
    /// Next line, `Ok(None)` once the stream is closed
    async fn read_line(&mut self) -> crate::Result<Option<String>>;
}

/// Opens the push channel
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait FeedConnector: Send + Sync {
    async fn connect(&self, addr: &str) -> crate::Result<Box<dyn LineSource>>;
}

/// LineSource over any byte stream, a TCP socket in production
pub struct StreamLineSource<S> {
    reader: BufReader<S>,
    buffer: String,
}

impl<S: AsyncRead + Unpin + Send> StreamLineSource<S> {
    pub fn new(stream: S) -> Self {
        Self {
            reader: BufReader::new(stream),
            buffer: String::new(),
        }
    }
}

#[async_trait]
impl<S: AsyncRead + Unpin + Send> LineSource for StreamLineSource<S> {
    async fn read_line(&mut self) -> crate::Result<Option<String>> {
        self.buffer.clear();
        match self.reader.read_line(&mut self.buffer).await? {
            0 => Ok(None),
            _ => Ok(Some(self.buffer.trim().to_string())),
        }
    }
}

/// TCP implementation of FeedConnector
pub struct TcpFeedConnector {
    timeout: Duration,
}

impl TcpFeedConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl FeedConnector for TcpFeedConnector {
    async fn connect(&self, addr: &str) -> crate::Result<Box<dyn LineSource>> {
        tracing::debug!("Connecting to traffic feed at {}", addr);
        let stream = tokio::time::timeout(self.timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| DashboardError::Http(format!("Connection to {} timed out", addr)))?
            .map_err(|e| DashboardError::Http(format!("Failed to connect to {}: {}", addr, e)))?;

        Ok(Box::new(StreamLineSource::new(stream)))
    }
}

/// Keeps the traffic window filled until cancelled
pub struct TrafficFeed {
    config: TrafficConfig,
    connector: Box<dyn FeedConnector>,
    state: StateHandle,
    cancel: CancellationToken,
}

impl TrafficFeed {
    pub fn new(
        config: TrafficConfig,
        connector: Box<dyn FeedConnector>,
        state: StateHandle,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            connector,
            state,
            cancel,
        }
    }

    /// Run until the cancellation token fires
    pub async fn run(&self) {
        loop {
            let reason = match self.config.address.as_deref() {
                Some(addr) => match self.stream_live(addr).await {
                    Some(reason) => reason,
                    None => break,
                },
                None => "No traffic feed configured".to_string(),
            };

            self.state
                .write()
                .await
                .traffic
                .set_status(ConnectionStatus::Simulated { reason });

            let simulate_for = match self.config.address {
                Some(_) => Duration::from_secs(self.config.reconnect_interval_seconds.max(1)),
                None => Duration::MAX,
            };
            if !self.simulate(simulate_for).await {
                break;
            }
        }
        tracing::debug!("Traffic feed stopped");
    }

    /// Read live events until the stream ends; `None` means cancelled
    async fn stream_live(&self, addr: &str) -> Option<String> {
        let mut source = tokio::select! {
            result = self.connector.connect(addr) => match result {
                Ok(source) => source,
                Err(e) => {
                    tracing::warn!("Traffic feed unavailable: {}", e);
                    return Some(e.to_string());
                }
            },
            _ = self.cancel.cancelled() => return None,
        };

        self.state.write().await.traffic.set_status(ConnectionStatus::Live);

        loop {
            let line = tokio::select! {
                line = source.read_line() => line,
                _ = self.cancel.cancelled() => return None,
            };

            match line {
                Ok(Some(line)) if line.is_empty() => continue,
                Ok(Some(line)) => match parse_event(&line, crate::current_epoch_ms()) {
                    Ok(sample) => self.state.write().await.traffic.push(sample),
                    Err(e) => tracing::debug!("Ignoring traffic event: {}", e),
                },
                Ok(None) => {
                    tracing::warn!("Traffic feed closed by the backend");
                    return Some("Traffic feed closed".to_string());
                }
                Err(e) => {
                    tracing::warn!("Traffic feed read failed: {}", e);
                    return Some(e.to_string());
                }
            }
        }
    }

    /// Push simulated samples for `duration`; false when cancelled
    async fn simulate(&self, duration: Duration) -> bool {
        let interval = Duration::from_secs(self.config.simulation_interval_seconds.max(1));
        let deadline = tokio::time::Instant::now().checked_add(duration);

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = self.cancel.cancelled() => return false,
            }
            self.state
                .write()
                .await
                .traffic
                .push(simulated_sample(crate::current_epoch_ms()));

            if let Some(deadline) = deadline {
                if tokio::time::Instant::now() >= deadline {
                    return true;
                }
            }
        }
    }
}
