//! Shared state for list views, OLT counters, and the traffic window

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::records::OltStats;
use crate::traffic::TrafficWindow;
use crate::view::{build_view, ViewModel};

/// Summary counters and whether they are current
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatsStatus {
    pub stats: OltStats,
    pub last_updated_epoch_ms: Option<u64>,
    pub error: Option<String>,
}

/// Shared state accessible by the poller, traffic feed, and dashboard
#[derive(Debug)]
pub struct SharedState {
    pub views: Vec<Box<dyn ViewModel>>,
    pub stats: StatsStatus,
    pub traffic: TrafficWindow,
    pub started_at: Instant,
}

impl SharedState {
    pub fn new(views: Vec<Box<dyn ViewModel>>, traffic_window_size: usize) -> Self {
        Self {
            views,
            stats: StatsStatus::default(),
            traffic: TrafficWindow::new(traffic_window_size),
            started_at: Instant::now(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let views = config.views.iter().map(build_view).collect();
        Self::new(views, config.traffic.window_size)
    }

    pub fn view(&self, name: &str) -> Option<&dyn ViewModel> {
        self.views
            .iter()
            .find(|v| v.name() == name)
            .map(|v| &**v)
    }

    pub fn view_mut(&mut self, name: &str) -> Option<&mut Box<dyn ViewModel>> {
        self.views.iter_mut().find(|v| v.name() == name)
    }

    pub fn view_names(&self) -> Vec<String> {
        self.views.iter().map(|v| v.name().to_string()).collect()
    }

    /// Record a successful stats poll
    pub fn update_stats(&mut self, stats: OltStats, now_ms: u64) {
        self.stats.stats = stats;
        self.stats.last_updated_epoch_ms = Some(now_ms);
        self.stats.error = None;
    }

    /// Record a failed stats poll; the last counters stay visible
    pub fn stats_failed(&mut self, message: String) {
        self.stats.error = Some(message);
    }
}

/// Thread-safe shared state handle
pub type StateHandle = Arc<RwLock<SharedState>>;

pub fn new_state_handle(config: &Config) -> StateHandle {
    Arc::new(RwLock::new(SharedState::from_config(config)))
}
