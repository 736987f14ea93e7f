//! Configuration types for the OLT dashboard service

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Shortest background refresh interval accepted for a view
pub const MIN_POLLING_INTERVAL_SECONDS: u64 = 30;
/// Longest background refresh interval accepted for a view
pub const MAX_POLLING_INTERVAL_SECONDS: u64 = 120;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default = "default_views")]
    pub views: Vec<ViewConfig>,
    #[serde(default)]
    pub traffic: TrafficConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            views: default_views(),
            traffic: TrafficConfig::default(),
            dashboard: DashboardConfig::default(),
        }
    }
}

impl Config {
    /// Reject configurations the service cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.backend.base_url.trim().is_empty() {
            return Err(crate::DashboardError::Config(
                "backend.base_url must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for view in &self.views {
            if !seen.insert(view.name.as_str()) {
                return Err(crate::DashboardError::Config(format!(
                    "Duplicate view name '{}'",
                    view.name
                )));
            }
            if view.page_size == 0 {
                return Err(crate::DashboardError::Config(format!(
                    "View '{}' has a page_size of 0",
                    view.name
                )));
            }
        }

        if self.traffic.window_size == 0 {
            return Err(crate::DashboardError::Config(
                "traffic.window_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where the OLT management backend lives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_stats_path")]
    pub stats_path: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_seconds: default_request_timeout(),
            stats_path: default_stats_path(),
        }
    }
}

/// The kinds of list the backend serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    ActiveOnus,
    UnconfiguredOnus,
    Olts,
}

impl ViewKind {
    pub fn default_path(&self) -> &'static str {
        match self {
            ViewKind::ActiveOnus => "/onus/details",
            ViewKind::UnconfiguredOnus => "/onus/unconfigured",
            ViewKind::Olts => "/olts/temperature",
        }
    }
}

/// One listing page of the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(rename = "type")]
    pub kind: ViewKind,
    pub name: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default = "default_polling_interval")]
    pub polling_interval_seconds: u64,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl ViewConfig {
    pub fn new(kind: ViewKind, name: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
            path: None,
            polling_interval_seconds: default_polling_interval(),
            page_size: default_page_size(),
        }
    }

    /// Backend path for this view, falling back to the kind's default endpoint
    pub fn path(&self) -> &str {
        self.path
            .as_deref()
            .unwrap_or_else(|| self.kind.default_path())
    }

    /// Background refresh interval, clamped to 30-120 seconds
    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs(self.polling_interval_seconds.clamp(
            MIN_POLLING_INTERVAL_SECONDS,
            MAX_POLLING_INTERVAL_SECONDS,
        ))
    }
}

/// Push channel for live traffic samples
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// `host:port` of the traffic event stream; simulated samples only when unset
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_reconnect_interval")]
    pub reconnect_interval_seconds: u64,
    #[serde(default = "default_simulation_interval")]
    pub simulation_interval_seconds: u64,
    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            address: None,
            reconnect_interval_seconds: default_reconnect_interval(),
            simulation_interval_seconds: default_simulation_interval(),
            window_size: default_window_size(),
        }
    }
}

/// Dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_dashboard_port")]
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_dashboard_port(),
        }
    }
}

fn default_views() -> Vec<ViewConfig> {
    vec![
        ViewConfig::new(ViewKind::ActiveOnus, "active_onus"),
        ViewConfig::new(ViewKind::UnconfiguredOnus, "unconfigured_onus"),
        ViewConfig::new(ViewKind::Olts, "olts"),
    ]
}

fn default_base_url() -> String {
    "http://localhost:4000/api".to_string()
}

fn default_request_timeout() -> u64 {
    15
}

fn default_stats_path() -> String {
    "/olt/stats".to_string()
}

fn default_polling_interval() -> u64 {
    60
}

fn default_page_size() -> usize {
    crate::page::DEFAULT_PAGE_SIZE
}

fn default_reconnect_interval() -> u64 {
    30
}

fn default_simulation_interval() -> u64 {
    5
}

fn default_window_size() -> usize {
    15
}

fn default_true() -> bool {
    true
}

fn default_dashboard_port() -> u16 {
    4100
}

/// Load configuration from a JSON file
pub fn load_config(path: &Path) -> crate::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::DashboardError::Config(format!("Failed to read config file {:?}: {}", path, e))
    })?;
    let config: Config = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(config)
}
