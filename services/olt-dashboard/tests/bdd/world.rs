//! BDD test world for the OLT dashboard service

use std::collections::HashMap;
use std::sync::Arc;

use cucumber::World;
use serde_json::Value;
use tokio::sync::RwLock;

use olt_dashboard::io::{HttpClient, HttpResponse};
use olt_dashboard::records::OnuRecord;
use olt_dashboard::state::StateHandle;
use olt_dashboard::traffic::TrafficWindow;
use olt_dashboard::view::LoadOutcome;

pub const BASE_URL: &str = "http://olt.test/api";

/// An HTTP client that serves canned bodies by URL and records every request
#[derive(Debug, Default)]
pub struct CannedHttpClient {
    pub responses: Arc<RwLock<HashMap<String, HttpResponse>>>,
    pub requests: Arc<RwLock<Vec<String>>>,
}

impl CannedHttpClient {
    pub async fn serve(&self, path: &str, status: u16, body: String) {
        self.responses
            .write()
            .await
            .insert(format!("{}{}", BASE_URL, path), HttpResponse { status, body });
    }

    async fn respond(&self, url: &str) -> olt_dashboard::Result<HttpResponse> {
        self.requests.write().await.push(url.to_string());
        match self.responses.read().await.get(url) {
            Some(response) => Ok(response.clone()),
            None => Err(olt_dashboard::DashboardError::Http(format!(
                "connection refused: {}",
                url
            ))),
        }
    }
}

#[async_trait::async_trait]
impl HttpClient for CannedHttpClient {
    async fn get(&self, url: &str) -> olt_dashboard::Result<HttpResponse> {
        self.respond(url).await
    }

    async fn post_json(&self, url: &str, _body: &Value) -> olt_dashboard::Result<HttpResponse> {
        self.respond(url).await
    }
}

#[derive(Debug, Default, World)]
pub struct DashboardWorld {
    // Normalization
    pub payload: Option<Value>,
    pub normalized: Vec<OnuRecord>,

    // Views and refreshes
    pub http: Option<Arc<CannedHttpClient>>,
    pub state: Option<StateHandle>,
    pub last_outcome: Option<LoadOutcome>,

    // Traffic
    pub traffic: Option<TrafficWindow>,

    // Dashboard
    pub response_status: Option<u16>,
    pub response_body: Option<String>,

    // Lifecycle
    pub lifecycle_build_succeeded: Option<bool>,
    pub lifecycle_start_succeeded: Option<bool>,
}

impl DashboardWorld {
    pub fn http(&mut self) -> Arc<CannedHttpClient> {
        self.http
            .get_or_insert_with(|| Arc::new(CannedHttpClient::default()))
            .clone()
    }
}
