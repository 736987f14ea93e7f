//! Remote fetcher for the OLT management backend
//!
//! One call per request: no retries, no caching. The `force` flag is passed
//! through to the backend as `force=true` so it bypasses its own cache.

use std::sync::Arc;

use serde_json::Value;

use crate::io::HttpClient;
use crate::DashboardError;

/// Result of a POST action the backend accepted
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub message: Option<String>,
    pub body: Value,
}

/// Issues requests against a configured backend origin
pub struct RemoteFetcher {
    base_url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for RemoteFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteFetcher")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl RemoteFetcher {
    pub fn new(base_url: &str, http: Arc<dyn HttpClient>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the full URL for `path`, adding `force=true` when requested
    pub fn url(&self, path: &str, force: bool) -> String {
        let path = path.trim_start_matches('/');
        let mut url = format!("{}/{}", self.base_url, path);
        if force {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str("force=true");
        }
        url
    }

    /// GET `path` and parse the body as JSON
    pub async fn fetch(&self, path: &str, force: bool) -> crate::Result<Value> {
        let url = self.url(path, force);
        let response = self.http.get(&url).await?;

        if !response.is_success() {
            tracing::debug!("GET {} returned status {}", url, response.status);
            return Err(DashboardError::Status {
                status: response.status,
                body: response.body,
            });
        }

        let value: Value = serde_json::from_str(&response.body)
            .map_err(|e| DashboardError::Malformed(format!("GET {}: {}", url, e)))?;

        // SmartOLT reports failures in-band with `status: false`
        if success_flag(&value) == Some(false) {
            return Err(DashboardError::Rejected(
                backend_message(&value)
                    .unwrap_or_else(|| "The backend could not refresh this list".to_string()),
            ));
        }
        Ok(value)
    }

    /// POST a JSON body to `path` and interpret the backend's success indicator
    pub async fn post(&self, path: &str, body: &Value) -> crate::Result<ActionOutcome> {
        let url = self.url(path, false);
        let response = self.http.post_json(&url, body).await?;

        let parsed: Option<Value> = serde_json::from_str(&response.body).ok();

        if !response.is_success() {
            // A JSON error body carries the backend's reason
            if let Some(message) = parsed.as_ref().and_then(backend_message) {
                return Err(DashboardError::Rejected(message));
            }
            return Err(DashboardError::Status {
                status: response.status,
                body: response.body,
            });
        }

        match parsed {
            Some(body) => interpret_action(body),
            None => Err(DashboardError::Malformed(format!(
                "POST {}: response is not JSON",
                url
            ))),
        }
    }
}

/// Decide whether an action response body reports success
///
/// Looks for a boolean `status` or `success` at the top level, then under
/// `response`. Anything else is a rejection carrying the backend's message.
pub fn interpret_action(body: Value) -> crate::Result<ActionOutcome> {
    let succeeded = success_flag(&body)
        .or_else(|| body.get("response").and_then(success_flag))
        .unwrap_or(false);

    let message = backend_message(&body);
    if succeeded {
        Ok(ActionOutcome { message, body })
    } else {
        Err(DashboardError::Rejected(
            message.unwrap_or_else(|| "The backend rejected the request".to_string()),
        ))
    }
}

fn success_flag(value: &Value) -> Option<bool> {
    ["status", "success"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_bool))
}

fn backend_message(value: &Value) -> Option<String> {
    let lookup = |v: &Value| {
        ["message", "error"].iter().find_map(|key| {
            v.get(*key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
    };
    lookup(value).or_else(|| value.get("response").and_then(lookup))
}
