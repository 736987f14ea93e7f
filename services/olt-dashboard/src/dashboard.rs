//! Web dashboard with JSON API endpoints and a plain HTML index

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use crate::actions::{AuthorizeRequest, OnuActions, WanStaticConfig};
use crate::config::ViewKind;
use crate::fetcher::{ActionOutcome, RemoteFetcher};
use crate::poller::refresh_view;
use crate::query::{CategoryFilter, Query as ListQuery};
use crate::state::StateHandle;
use crate::traffic::TrafficSnapshot;
use crate::view::{LoadOutcome, ViewSnapshot};
use crate::DashboardError;

/// Dashboard application state
#[derive(Clone)]
pub struct DashboardState {
    pub state: StateHandle,
    pub fetcher: Arc<RemoteFetcher>,
    pub actions: OnuActions,
}

/// Build the dashboard axum router
pub fn build_router(state: StateHandle, fetcher: Arc<RemoteFetcher>) -> Router {
    let dashboard_state = DashboardState {
        state,
        actions: OnuActions::new(Arc::clone(&fetcher)),
        fetcher,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/api/views", get(views_handler))
        .route("/api/views/{view}", get(view_handler))
        .route("/api/views/{view}/refresh", post(refresh_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/traffic", get(traffic_handler))
        .route("/api/onus/authorize", post(authorize_handler))
        .route("/api/onus/{sn}", get(onu_details_handler))
        .route("/api/onus/{id}/delete", post(delete_handler))
        .route("/api/onus/{id}/wan-static", post(wan_static_handler))
        .layer(cors)
        .with_state(dashboard_state)
}

/// Error response carrying a message the UI can show as-is
pub struct ApiError(DashboardError);

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DashboardError::UnknownView(_) => StatusCode::NOT_FOUND,
            DashboardError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DashboardError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DashboardError::Config(_) | DashboardError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_GATEWAY,
        };
        tracing::debug!("API error ({}): {}", status, self.0);
        (status, Json(json!({ "error": self.0.user_message() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Query-string parameters for a view window
#[derive(Debug, Default, Deserialize)]
pub struct ViewParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub page: Option<usize>,
}

async fn views_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;

    let views: Vec<Value> = state
        .views
        .iter()
        .map(|v| {
            json!({
                "name": v.name(),
                "kind": v.kind(),
                "status": v.status(),
                "record_count": v.record_count(),
            })
        })
        .collect();

    Json(views)
}

async fn view_handler(
    State(dashboard): State<DashboardState>,
    Path(name): Path<String>,
    Query(params): Query<ViewParams>,
) -> ApiResult<Json<ViewSnapshot>> {
    let state = dashboard.state.read().await;
    let view = state
        .view(&name)
        .ok_or_else(|| DashboardError::UnknownView(name.clone()))?;

    // Scoped to this request; term and category first since either resets the page
    let mut query = ListQuery::default();
    if let Some(term) = &params.q {
        query.set_search_term(term);
    }
    if let Some(category) = &params.category {
        query.set_category(CategoryFilter::parse(category));
    }
    if let Some(page) = params.page {
        query.set_page(page);
    }

    Ok(Json(view.snapshot_with(&query)))
}

async fn refresh_handler(
    State(dashboard): State<DashboardState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Value>> {
    let outcome = refresh_view(&dashboard.fetcher, &dashboard.state, &name, true).await?;

    let state = dashboard.state.read().await;
    let snapshot = state
        .view(&name)
        .map(|v| v.snapshot())
        .ok_or_else(|| DashboardError::UnknownView(name.clone()))?;

    let (result, message) = match outcome {
        LoadOutcome::Loaded(_) => ("loaded", None),
        LoadOutcome::Failed(message) => ("failed", Some(message)),
        LoadOutcome::Stale => ("stale", None),
    };
    Ok(Json(json!({
        "result": result,
        "message": message,
        "view": snapshot,
    })))
}

async fn stats_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;
    Json(state.stats.clone())
}

async fn traffic_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;
    Json(TrafficSnapshot::from(&state.traffic))
}

async fn onu_details_handler(
    State(dashboard): State<DashboardState>,
    Path(sn): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let record = dashboard.actions.details(&sn).await?;
    Ok(Json(record))
}

fn action_response(outcome: ActionOutcome) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": outcome.message,
    }))
}

async fn authorize_handler(
    State(dashboard): State<DashboardState>,
    Json(request): Json<AuthorizeRequest>,
) -> ApiResult<Json<Value>> {
    let outcome = dashboard.actions.authorize(&request).await?;
    Ok(action_response(outcome))
}

async fn delete_handler(
    State(dashboard): State<DashboardState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let outcome = dashboard.actions.delete(&id).await?;
    Ok(action_response(outcome))
}

async fn wan_static_handler(
    State(dashboard): State<DashboardState>,
    Path(id): Path<String>,
    Json(wan): Json<WanStaticConfig>,
) -> ApiResult<Json<Value>> {
    let outcome = dashboard.actions.set_wan_static(&id, &wan).await?;
    Ok(action_response(outcome))
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Columns shown for each kind of view: (field, header)
fn columns(kind: ViewKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        ViewKind::ActiveOnus => &[
            ("name", "Name"),
            ("sn", "SN"),
            ("olt_name", "OLT"),
            ("location", "Location"),
            ("status", "Status"),
            ("signal", "Signal"),
        ],
        ViewKind::UnconfiguredOnus => &[
            ("sn", "SN"),
            ("pon_type", "PON"),
            ("olt_name", "OLT"),
            ("board", "Board"),
            ("port", "Port"),
            ("model", "Model"),
        ],
        ViewKind::Olts => &[
            ("olt_name", "OLT"),
            ("uptime", "Uptime"),
            ("env_temp", "Temperature"),
        ],
    }
}

fn render_view(snapshot: &ViewSnapshot) -> String {
    let columns = columns(snapshot.kind);

    let header: String = columns
        .iter()
        .map(|(_, title)| format!(r#"<th style="padding: 0.5rem; text-align: left;">{}</th>"#, title))
        .collect();

    let rows: String = snapshot
        .window
        .items
        .iter()
        .map(|item| {
            let cells: String = columns
                .iter()
                .map(|(field, _)| {
                    let value = item.get(*field).and_then(Value::as_str).unwrap_or("-");
                    format!(r#"<td style="padding: 0.5rem;">{}</td>"#, escape_html(value))
                })
                .collect();
            format!(r#"<tr style="border-bottom: 1px solid #dee2e6;">{}</tr>"#, cells)
        })
        .collect();

    let notice = match &snapshot.error {
        Some(error) => format!(
            r#"<p style="color: #856404; background-color: #fff3cd; padding: 0.5rem;">{}</p>"#,
            escape_html(error)
        ),
        None => String::new(),
    };

    format!(
        r#"<section>
        <h2>{name} <small style="color: #6c757d;">{status}, {total} records, page {page} of {pages}</small></h2>
        {notice}
        <table style="width: 100%; border-collapse: collapse;">
            <thead><tr style="border-bottom: 2px solid #dee2e6;">{header}</tr></thead>
            <tbody>{rows}</tbody>
        </table>
    </section>"#,
        name = escape_html(&snapshot.name),
        status = snapshot.status,
        total = snapshot.window.total_items,
        page = snapshot.window.page,
        pages = snapshot.window.total_pages,
        notice = notice,
        header = header,
        rows = rows,
    )
}

async fn index_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;

    let stats = &state.stats.stats;
    let stats_notice = match &state.stats.error {
        Some(error) => format!(r#"<p style="color: #856404;">{}</p>"#, escape_html(error)),
        None => String::new(),
    };

    let traffic = TrafficSnapshot::from(&state.traffic);
    let traffic_label = traffic.status.label();
    let traffic_values = match &traffic.latest {
        Some(sample) => format!(
            "In {:.2} Gbps, Out {:.2} Gbps, Average {:.2} Gbps",
            sample.in_gbps, sample.out_gbps, sample.average_gbps
        ),
        None => "No samples yet".to_string(),
    };

    let views: String = state
        .views
        .iter()
        .map(|v| render_view(&v.snapshot()))
        .collect();

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>OLT Dashboard</title>
    <script>
        function refreshTraffic() {{
            fetch('/api/traffic')
                .then(r => r.json())
                .then(data => {{
                    const labels = {{ connecting: 'Connecting', live: 'Live' }};
                    const label = labels[data.status.state] || 'Simulated';
                    document.getElementById('traffic-origin').textContent = label;
                    if (data.latest) {{
                        const s = data.latest;
                        document.getElementById('traffic-values').textContent =
                            `In ${{s.in_gbps.toFixed(2)}} Gbps, Out ${{s.out_gbps.toFixed(2)}} Gbps, Average ${{s.average_gbps.toFixed(2)}} Gbps`;
                    }}
                }});
        }}
        setInterval(refreshTraffic, 5000);
    </script>
</head>
<body style="font-family: system-ui, sans-serif; max-width: 1200px; margin: 0 auto; padding: 1rem;">
    <h1>OLT Dashboard</h1>
    <section>
        <h2>ONUs</h2>
        <p>Waiting: {waiting} | Online: {online} | Offline: {offline} | Low signal: {low_signal}</p>
        {stats_notice}
    </section>
    <section>
        <h2>Traffic <small id="traffic-origin" style="color: #6c757d;">{traffic_label}</small></h2>
        <p id="traffic-values">{traffic_values}</p>
    </section>
    {views}
</body>
</html>"#,
        waiting = stats.waiting,
        online = stats.online,
        offline = stats.offline,
        low_signal = stats.low_signal,
        stats_notice = stats_notice,
        traffic_label = traffic_label,
        traffic_values = traffic_values,
        views = views,
    );

    Html(html)
}
