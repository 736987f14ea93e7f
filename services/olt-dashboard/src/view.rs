//! Per-view list controller
//!
//! A view owns its last good record collection, its query, and a load
//! status. Loads are tagged with a sequence number when they start; only the
//! newest issued load may change the view when it completes, so a slow
//! background poll can never overwrite the result of a later manual refresh.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::config::{ViewConfig, ViewKind};
use crate::normalize::normalize;
use crate::page::{clamp_page, paginate, Page};
use crate::query::{filter, rank_complete_first, CategoryFilter, Query};
use crate::records::{OltRecord, OnuRecord, Record, UnconfiguredOnu};

/// Load status of a view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewStatus {
    Idle,
    Loading,
    Ready,
    Failed { message: String },
}

impl fmt::Display for ViewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewStatus::Idle => write!(f, "Idle"),
            ViewStatus::Loading => write!(f, "Loading"),
            ViewStatus::Ready => write!(f, "Ready"),
            ViewStatus::Failed { .. } => write!(f, "Failed"),
        }
    }
}

/// Handle for one in-flight load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    pub seq: u64,
    pub force: bool,
}

/// What happened when a load completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Records were replaced with this many items
    Loaded(usize),
    /// The load failed; previous records were kept
    Failed(String),
    /// A newer load was issued meanwhile; the result was dropped
    Stale,
}

/// Serializable picture of a view for the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct ViewSnapshot {
    pub name: String,
    pub kind: ViewKind,
    pub status: ViewStatus,
    pub error: Option<String>,
    pub query: Query,
    pub categories: Vec<String>,
    pub last_updated_epoch_ms: Option<u64>,
    pub window: Page<Value>,
}

/// Type-erased view so differently typed lists can share one registry
pub trait ViewModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn kind(&self) -> ViewKind;

    /// Backend path this view loads from
    fn path(&self) -> &str;

    fn status(&self) -> &ViewStatus;

    fn record_count(&self) -> usize;

    /// Enter `Loading` and issue a new ticket
    fn begin_load(&mut self, force: bool) -> RequestTicket;

    /// Apply a finished load if `ticket` is still the newest one
    fn complete(&mut self, ticket: RequestTicket, payload: crate::Result<Value>, now_ms: u64) -> LoadOutcome;

    fn query(&self) -> &Query;

    fn set_search_term(&mut self, term: &str);

    fn set_category(&mut self, category: CategoryFilter);

    fn set_page(&mut self, page: usize);

    fn snapshot(&self) -> ViewSnapshot;

    /// Snapshot under a caller-supplied query; the stored query is untouched
    fn snapshot_with(&self, query: &Query) -> ViewSnapshot;
}

/// List view over one record type
pub struct ListView<R: Record> {
    name: String,
    kind: ViewKind,
    path: String,
    page_size: usize,
    status: ViewStatus,
    records: Vec<R>,
    error: Option<String>,
    query: Query,
    issued_seq: u64,
    last_updated_epoch_ms: Option<u64>,
}

impl<R: Record> fmt::Debug for ListView<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListView")
            .field("name", &self.name)
            .field("status", &self.status)
            .field("records", &self.records.len())
            .field("issued_seq", &self.issued_seq)
            .finish()
    }
}

impl<R: Record> ListView<R> {
    pub fn new(config: &ViewConfig) -> Self {
        Self {
            name: config.name.clone(),
            kind: config.kind,
            path: config.path().to_string(),
            page_size: config.page_size.max(1),
            status: ViewStatus::Idle,
            records: Vec::new(),
            error: None,
            query: Query::default(),
            issued_seq: 0,
            last_updated_epoch_ms: None,
        }
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Filtered and ranked records, before pagination
    pub fn visible(&self) -> Vec<&R> {
        self.visible_for(&self.query)
    }

    /// The current page of visible records
    pub fn window(&self) -> Page<&R> {
        self.window_for(&self.query)
    }

    fn visible_for(&self, query: &Query) -> Vec<&R> {
        let mut visible = filter(&self.records, &query.search_term, &query.category);
        rank_complete_first(&mut visible);
        visible
    }

    fn window_for(&self, query: &Query) -> Page<&R> {
        paginate(&self.visible_for(query), self.page_size, query.page)
    }

    /// Distinct categories present in the data, for the selector
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for record in &self.records {
            let category = record.category();
            if crate::normalize::is_blank(category) {
                continue;
            }
            if !categories.iter().any(|c| c.eq_ignore_ascii_case(category)) {
                categories.push(category.to_string());
            }
        }
        categories.sort();
        categories
    }

    // Keeps the stored page inside the range the current data allows
    fn clamp_query_page(&mut self) {
        let visible = filter(&self.records, &self.query.search_term, &self.query.category).len();
        self.query.page = clamp_page(self.query.page, visible, self.page_size);
    }
}

impl<R: Record> ViewModel for ListView<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ViewKind {
        self.kind
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn status(&self) -> &ViewStatus {
        &self.status
    }

    fn record_count(&self) -> usize {
        self.records.len()
    }

    fn begin_load(&mut self, force: bool) -> RequestTicket {
        self.issued_seq += 1;
        self.status = ViewStatus::Loading;
        tracing::debug!(
            "View '{}' loading (seq={}, force={})",
            self.name,
            self.issued_seq,
            force
        );
        RequestTicket {
            seq: self.issued_seq,
            force,
        }
    }

    fn complete(&mut self, ticket: RequestTicket, payload: crate::Result<Value>, now_ms: u64) -> LoadOutcome {
        if ticket.seq != self.issued_seq {
            tracing::debug!(
                "View '{}' dropping stale response (seq={}, newest={})",
                self.name,
                ticket.seq,
                self.issued_seq
            );
            return LoadOutcome::Stale;
        }

        match payload {
            Ok(value) => {
                self.records = normalize::<R>(&value);
                self.status = ViewStatus::Ready;
                self.error = None;
                self.last_updated_epoch_ms = Some(now_ms);
                self.clamp_query_page();
                LoadOutcome::Loaded(self.records.len())
            }
            Err(e) => {
                let message = e.user_message();
                self.status = ViewStatus::Failed {
                    message: message.clone(),
                };
                self.error = Some(message.clone());
                LoadOutcome::Failed(message)
            }
        }
    }

    fn query(&self) -> &Query {
        &self.query
    }

    fn set_search_term(&mut self, term: &str) {
        self.query.set_search_term(term);
        self.clamp_query_page();
    }

    fn set_category(&mut self, category: CategoryFilter) {
        self.query.set_category(category);
        self.clamp_query_page();
    }

    fn set_page(&mut self, page: usize) {
        self.query.set_page(page);
        self.clamp_query_page();
    }

    fn snapshot(&self) -> ViewSnapshot {
        self.snapshot_with(&self.query)
    }

    fn snapshot_with(&self, query: &Query) -> ViewSnapshot {
        let window = self
            .window_for(query)
            .map(|record| serde_json::to_value(record).unwrap_or(Value::Null));
        let mut query = query.clone();
        query.page = window.page;
        ViewSnapshot {
            name: self.name.clone(),
            kind: self.kind,
            status: self.status.clone(),
            error: self.error.clone(),
            query,
            categories: self.categories(),
            last_updated_epoch_ms: self.last_updated_epoch_ms,
            window,
        }
    }
}

/// Build the view matching a configuration entry
pub fn build_view(config: &ViewConfig) -> Box<dyn ViewModel> {
    match config.kind {
        ViewKind::ActiveOnus => Box::new(ListView::<OnuRecord>::new(config)),
        ViewKind::UnconfiguredOnus => Box::new(ListView::<UnconfiguredOnu>::new(config)),
        ViewKind::Olts => Box::new(ListView::<OltRecord>::new(config)),
    }
}
