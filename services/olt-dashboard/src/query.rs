//! Query state, filter predicate, and completeness ranking

use serde::{Deserialize, Serialize};

use crate::normalize::is_blank;
use crate::records::Record;

/// Category selector; `All` disables category filtering
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    /// Parse a selector as sent by the front-end; empty or "all" means no filter
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
            CategoryFilter::All
        } else {
            CategoryFilter::Named(raw.to_string())
        }
    }

    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Named(selected) => {
                !is_blank(category) && category.trim().to_lowercase() == selected.to_lowercase()
            }
        }
    }
}

/// User-controlled state of one list view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub search_term: String,
    pub category: CategoryFilter,
    pub page: usize,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            category: CategoryFilter::All,
            page: 1,
        }
    }
}

impl Query {
    /// Change the search term; returns to the first page
    pub fn set_search_term(&mut self, term: &str) {
        if self.search_term != term {
            self.search_term = term.to_string();
            self.page = 1;
        }
    }

    /// Change the category selector; returns to the first page
    pub fn set_category(&mut self, category: CategoryFilter) {
        if self.category != category {
            self.category = category;
            self.page = 1;
        }
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }
}

/// Does `record` satisfy the search term and category selector?
pub fn matches<R: Record>(record: &R, term: &str, category: &CategoryFilter) -> bool {
    if !category.matches(record.category()) {
        return false;
    }

    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }

    R::SEARCHABLE.iter().any(|name| {
        record
            .field(name)
            .filter(|value| !is_blank(value))
            .is_some_and(|value| value.to_lowercase().contains(&term))
    })
}

/// Records matching the query, in their original order
pub fn filter<'a, R: Record>(records: &'a [R], term: &str, category: &CategoryFilter) -> Vec<&'a R> {
    records
        .iter()
        .filter(|record| matches(*record, term, category))
        .collect()
}

/// A record is complete when any descriptive field carries a real value
pub fn is_complete<R: Record>(record: &R) -> bool {
    R::DESCRIPTIVE
        .iter()
        .any(|name| record.field(name).is_some_and(|value| !is_blank(value)))
}

/// Move complete records ahead of incomplete ones, keeping relative order
pub fn rank_complete_first<R: Record>(records: &mut [&R]) {
    if R::DESCRIPTIVE.is_empty() {
        return;
    }
    // sort_by_key is stable
    records.sort_by_key(|record| !is_complete(*record));
}
