//! Text search results and the cursor over them

use crate::data::Bounds;
use serde::{Deserialize, Serialize};

/// One match of a text search over document content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// 1-based page number
    pub page: u32,
    /// Matched snippet with a little surrounding context
    pub text: String,
    /// Location of the match in surface coordinates
    pub bounds: Bounds,
    /// Ordinal among all matches of the search
    pub index: usize,
}

/// Results of the latest search plus the selected match
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub current_index: Option<usize>,
}

impl SearchState {
    pub fn set_results(&mut self, query: &str, results: Vec<SearchResult>) {
        self.query = query.to_string();
        self.current_index = if results.is_empty() { None } else { Some(0) };
        self.results = results;
    }

    pub fn current(&self) -> Option<&SearchResult> {
        self.current_index.and_then(|i| self.results.get(i))
    }

    /// Select a match by ordinal; out-of-range selections are ignored
    pub fn select(&mut self, index: usize) -> Option<&SearchResult> {
        if index < self.results.len() {
            self.current_index = Some(index);
        }
        self.current()
    }

    /// Advance to the next match, wrapping at the end
    pub fn next(&mut self) -> Option<&SearchResult> {
        if self.results.is_empty() {
            return None;
        }
        let next = self.current_index.map_or(0, |i| (i + 1) % self.results.len());
        self.select(next)
    }

    /// Step back to the previous match, wrapping at the start
    pub fn previous(&mut self) -> Option<&SearchResult> {
        if self.results.is_empty() {
            return None;
        }
        let len = self.results.len();
        let prev = self.current_index.map_or(len - 1, |i| (i + len - 1) % len);
        self.select(prev)
    }
}
