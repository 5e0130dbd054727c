//! Contracts through which a UI layer drives the annotation core.
//!
//! These carry no rendering logic; a host implements the handler traits and
//! reads the state structs.

use crate::search::SearchResult;
use crate::tool::ToolType;

pub const MIN_ZOOM: f32 = 0.25;
pub const MAX_ZOOM: f32 = 4.0;

/// Toolbar callbacks: `{ tool, onToolChange, zoom, onZoomChange, onSave, onLoad, onClear }`
pub trait ToolbarHandler {
    fn on_tool_change(&mut self, tool: ToolType);
    fn on_zoom_change(&mut self, zoom: f32);
    fn on_save(&mut self) {}
    fn on_load(&mut self) {}
    fn on_clear(&mut self);
}

/// Page navigation callback: `{ currentPage, totalPages, onPageChange }`
pub trait NavigatorHandler {
    fn on_page_change(&mut self, page: u32);
}

/// Search callbacks: `{ onSearch, results, currentIndex, onResultSelect }`
pub trait SearchHandler {
    fn on_search(&mut self, query: &str);
    fn on_result_select(&mut self, index: usize);
    fn results(&self) -> &[SearchResult];
    fn current_index(&self) -> Option<usize>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolbarState {
    pub tool: ToolType,
    pub zoom: f32,
}

impl Default for ToolbarState {
    fn default() -> Self {
        Self {
            tool: ToolType::Select,
            zoom: 1.0,
        }
    }
}

impl ToolbarState {
    pub fn clamp_zoom(zoom: f32) -> f32 {
        if zoom.is_finite() {
            zoom.clamp(MIN_ZOOM, MAX_ZOOM)
        } else {
            1.0
        }
    }
}

/// Current page within a document, always in `1..=total_pages`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigatorState {
    current_page: u32,
    total_pages: u32,
}

impl Default for NavigatorState {
    fn default() -> Self {
        Self::new(1)
    }
}

impl NavigatorState {
    pub fn new(total_pages: u32) -> Self {
        Self {
            current_page: 1,
            total_pages: total_pages.max(1),
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Jump to a page, clamped into range; returns the page landed on
    pub fn go_to(&mut self, page: u32) -> u32 {
        self.current_page = page.clamp(1, self.total_pages);
        self.current_page
    }

    pub fn next(&mut self) -> u32 {
        self.go_to(self.current_page.saturating_add(1))
    }

    pub fn previous(&mut self) -> u32 {
        self.go_to(self.current_page.saturating_sub(1))
    }

    pub fn set_total_pages(&mut self, total_pages: u32) {
        self.total_pages = total_pages.max(1);
        self.go_to(self.current_page);
    }
}
