use tracing::debug;

use crate::api::ApiError;
use crate::filter::FilterState;
use crate::models::{JobPosting, QueryRequest, QueryResult, SortColumn, SortDirection};

pub const DEFAULT_PAGE_SIZE: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridPhase {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// What `resolve` did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    Superseded,
}

/// Owns the paginated, sortable results table.
///
/// Queries are issued via `begin_query`, which snapshots the live filter
/// selection into the returned `QueryRequest`. When the response lands,
/// `resolve` compares that snapshot (and the page/sort it was issued
/// under) against live state and discards anything stale, so rapid filter
/// toggling can never let an out-of-order response overwrite the result
/// of a newer filter state. Last writer wins on snapshot, not on arrival
/// order.
pub struct GridController {
    phase: GridPhase,
    rows: Vec<JobPosting>,
    total: u64,
    page: u32, // 1-based
    page_size: u32,
    sort: SortColumn,
    direction: SortDirection,
    error: Option<String>,
    loaded_once: bool,
    cursor: usize,
}

impl GridController {
    pub fn new(page_size: u32) -> Self {
        Self {
            phase: GridPhase::Idle,
            rows: Vec::new(),
            total: 0,
            page: 1,
            page_size: page_size.max(1),
            sort: SortColumn::Title,
            direction: SortDirection::Ascending,
            error: None,
            loaded_once: false,
            cursor: 0,
        }
    }

    pub fn phase(&self) -> GridPhase {
        self.phase
    }

    pub fn rows(&self) -> &[JobPosting] {
        &self.rows
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_count(&self) -> u32 {
        (self.total.div_ceil(u64::from(self.page_size)) as u32).max(1)
    }

    pub fn sort(&self) -> SortColumn {
        self.sort
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Start a query for the current page/sort under the live filter
    /// selection. The returned request is the freshness snapshot the
    /// eventual response must present to `resolve`.
    pub fn begin_query(&mut self, filter: &FilterState) -> QueryRequest {
        self.phase = GridPhase::Loading;
        QueryRequest {
            titles: filter.snapshot(),
            page: self.page,
            page_size: self.page_size,
            sort: self.sort,
            direction: self.direction,
        }
    }

    /// Apply or discard a resolved query. A response is stale when the
    /// request it answers no longer matches the live filter selection or
    /// the currently requested page/sort; stale responses (success or
    /// failure) are dropped without touching rendered state.
    pub fn resolve(
        &mut self,
        request: &QueryRequest,
        outcome: Result<QueryResult, ApiError>,
        filter: &FilterState,
    ) -> Resolution {
        if self.is_stale(request, filter) {
            debug!(
                titles = ?request.titles,
                page = request.page,
                "discarding superseded grid response"
            );
            return Resolution::Superseded;
        }

        match outcome {
            Ok(result) => {
                self.rows = result.data;
                self.total = result.total;
                self.phase = GridPhase::Ready;
                self.error = None;
                self.loaded_once = true;
                self.cursor = self.cursor.min(self.rows.len().saturating_sub(1));
            }
            Err(err) => {
                self.phase = GridPhase::Failed;
                self.error = Some(err.to_string());
                // Keep last-good rows visible, unless nothing was ever
                // rendered successfully.
                if !self.loaded_once {
                    self.rows.clear();
                    self.total = 0;
                    self.cursor = 0;
                }
            }
        }
        Resolution::Applied
    }

    fn is_stale(&self, request: &QueryRequest, filter: &FilterState) -> bool {
        request.titles != filter.snapshot()
            || request.page != self.page
            || request.page_size != self.page_size
            || request.sort != self.sort
            || request.direction != self.direction
    }

    /// A filter change invalidates the page position.
    pub fn reset_page(&mut self) {
        self.page = 1;
    }

    pub fn next_page(&mut self) -> bool {
        if self.page < self.page_count() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Sort by the given column; selecting the current column flips the
    /// direction. Either way the page position resets.
    pub fn sort_by(&mut self, column: SortColumn) {
        if self.sort == column {
            self.direction = self.direction.toggled();
        } else {
            self.sort = column;
            self.direction = SortDirection::Ascending;
        }
        self.page = 1;
    }

    pub fn set_sort(&mut self, column: SortColumn, direction: SortDirection) {
        self.sort = column;
        self.direction = direction;
        self.page = 1;
    }

    // Row cursor for the rendered page. The row-to-record mapping lives
    // here so activating a row hands the full posting to the detail
    // overlay without a re-fetch.

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, index: usize) {
        if index < self.rows.len() {
            self.cursor = index;
        }
    }

    pub fn cursor_down(&mut self) {
        if !self.rows.is_empty() && self.cursor < self.rows.len() - 1 {
            self.cursor += 1;
        }
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn selected_posting(&self) -> Option<&JobPosting> {
        self.rows.get(self.cursor)
    }
}
