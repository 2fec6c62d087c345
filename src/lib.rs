pub mod api;
pub mod detail;
pub mod facets;
pub mod filter;
pub mod grid;
pub mod models;
pub mod refresh;
pub mod tui;

pub use api::{ApiClient, ApiError};
pub use models::{AggregationSummary, JobPosting, QueryRequest, QueryResult};
