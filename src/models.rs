use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub job_title: String,
    pub company_name: String,
    pub job_location: String,
    #[serde(default)]
    pub salary_range: String, // server-formatted, "N/A" or empty when unknown
    pub source: String, // provider identifier: "Adzuna", "USA Jobs", etc.
    pub application_url: String,
    pub job_description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortColumn {
    Title,
    Company,
    Location,
    Salary,
    Source,
}

impl SortColumn {
    /// Display columns in their fixed table order.
    pub const ALL: [SortColumn; 5] = [
        SortColumn::Title,
        SortColumn::Company,
        SortColumn::Location,
        SortColumn::Salary,
        SortColumn::Source,
    ];

    pub fn param(&self) -> &'static str {
        match self {
            SortColumn::Title => "job_title",
            SortColumn::Company => "company_name",
            SortColumn::Location => "job_location",
            SortColumn::Salary => "salary_range",
            SortColumn::Source => "source",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortColumn::Title => "Title",
            SortColumn::Company => "Company",
            SortColumn::Location => "Location",
            SortColumn::Salary => "Salary",
            SortColumn::Source => "Source",
        }
    }

    pub fn next(&self) -> SortColumn {
        match self {
            SortColumn::Title => SortColumn::Company,
            SortColumn::Company => SortColumn::Location,
            SortColumn::Location => SortColumn::Salary,
            SortColumn::Salary => SortColumn::Source,
            SortColumn::Source => SortColumn::Title,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn param(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }

    pub fn toggled(&self) -> SortDirection {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// One grid query, built fresh per request and never mutated. Also serves
/// as the freshness snapshot a response is validated against when it lands.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub titles: Vec<String>,
    pub page: u32,      // 1-based
    pub page_size: u32,
    pub sort: SortColumn,
    pub direction: SortDirection,
}

impl QueryRequest {
    /// Query-string pairs for `/api/jobs`. An empty selection sends no
    /// `titles` parameter at all: no filter, not "match nothing".
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs: Vec<(&'static str, String)> = self
            .titles
            .iter()
            .map(|t| ("titles", t.clone()))
            .collect();
        pairs.push(("page", self.page.to_string()));
        pairs.push(("page_size", self.page_size.to_string()));
        pairs.push((
            "sort",
            format!("{}:{}", self.sort.param(), self.direction.param()),
        ));
        pairs
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryResult {
    pub data: Vec<JobPosting>,
    pub total: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TitleVocabulary {
    pub titles: Vec<String>,
}

/// Result of a bulk refresh. Display-only; never merged into grid state.
#[derive(Debug, Clone, Deserialize)]
pub struct AggregationSummary {
    pub job_count: u64,
    #[serde(flatten)]
    pub per_source: BTreeMap<String, serde_json::Value>,
}

impl AggregationSummary {
    pub fn source_names(&self) -> Vec<&str> {
        self.per_source.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pairs_repeat_titles_and_encode_sort() {
        let req = QueryRequest {
            titles: vec!["Engineer".into(), "Manager".into()],
            page: 2,
            page_size: 25,
            sort: SortColumn::Company,
            direction: SortDirection::Descending,
        };
        let pairs = req.query_pairs();
        assert_eq!(pairs[0], ("titles", "Engineer".to_string()));
        assert_eq!(pairs[1], ("titles", "Manager".to_string()));
        assert!(pairs.contains(&("page", "2".to_string())));
        assert!(pairs.contains(&("page_size", "25".to_string())));
        assert!(pairs.contains(&("sort", "company_name:desc".to_string())));
    }

    #[test]
    fn empty_selection_sends_no_titles_parameter() {
        let req = QueryRequest {
            titles: vec![],
            page: 1,
            page_size: 25,
            sort: SortColumn::Title,
            direction: SortDirection::Ascending,
        };
        assert!(req.query_pairs().iter().all(|(k, _)| *k != "titles"));
    }

    #[test]
    fn aggregation_summary_splits_job_count_from_sources() {
        let raw = serde_json::json!({
            "adzuna": [{"job_title": "Engineer"}],
            "usa_jobs": [],
            "job_count": 7
        });
        let summary: AggregationSummary = serde_json::from_value(raw).unwrap();
        assert_eq!(summary.job_count, 7);
        assert_eq!(summary.source_names(), vec!["adzuna", "usa_jobs"]);
    }

    #[test]
    fn posting_tolerates_missing_salary_and_extra_fields() {
        let raw = serde_json::json!({
            "job_title": "Engineer",
            "company_name": "Acme",
            "job_location": "Remote",
            "source": "Adzuna",
            "application_url": "https://example.com/apply",
            "job_description": "Build things.",
            "salary_low": 50000.0,
            "job_category": "IT"
        });
        let posting: JobPosting = serde_json::from_value(raw).unwrap();
        assert_eq!(posting.salary_range, "");
        assert_eq!(posting.company_name, "Acme");
    }
}
