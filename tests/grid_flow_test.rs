//! End-to-end controller flows against a mock server: facet load, filter,
//! query, detail overlay, stale-response rejection, bulk refresh.

use httpmock::prelude::*;
use jobgrid::api::ApiClient;
use jobgrid::detail::DetailPresenter;
use jobgrid::facets::FacetPanel;
use jobgrid::filter::FilterState;
use jobgrid::grid::{GridController, GridPhase, Resolution};
use jobgrid::refresh::BulkRefreshTrigger;

fn job(title: &str, company: &str) -> serde_json::Value {
    serde_json::json!({
        "job_title": title,
        "company_name": company,
        "job_location": "Denver, CO",
        "salary_range": "$80,000.00 - $95,000.00",
        "source": "USA Jobs",
        "application_url": format!("https://example.com/apply/{company}"),
        "job_description": format!("{title} role at {company}.")
    })
}

#[tokio::test]
async fn browse_scenario_from_facets_to_detail_and_back() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/job_titles");
        then.status(200)
            .json_body(serde_json::json!({"titles": ["Engineer", "Manager"]}));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/jobs")
            .query_param("titles", "Engineer");
        then.status(200).json_body(serde_json::json!({
            "data": [
                job("Engineer", "Acme"),
                job("Engineer", "Globex"),
                job("Engineer", "Initech"),
            ],
            "total": 3
        }));
    });

    let client = ApiClient::new(server.base_url());
    let mut filter = FilterState::new();
    let mut facets = FacetPanel::new();
    let mut grid = GridController::new(25);
    let mut detail = DetailPresenter::new();

    // Facets load and feed the vocabulary.
    let titles = client.job_titles().await.unwrap();
    facets.apply_vocabulary(titles.clone());
    filter.publish_vocabulary(titles);
    assert_eq!(facets.titles(), ["Engineer", "Manager"]);

    // User selects "Engineer"; the grid queries with that snapshot.
    filter.toggle("Engineer", true);
    let request = grid.begin_query(&filter);
    assert_eq!(request.titles, vec!["Engineer"]);

    let outcome = client.jobs(&request).await;
    assert_eq!(grid.resolve(&request, outcome, &filter), Resolution::Applied);
    assert_eq!(grid.phase(), GridPhase::Ready);
    assert_eq!(grid.rows().len(), 3);

    // Row 2 is activated; the overlay shows exactly that record.
    grid.cursor_down();
    detail.show(grid.selected_posting().cloned().unwrap());
    let fields = detail.fields().unwrap();
    assert_eq!(fields[0], ("Title", "Engineer"));
    assert_eq!(fields[1], ("Company", "Globex"));
    assert_eq!(fields[2], ("Location", "Denver, CO"));
    assert_eq!(fields[3], ("Source", "USA Jobs"));
    assert_eq!(fields[4], ("Salary", "$80,000.00 - $95,000.00"));
    assert_eq!(fields[5], ("Description", "Engineer role at Globex."));
    assert_eq!(detail.apply_url(), Some("https://example.com/apply/Globex"));

    // Dismissal leaves the grid untouched.
    detail.hide();
    assert!(!detail.is_visible());
    assert_eq!(grid.rows().len(), 3);
    assert_eq!(grid.phase(), GridPhase::Ready);
}

#[tokio::test]
async fn response_for_an_old_filter_is_discarded_even_over_real_http() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/jobs")
            .query_param("titles", "Engineer");
        then.status(200).json_body(serde_json::json!({
            "data": [job("Engineer", "Acme")],
            "total": 1
        }));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/jobs")
            .query_param("titles", "Manager");
        then.status(200).json_body(serde_json::json!({
            "data": [job("Manager", "Globex")],
            "total": 1
        }));
    });

    let client = ApiClient::new(server.base_url());
    let mut filter = FilterState::new();
    filter.publish_vocabulary(vec!["Engineer".to_string(), "Manager".to_string()]);
    let mut grid = GridController::new(25);

    filter.toggle("Engineer", true);
    let request_a = grid.begin_query(&filter);

    // Selection moves on before A resolves.
    filter.replace(vec!["Manager".to_string()]);
    let request_b = grid.begin_query(&filter);

    // B lands first.
    let outcome_b = client.jobs(&request_b).await;
    assert_eq!(
        grid.resolve(&request_b, outcome_b, &filter),
        Resolution::Applied
    );

    // A lands second and must not win.
    let outcome_a = client.jobs(&request_a).await;
    assert_eq!(
        grid.resolve(&request_a, outcome_a, &filter),
        Resolution::Superseded
    );
    assert_eq!(grid.rows().len(), 1);
    assert_eq!(grid.rows()[0].job_title, "Manager");
}

#[tokio::test]
async fn grid_failure_keeps_rows_until_a_retry_succeeds() {
    let server = MockServer::start();
    let mut good = server.mock(|when, then| {
        when.method(GET).path("/api/jobs").query_param("page", "1");
        then.status(200).json_body(serde_json::json!({
            "data": [job("Engineer", "Acme")],
            "total": 1
        }));
    });

    let client = ApiClient::new(server.base_url());
    let mut filter = FilterState::new();
    let mut grid = GridController::new(25);

    let request = grid.begin_query(&filter);
    let outcome = client.jobs(&request).await;
    grid.resolve(&request, outcome, &filter);
    assert_eq!(grid.rows().len(), 1);
    good.delete();

    // Server goes bad; the retry fails but the last good page stays up.
    server.mock(|when, then| {
        when.method(GET).path("/api/jobs");
        then.status(500);
    });
    let retry = grid.begin_query(&filter);
    let outcome = client.jobs(&retry).await;
    grid.resolve(&retry, outcome, &filter);

    assert_eq!(grid.phase(), GridPhase::Failed);
    assert!(grid.error().is_some());
    assert_eq!(grid.rows().len(), 1);
}

#[tokio::test]
async fn bulk_refresh_is_single_flight_and_touches_nothing_else() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/fetch_all_jobs");
        then.status(200).json_body(serde_json::json!({
            "adzuna": [job("Engineer", "Acme")],
            "usa_jobs": [],
            "job_count": 1
        }));
    });

    let client = ApiClient::new(server.base_url());
    let mut filter = FilterState::new();
    filter.publish_vocabulary(vec!["Engineer".to_string()]);
    filter.toggle("Engineer", true);
    let selection_before = filter.snapshot();

    let mut trigger = BulkRefreshTrigger::new();
    assert!(trigger.try_begin());
    // A second trigger while the first is outstanding is ignored and
    // issues no request.
    assert!(!trigger.try_begin());

    let summary = client.fetch_all_jobs().await.unwrap();
    trigger.complete(summary);

    mock.assert(); // exactly one request
    assert_eq!(trigger.last_summary().unwrap().job_count, 1);
    assert_eq!(filter.snapshot(), selection_before);
    assert!(trigger.try_begin());
}
