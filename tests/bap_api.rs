//! Beer Awards Platform results API path, against a local mock server.

use brew_medals::api::HttpFetcher;
use brew_medals::models::Filter;
use brew_medals::parsers::{BapParser, CompetitionParser};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE_URL: &str = "https://beerawardsplatform.com/2025-ash-copper-state-cup/results";
const HTML: &str = include_str!("fixtures/bap_results.html");
const INFO_JSON: &str = include_str!("fixtures/bap_competition_info.json");
const RESULTS_JSON: &str = include_str!("fixtures/bap_results.json");

async fn mount_info(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/api/loadCompetitionInfo"))
        .and(query_param("competitionKey", "2025-ash-copper-state-cup"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_results_come_from_api() {
    let server = MockServer::start().await;
    mount_info(&server, INFO_JSON).await;
    Mock::given(method("GET"))
        .and(path("/api/getResults"))
        .and(query_param("competitionId", "Po3yXa0IULLxtPjWBlvm"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_JSON))
        .expect(1)
        .mount(&server)
        .await;

    let parser = BapParser::with_api_base(server.uri());
    let result = parser
        .parse_results(&HttpFetcher::default(), HTML, &Filter::default(), Some(PAGE_URL))
        .await
        .expect("api results");

    assert_eq!(result.row_count(), 4);
    let width = result.header_fields().len();
    assert!(result.rows().all(|r| r.len() == width));
    // The API ranks Cheyne Harvey 2nd where the saved page shows 3rd.
    let cheyne = result.rows().find(|r| r[5] == "Cheyne Harvey").unwrap();
    assert_eq!(cheyne[1], "2nd");
}

#[tokio::test]
async fn test_api_filter_applies() {
    let server = MockServer::start().await;
    mount_info(&server, INFO_JSON).await;
    Mock::given(method("GET"))
        .and(path("/api/getResults"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_JSON))
        .mount(&server)
        .await;

    let parser = BapParser::with_api_base(server.uri());
    let filter = Filter::new(Some("Christian Chandler".into()), None);
    let result = parser.parse_results(&HttpFetcher::default(), HTML, &filter, Some(PAGE_URL)).await.unwrap();
    assert_eq!(result.row_count(), 1);
    assert!(result.data.contains("Desert Haze"));
}

#[tokio::test]
async fn test_api_failure_falls_back_to_cards() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/loadCompetitionInfo"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let parser = BapParser::with_api_base(server.uri());
    let result = parser
        .parse_results(&HttpFetcher::default(), HTML, &Filter::default(), Some(PAGE_URL))
        .await
        .expect("card results");

    assert_eq!(result.row_count(), 4);
    let cheyne = result.rows().find(|r| r[5] == "Cheyne Harvey").unwrap();
    assert_eq!(cheyne[1], "3rd");
}

#[tokio::test]
async fn test_missing_competition_id_falls_back_to_cards() {
    let server = MockServer::start().await;
    mount_info(&server, r#"{"competition":{"name":"No id here"}}"#).await;
    Mock::given(method("GET"))
        .and(path("/api/getResults"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_JSON))
        .expect(0)
        .mount(&server)
        .await;

    let parser = BapParser::with_api_base(server.uri());
    let result = parser.parse_results(&HttpFetcher::default(), HTML, &Filter::default(), Some(PAGE_URL)).await;
    assert!(result.is_some());
}

#[tokio::test]
async fn test_malformed_json_falls_back_to_cards() {
    let server = MockServer::start().await;
    mount_info(&server, "<html>maintenance</html>").await;

    let parser = BapParser::with_api_base(server.uri());
    let result = parser.parse_results(&HttpFetcher::default(), HTML, &Filter::default(), Some(PAGE_URL)).await;
    assert_eq!(result.map(|r| r.row_count()), Some(4));
}

#[tokio::test]
async fn test_nothing_anywhere_is_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let parser = BapParser::with_api_base(server.uri());
    let result = parser
        .parse_results(&HttpFetcher::default(), "<html><body></body></html>", &Filter::default(), Some(PAGE_URL))
        .await;
    assert!(result.is_none());
}
