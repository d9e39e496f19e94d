//! Transport behavior: headers, cookies, and retry

use crate::common::*;
use custody_statement::{RetryPolicy, Session, StatementError};
use std::time::Duration;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_postback_sends_ajax_headers_and_cookie() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(STATEMENT_PATH))
        .and(header("X-MicrosoftAjax", "Delta=true"))
        .and(header("X-Requested-With", "XMLHttpRequest"))
        .and(header("Cookie", "ASP.NET_SessionId=test-session"))
        .and(body_string("a=1&b=2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("|0|hiddenField|x|y|"))
        .expect(1)
        .mount(&server)
        .await;

    let session = create_session(&server);
    let text = session.post_statement("a=1&b=2").await.unwrap();
    assert_eq!(text, "|0|hiddenField|x|y|");
}

#[tokio::test]
async fn test_retries_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(STATEMENT_PATH))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(STATEMENT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(INITIAL_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let retry = RetryPolicy::new(3, Duration::from_millis(10));
    let session = Session::new(&session_config(&server), retry).unwrap();

    let html = session.get_statement_page().await.unwrap();
    assert!(html.contains("ddlAgentes"));
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(REPORT_PATH))
        .and(query_param("id", "missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let retry = RetryPolicy::new(3, Duration::from_millis(10));
    let session = Session::new(&session_config(&server), retry).unwrap();

    let result = session.download_report("missing").await;
    assert!(matches!(
        result,
        Err(StatementError::HttpStatus { status: 404, .. })
    ));
}
