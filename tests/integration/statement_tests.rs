//! Bulk collection against a mocked statement site

use crate::common::*;
use chrono::NaiveDate;
use custody_statement::crawler::{StatementCrawler, UnitFailure};
use custody_statement::storage::FolderStorage;
use custody_statement::{get_statement, get_statement_collection, StatementError};
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INSTITUTION_EVENT: &str = "__EVENTTARGET=ctl00%24ContentPlaceHolder1%24ddlAgentes";
const REPORT_EVENT: &str = "__EVENTTARGET=ctl00%24ContentPlaceHolder1%24btnGerarPlanilha";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Mounts the statement page and both institution postbacks
///
/// Institution 72 is refused by the server; institution 386 offers two
/// accounts and the months of January and February 2023.
async fn mount_cascade(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(STATEMENT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(INITIAL_PAGE))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(STATEMENT_PATH))
        .and(body_string_contains(INSTITUTION_EVENT))
        .and(body_string_contains("ddlAgentes=72"))
        .respond_with(ResponseTemplate::new(200).set_body_string(delta(
            "<div></div>",
            &[],
            &[&message_script(2, "Nenhuma conta encontrada")],
        )))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(STATEMENT_PATH))
        .and(body_string_contains(INSTITUTION_EVENT))
        .and(body_string_contains("ddlAgentes=386"))
        .and(body_string_contains("__VIEWSTATE=vs-initial"))
        .respond_with(ResponseTemplate::new(200).set_body_string(delta(
            BROKER_A_PANEL,
            &[("__VIEWSTATE", "vs-386"), ("__EVENTVALIDATION", "ev-386")],
            &[],
        )))
        .mount(server)
        .await;
}

/// Mounts report postbacks for a February 2023 request
///
/// Account 1111 gets a downloadable report; account 2222 gets an
/// informational message and no report.
async fn mount_february_reports(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(STATEMENT_PATH))
        .and(body_string_contains(REPORT_EVENT))
        .and(body_string_contains("ddlContas=1111"))
        .and(body_string_contains("ddlMes=28%2F02%2F2023+00%3A00%3A00"))
        .and(body_string_contains("__VIEWSTATE=vs-386"))
        .and(body_string_contains("__EVENTVALIDATION=ev-386"))
        .respond_with(ResponseTemplate::new(200).set_body_string(delta(
            "<div></div>",
            &[("__VIEWSTATE", "vs-report-1")],
            &["CEIWeb.ExibirDownload('r-1');"],
        )))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(STATEMENT_PATH))
        .and(body_string_contains(REPORT_EVENT))
        .and(body_string_contains("ddlContas=2222"))
        .and(body_string_contains("__VIEWSTATE=vs-report-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(delta(
            "<div></div>",
            &[("__VIEWSTATE", "vs-report-2")],
            &[&message_script(0, "Nenhum ativo encontrado")],
        )))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(REPORT_PATH))
        .and(query_param("id", "r-1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(statement_workbook()))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_collection_with_capped_date() {
    let server = MockServer::start().await;
    mount_cascade(&server).await;
    mount_february_reports(&server).await;

    let downloads = TempDir::new().unwrap();
    let session = create_session(&server);
    let options = crawl_options(downloads.path(), true);
    let storage = FolderStorage::new(downloads.path()).unwrap();

    let collection = StatementCrawler::new(&session, &options)
        .collect_statement(&storage, date(2024, 5, 10))
        .await
        .expect("collection succeeds");

    assert_eq!(
        collection.failures,
        vec![UnitFailure {
            institution: "72".to_string(),
            account: None,
            message: "Nenhuma conta encontrada".to_string(),
        }]
    );

    assert_eq!(collection.wallets.len(), 2);
    let first = &collection.wallets[0];
    assert_eq!(first.institution, "386");
    assert_eq!(first.institution_label, "BROKER A");
    assert_eq!(first.account, "1111");
    assert_eq!(first.month, date(2023, 2, 28));
    assert_eq!(first.assets_custody.len(), 2);
    assert_eq!(first.assets_guarantee.len(), 1);

    let petr = &first.assets_custody[0];
    assert_eq!(petr.asset_id, "1");
    assert_eq!(petr.specification, "ON NM");
    assert_eq!(petr.ticker, "PETR3");
    assert_eq!(petr.quantity, 1000);
    assert!((petr.price - 25.5).abs() < 1e-9);
    assert!((petr.value - 25500.0).abs() < 1e-9);
    assert_eq!(petr.ref_date, Some(date(2023, 2, 28)));

    let itsa = &first.assets_custody[1];
    assert_eq!(itsa.ticker, "ITSA4");
    assert_eq!(itsa.quantity, 200);
    assert!((itsa.price - 10.25).abs() < 1e-9);

    assert_eq!(first.assets_guarantee[0].ticker, "VALE3");
    assert!((first.assets_guarantee[0].value - 3000.0).abs() < 1e-9);

    let second = &collection.wallets[1];
    assert_eq!(second.account, "2222");
    assert!(second.assets_custody.is_empty());
    assert!(second.assets_guarantee.is_empty());

    // Reports are removed once extracted
    let leftover = std::fs::read_dir(downloads.path()).unwrap().count();
    assert_eq!(leftover, 0);
}

#[tokio::test]
async fn test_get_statement_returns_wallets() {
    let server = MockServer::start().await;
    mount_cascade(&server).await;
    mount_february_reports(&server).await;

    let downloads = TempDir::new().unwrap();
    let session = create_session(&server);
    let options = crawl_options(&downloads.path().join("reports"), true);

    let wallets = get_statement(&session, &options, date(2023, 2, 3))
        .await
        .expect("collection succeeds");

    assert_eq!(wallets.len(), 2);
    assert_eq!(wallets[0].month, date(2023, 2, 28));
    assert_eq!(wallets[0].assets_custody.len(), 2);

    let json = serde_json::to_value(&wallets).unwrap();
    assert_eq!(json[0]["assetsCustody"][0]["ticker"], "PETR3");
    assert_eq!(json[0]["assetsCustody"][0]["refDate"], "2023-02-28");
}

#[tokio::test]
async fn test_uncapped_date_outside_range() {
    let server = MockServer::start().await;
    mount_cascade(&server).await;

    // No option matches May 2019, so the formatted month end is sent
    Mock::given(method("POST"))
        .and(path(STATEMENT_PATH))
        .and(body_string_contains(REPORT_EVENT))
        .and(body_string_contains("ddlMes=31%2F05%2F2019"))
        .respond_with(ResponseTemplate::new(200).set_body_string(delta(
            "<div></div>",
            &[("__VIEWSTATE", "vs-386")],
            &[],
        )))
        .expect(2)
        .mount(&server)
        .await;

    let downloads = TempDir::new().unwrap();
    let session = create_session(&server);
    let options = crawl_options(downloads.path(), false);

    let wallets = get_statement(&session, &options, date(2019, 5, 1))
        .await
        .expect("collection succeeds");

    assert_eq!(wallets.len(), 2);
    for wallet in &wallets {
        assert_eq!(wallet.month, date(2019, 5, 31));
        assert!(wallet.assets_custody.is_empty());
    }
}

#[tokio::test]
async fn test_report_refusal_skips_account() {
    let server = MockServer::start().await;
    mount_cascade(&server).await;

    Mock::given(method("POST"))
        .and(path(STATEMENT_PATH))
        .and(body_string_contains(REPORT_EVENT))
        .and(body_string_contains("ddlContas=1111"))
        .respond_with(ResponseTemplate::new(200).set_body_string(delta(
            "<div></div>",
            &[("__VIEWSTATE", "vs-refused")],
            &[&message_script(2, "Erro ao gerar planilha")],
        )))
        .mount(&server)
        .await;

    // The refused postback's field updates must not leak into the next one
    Mock::given(method("POST"))
        .and(path(STATEMENT_PATH))
        .and(body_string_contains(REPORT_EVENT))
        .and(body_string_contains("ddlContas=2222"))
        .and(body_string_contains("__VIEWSTATE=vs-386"))
        .respond_with(ResponseTemplate::new(200).set_body_string(delta(
            "<div></div>",
            &[("__VIEWSTATE", "vs-report-2")],
            &[],
        )))
        .expect(1)
        .mount(&server)
        .await;

    let downloads = TempDir::new().unwrap();
    let session = create_session(&server);
    let options = crawl_options(downloads.path(), true);
    let storage = FolderStorage::new(downloads.path()).unwrap();

    let collection = StatementCrawler::new(&session, &options)
        .collect_statement(&storage, date(2023, 1, 15))
        .await
        .expect("collection succeeds");

    assert_eq!(collection.wallets.len(), 1);
    assert_eq!(collection.wallets[0].account, "2222");
    assert_eq!(collection.wallets[0].month, date(2023, 1, 31));
    assert!(collection.failures.contains(&UnitFailure {
        institution: "386".to_string(),
        account: Some("1111".to_string()),
        message: "Erro ao gerar planilha".to_string(),
    }));
}

#[tokio::test]
async fn test_malformed_delta_aborts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(STATEMENT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(INITIAL_PAGE))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(STATEMENT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Sessão expirada</html>"))
        .mount(&server)
        .await;

    let downloads = TempDir::new().unwrap();
    let session = create_session(&server);
    let options = crawl_options(downloads.path(), true);

    let result = get_statement(&session, &options, date(2023, 2, 1)).await;
    assert!(matches!(result, Err(StatementError::Decode(_))));
}

#[tokio::test]
async fn test_missing_institution_control() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(STATEMENT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>Login</body></html>"))
        .mount(&server)
        .await;

    let downloads = TempDir::new().unwrap();
    let session = create_session(&server);
    let options = crawl_options(downloads.path(), true);

    let result = get_statement(&session, &options, date(2023, 2, 1)).await;
    assert!(matches!(result, Err(StatementError::MissingControl { .. })));
}

#[tokio::test]
async fn test_missing_account_and_month_controls() {
    let server = MockServer::start().await;

    let page = INITIAL_PAGE
        .split("<select name=\"ctl00$ContentPlaceHolder1$ddlContas\"")
        .next()
        .unwrap()
        .to_string()
        + "</form></body></html>";

    Mock::given(method("GET"))
        .and(path(STATEMENT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .mount(&server)
        .await;

    // Nothing may be posted without the account and month selection
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let downloads = TempDir::new().unwrap();
    let session = create_session(&server);
    let options = crawl_options(downloads.path(), true);

    let result = get_statement(&session, &options, date(2023, 2, 1)).await;
    assert!(matches!(
        result,
        Err(StatementError::MissingControl { selector })
            if selector == "ctl00$ContentPlaceHolder1$ddlContas"
    ));
}

#[tokio::test]
async fn test_collection_output_lists_skipped_units() {
    let server = MockServer::start().await;
    mount_cascade(&server).await;
    mount_february_reports(&server).await;

    let downloads = TempDir::new().unwrap();
    let session = create_session(&server);
    let options = crawl_options(downloads.path(), true);

    let collection = get_statement_collection(&session, &options, date(2023, 2, 20))
        .await
        .expect("collection succeeds");

    let json = serde_json::to_value(&collection).unwrap();
    assert_eq!(json["wallets"].as_array().unwrap().len(), 2);
    assert_eq!(json["wallets"][0]["institutionLabel"], "BROKER A");
    assert_eq!(json["failures"][0]["institution"], "72");
    assert!(json["failures"][0]["account"].is_null());
    assert_eq!(json["failures"][0]["message"], "Nenhuma conta encontrada");
}
