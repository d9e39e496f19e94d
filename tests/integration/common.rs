//! Fixtures shared by the integration tests

use custody_statement::config::{CrawlOptions, SessionConfig};
use custody_statement::{RetryPolicy, Session};
use rust_xlsxwriter::{Workbook, Worksheet};
use std::path::Path;
use wiremock::MockServer;

pub const STATEMENT_PATH: &str = "/app/ConsultarCarteiraAtivos.aspx";
pub const REPORT_PATH: &str = "/app/DownloadRelatorio.aspx";

/// Initial statement page: two institutions, empty account and month dropdowns
pub const INITIAL_PAGE: &str = r#"<html><body>
<form method="post" action="./ConsultarCarteiraAtivos.aspx" id="aspnetForm">
<input type="hidden" name="__EVENTTARGET" id="__EVENTTARGET" value="" />
<input type="hidden" name="__EVENTARGUMENT" id="__EVENTARGUMENT" value="" />
<input type="hidden" name="__LASTFOCUS" id="__LASTFOCUS" value="" />
<input type="hidden" name="__VIEWSTATE" id="__VIEWSTATE" value="vs-initial" />
<input type="hidden" name="__VIEWSTATEGENERATOR" id="__VIEWSTATEGENERATOR" value="gen-1" />
<input type="hidden" name="__EVENTVALIDATION" id="__EVENTVALIDATION" value="ev-initial" />
<select name="ctl00$ContentPlaceHolder1$ddlAgentes" id="ctl00_ContentPlaceHolder1_ddlAgentes">
  <option selected="selected" value="-1">Selecione</option>
  <option value="72">BROKER B</option>
  <option value="386">BROKER A</option>
</select>
<select name="ctl00$ContentPlaceHolder1$ddlContas" id="ctl00_ContentPlaceHolder1_ddlContas">
  <option value="0">Selecione</option>
</select>
<select name="ctl00$ContentPlaceHolder1$ddlMes" id="ctl00_ContentPlaceHolder1_ddlMes">
  <option value="0">Selecione</option>
</select>
<input type="submit" name="ctl00$ContentPlaceHolder1$btnGerarPlanilha" value="Gerar planilha" />
</form>
</body></html>"#;

/// Refreshed filter panel of institution 386
pub const BROKER_A_PANEL: &str = concat!(
    r#"<select name="ctl00$ContentPlaceHolder1$ddlContas" id="ctl00_ContentPlaceHolder1_ddlContas">"#,
    r#"<option value="0">Selecione</option>"#,
    r#"<option value="1111">1111</option>"#,
    r#"<option value="2222">2222</option>"#,
    r#"</select>"#,
    r#"<select name="ctl00$ContentPlaceHolder1$ddlMes" id="ctl00_ContentPlaceHolder1_ddlMes">"#,
    r#"<option value="0">Selecione</option>"#,
    r#"<option value="31/01/2023 00:00:00">janeiro/2023</option>"#,
    r#"<option value="28/02/2023 00:00:00">fevereiro/2023</option>"#,
    r#"</select>"#,
);

/// Builds a single-line partial-postback delta response
pub fn delta(panel: &str, hidden: &[(&str, &str)], scripts: &[&str]) -> String {
    let mut text = format!(
        "1|#||4|{}|updatePanel|ctl00_ContentPlaceHolder1_updFiltro|{}|",
        panel.len(),
        panel
    );
    for (id, value) in hidden {
        text.push_str(&format!("{}|hiddenField|{}|{}|", value.len(), id, value));
    }
    for script in scripts {
        text.push_str(&format!(
            "{}|scriptBlock|ScriptContentNoTags|{}|",
            script.len(),
            script
        ));
    }
    text
}

/// A message-display call with the given severity
pub fn message_script(severity: i32, text: &str) -> String {
    format!("CEIWeb.IncluirMensagem({},'{}');", severity, text)
}

pub fn session_config(server: &MockServer) -> SessionConfig {
    SessionConfig {
        base_url: format!("{}/app/", server.uri()),
        statement_page: "ConsultarCarteiraAtivos.aspx".to_string(),
        report_page: "DownloadRelatorio.aspx".to_string(),
        user_agent: "TestAgent/1.0".to_string(),
        timeout_secs: 5,
        cookies: vec!["ASP.NET_SessionId=test-session".to_string()],
    }
}

pub fn create_session(server: &MockServer) -> Session {
    Session::new(&session_config(server), RetryPolicy::none()).expect("session builds")
}

pub fn crawl_options(folder: &Path, cap_dates: bool) -> CrawlOptions {
    CrawlOptions {
        cap_dates,
        downloaded_folder: folder.to_path_buf(),
        trace: true,
    }
}

fn write_row(sheet: &mut Worksheet, row: u32, cells: &[&str]) {
    for (col, text) in cells.iter().enumerate() {
        if !text.is_empty() {
            sheet.write_string(row, col as u16, *text).unwrap();
        }
    }
}

/// A custody report with two custody rows and one guarantee row
pub fn statement_workbook() -> Vec<u8> {
    let header = [
        "Código",
        "Especificação",
        "Classificação",
        "Ticker",
        "Quantidade",
        "Preço",
        "Valor",
    ];

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    write_row(sheet, 0, &["Resumo dos saldos em 28/02/2023"]);
    write_row(sheet, 1, &["Ativos em Custódia"]);
    write_row(sheet, 2, &header);
    write_row(
        sheet,
        3,
        &["1", "ON  NM", "ACOES", "PETR3", "1.000", "25,50", "25.500,00"],
    );
    write_row(sheet, 4, &["2", "PN N1", "ACOES", "ITSA4"]);
    sheet.write_number(4, 4, 200).unwrap();
    sheet.write_number(4, 5, 10.25).unwrap();
    sheet.write_number(4, 6, 2050).unwrap();
    write_row(sheet, 6, &["Total em Custódia", "", "", "", "", "", "27.550,00"]);

    write_row(
        sheet,
        8,
        &["Ativos Depositados em Garantia para os Mercados de Derivativos"],
    );
    write_row(sheet, 9, &header);
    write_row(
        sheet,
        10,
        &["3", "ON", "ACOES", "VALE3", "50", "60,00", "3.000,00"],
    );
    write_row(sheet, 11, &["Total em Garantia", "", "", "", "", "", "3.000,00"]);

    workbook.save_to_buffer().unwrap()
}
