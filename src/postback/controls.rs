//! Control names and postback whitelists of the statement page
//!
//! Form field names use the server's `$`-separated naming; DOM ids use `_`.

pub const EVENT_TARGET: &str = "__EVENTTARGET";
pub const EVENT_ARGUMENT: &str = "__EVENTARGUMENT";
pub const LAST_FOCUS: &str = "__LASTFOCUS";
pub const VIEW_STATE: &str = "__VIEWSTATE";
pub const VIEW_STATE_GENERATOR: &str = "__VIEWSTATEGENERATOR";
pub const EVENT_VALIDATION: &str = "__EVENTVALIDATION";

/// Marker field telling the server the postback is asynchronous
pub const ASYNC_POST: &str = "__ASYNCPOST";

pub const SCRIPT_MANAGER: &str = "ctl00$ContentPlaceHolder1$ToolkitScriptManager1";
pub const UPDATE_PANEL: &str = "ctl00$ContentPlaceHolder1$updFiltro";

pub const INSTITUTION_FIELD: &str = "ctl00$ContentPlaceHolder1$ddlAgentes";
pub const ACCOUNT_FIELD: &str = "ctl00$ContentPlaceHolder1$ddlContas";
pub const MONTH_FIELD: &str = "ctl00$ContentPlaceHolder1$ddlMes";
pub const REPORT_BUTTON: &str = "ctl00$ContentPlaceHolder1$btnGerarPlanilha";

pub const INSTITUTION_OPTIONS: &str = "#ctl00_ContentPlaceHolder1_ddlAgentes option";
pub const ACCOUNT_OPTIONS: &str = "#ctl00_ContentPlaceHolder1_ddlContas option";
pub const MONTH_OPTIONS: &str = "#ctl00_ContentPlaceHolder1_ddlMes option";

const INSTITUTION_FIELDS: &[&str] = &[
    SCRIPT_MANAGER,
    EVENT_TARGET,
    EVENT_ARGUMENT,
    LAST_FOCUS,
    VIEW_STATE,
    VIEW_STATE_GENERATOR,
    EVENT_VALIDATION,
    INSTITUTION_FIELD,
    ASYNC_POST,
];

const REPORT_FIELDS: &[&str] = &[
    SCRIPT_MANAGER,
    EVENT_TARGET,
    EVENT_ARGUMENT,
    LAST_FOCUS,
    VIEW_STATE,
    VIEW_STATE_GENERATOR,
    EVENT_VALIDATION,
    INSTITUTION_FIELD,
    ACCOUNT_FIELD,
    MONTH_FIELD,
    ASYNC_POST,
];

/// The kinds of postback the crawler issues
///
/// The server ignores or rejects postbacks carrying fields outside the set
/// expected for the triggering control, so each kind has its own whitelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostbackKind {
    /// Institution dropdown changed; refreshes accounts and months
    SelectInstitution,

    /// Report button pressed; generates the statement spreadsheet
    SubmitReport,
}

impl PostbackKind {
    /// Fields allowed in the request body, in submission order
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Self::SelectInstitution => INSTITUTION_FIELDS,
            Self::SubmitReport => REPORT_FIELDS,
        }
    }

    /// The control that raises the event
    pub fn event_target(&self) -> &'static str {
        match self {
            Self::SelectInstitution => INSTITUTION_FIELD,
            Self::SubmitReport => REPORT_BUTTON,
        }
    }

    /// Value of the script-manager field: `<panel>|<control>`
    pub fn script_manager_target(&self) -> String {
        format!("{}|{}", UPDATE_PANEL, self.event_target())
    }
}
