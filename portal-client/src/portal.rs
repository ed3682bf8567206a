//! Everything the client knows about the portal's URLs and markup.
//!
//! The portal is an ASP.NET Web Forms application. The names below are its
//! control identifiers and must be reproduced verbatim; any renaming on the
//! portal side surfaces as an empty result, not as something to adapt to.

pub const DEFAULT_BASE_URL: &str = "https://cus.plano.gov";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const LOGIN_PATH: &str = "/Account/Login";
pub const LOGIN_RETURN_QUERY: &str = "?ReturnUrl=%2fAccountSummary";
pub const ACCOUNT_SUMMARY_PATH: &str = "/AccountSummary";

/// Hidden state fields that must be echoed back on login.
pub mod form {
    pub const LAST_FOCUS: &str = "__LASTFOCUS";
    pub const EVENT_TARGET: &str = "__EVENTTARGET";
    pub const EVENT_ARGUMENT: &str = "__EVENTARGUMENT";
    pub const VIEWSTATE: &str = "__VIEWSTATE";
    pub const VIEWSTATE_GENERATOR: &str = "__VIEWSTATEGENERATOR";
    pub const EVENT_VALIDATION: &str = "__EVENTVALIDATION";
    pub const ANTIFORGERY: &str = "ctl00$MainContent$antiforgery";

    pub const USERNAME: &str = "ctl00$MainContent$Login1$UserName";
    pub const PASSWORD: &str = "ctl00$MainContent$Login1$Password";
    pub const LOGIN_BUTTON: &str = "ctl00$MainContent$Login1$test";
    pub const LOGIN_BUTTON_VALUE: &str = "Log in";
}

/// CSS selectors for the summary page.
pub mod selectors {
    pub const ACCOUNT_SUMMARY: &str = "span#MainContent_lblAccountSummary";
    pub const METER_DROPDOWN: &str = "select#MainContent_ddMeters";
    pub const SELECTED_METER: &str = r#"option[selected="selected"]"#;
    pub const USAGE_CONTAINER: &str = "#MainContent_lblReadDateTime";
    /// Id of the usage container as it appears in the page source.
    pub const USAGE_CONTAINER_ID: &str = "MainContent_lblReadDateTime";
    pub const USAGE_TABLE: &str = "table";
}

/// Both must appear in the page served after a successful login.
pub const WELCOME_MARKER: &str = "Welcome,";
pub const ACCOUNT_NUMBER_MARKER: &str = "Account Number:";

pub const ACCOUNT_NUMBER_PATTERN: &str = r"Account Number:\s*(\d+)";
pub const NAME_PATTERN: &str = r"Name:\s*([^\n]+)";
pub const ADDRESS_PATTERN: &str = r"Address:\s*([^\n]+)";
