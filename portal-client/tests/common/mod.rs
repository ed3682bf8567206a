#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};

pub const SESSION_COOKIE: &str = "ASP.NET_SessionId=fake-session";

pub const REQUIRED_FIELDS: [&str; 3] = ["__VIEWSTATE", "__VIEWSTATEGENERATOR", "__EVENTVALIDATION"];

pub fn login_page(omit: Option<&str>) -> String {
    let field = |name: &str, value: &str| {
        if omit == Some(name) {
            String::new()
        } else {
            format!(r#"<input type="hidden" name="{name}" id="{name}" value="{value}" />"#)
        }
    };

    format!(
        r#"<!DOCTYPE html><html><head><title>Log in</title></head><body>
        <form method="post" action="./Login?ReturnUrl=%2fAccountSummary" id="ctl01">
          <input type="hidden" name="__LASTFOCUS" id="__LASTFOCUS" value="" />
          {viewstate}
          {generator}
          {validation}
          <input type="hidden" name="ctl00$MainContent$antiforgery" value="af-7f3a" />
          <input name="ctl00$MainContent$Login1$UserName" type="text" id="MainContent_Login1_UserName" />
          <input name="ctl00$MainContent$Login1$Password" type="password" id="MainContent_Login1_Password" />
          <input type="submit" name="ctl00$MainContent$Login1$test" value="Log in" />
        </form></body></html>"#,
        viewstate = field("__VIEWSTATE", "vs-payload"),
        generator = field("__VIEWSTATEGENERATOR", "CA0B0334"),
        validation = field("__EVENTVALIDATION", "ev-payload"),
    )
}

pub fn summary_page(usage_table: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><body>
        <p class="greeting">Welcome, Jane Doe</p>
        <span id="MainContent_lblAccountSummary">Account Number: 12345
Name: Jane Doe
Address: 1 Main St
</span>
        <select name="ctl00$MainContent$ddMeters" id="MainContent_ddMeters">
          <option value="98">M-98</option>
          <option selected="selected" value="99">M-99</option>
        </select>
        <div id="MainContent_lblReadDateTime">{usage_table}</div>
        </body></html>"#
    )
}

pub const USAGE_TABLE: &str = r#"<table class="reads">
  <tr><th>Date</th><th>Time</th><th>Gallons</th></tr>
  <tr><td>11/26/24</td><td>3:00 AM</td><td>12.5</td></tr>
  <tr><td>11/26/24</td><td>2:00 AM</td><td>abc</td></tr>
</table>"#;

pub const EMPTY_USAGE_TABLE: &str =
    r#"<table class="reads"><tr><th>Date</th><th>Time</th><th>Gallons</th></tr></table>"#;

/// How the fake portal answers the credentials POST.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// 302 to the summary page with a session cookie, like the real portal.
    Redirect,
    /// 200 with the given body.
    Page(String),
    Status(StatusCode),
}

pub struct PortalState {
    pub login_page: String,
    pub login_status: StatusCode,
    pub login_outcome: LoginOutcome,
    pub summary_page: String,
    pub summary_status: StatusCode,
    pub login_page_gets: usize,
    pub posts: Vec<Vec<(String, String)>>,
    pub post_queries: Vec<HashMap<String, String>>,
    pub summary_gets: usize,
    pub summary_cookies: Vec<bool>,
}

impl Default for PortalState {
    fn default() -> Self {
        Self {
            login_page: login_page(None),
            login_status: StatusCode::OK,
            login_outcome: LoginOutcome::Redirect,
            summary_page: summary_page(USAGE_TABLE),
            summary_status: StatusCode::OK,
            login_page_gets: 0,
            posts: Vec::new(),
            post_queries: Vec::new(),
            summary_gets: 0,
            summary_cookies: Vec::new(),
        }
    }
}

#[derive(Clone, Default)]
pub struct FakePortal {
    state: Arc<Mutex<PortalState>>,
}

impl FakePortal {
    pub fn state(&self) -> MutexGuard<'_, PortalState> {
        self.state.lock().unwrap()
    }

    /// Serve the portal on an ephemeral local port and return its base URL.
    pub async fn spawn(&self) -> String {
        let app = Router::new()
            .route("/Account/Login", get(serve_login_page).post(submit_login))
            .route("/AccountSummary", get(serve_summary))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app.into_make_service()).await.unwrap();
        });

        format!("http://{addr}")
    }
}

async fn serve_login_page(State(portal): State<FakePortal>) -> Response {
    let mut state = portal.state();
    state.login_page_gets += 1;
    (state.login_status, Html(state.login_page.clone())).into_response()
}

async fn submit_login(
    State(portal): State<FakePortal>,
    Query(query): Query<HashMap<String, String>>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let mut state = portal.state();
    state.posts.push(fields);
    state.post_queries.push(query);

    match state.login_outcome.clone() {
        LoginOutcome::Redirect => (
            StatusCode::FOUND,
            [
                (header::LOCATION, "/AccountSummary".to_string()),
                (header::SET_COOKIE, format!("{SESSION_COOKIE}; path=/; HttpOnly")),
            ],
        )
            .into_response(),
        LoginOutcome::Page(body) => Html(body).into_response(),
        LoginOutcome::Status(status) => status.into_response(),
    }
}

async fn serve_summary(State(portal): State<FakePortal>, headers: HeaderMap) -> Response {
    let has_cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains(SESSION_COOKIE));

    let mut state = portal.state();
    state.summary_gets += 1;
    state.summary_cookies.push(has_cookie);
    (state.summary_status, Html(state.summary_page.clone())).into_response()
}
