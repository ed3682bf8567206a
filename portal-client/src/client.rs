use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};
use tracing::{debug, error, info};

use crate::{
    domain::{AccountInfo, MeterInfo, UsageSnapshot},
    error::PortalError,
    portal::{
        selectors, ACCOUNT_SUMMARY_PATH, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, LOGIN_PATH,
        LOGIN_RETURN_QUERY,
    },
    scrape,
    session::{ReqwestSessionFactory, SessionFactory},
};

/// Session client for the water utility's customer portal.
///
/// The HTTP session is created on first use and kept until [`close`] is
/// called. Operations take `&mut self`; callers serialize them.
///
/// None of the public operations return an error. Transport, status and
/// markup failures are logged and reported as `false` or `None`.
///
/// [`close`]: PortalClient::close
pub struct PortalClient {
    username: String,
    password: String,
    base_url: String,
    timeout: Duration,
    session_factory: Box<dyn SessionFactory>,
    session: Option<reqwest::Client>,
    account_info: Option<AccountInfo>,
    meter_info: Option<MeterInfo>,
}

impl PortalClient {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            session_factory: Box::new(ReqwestSessionFactory),
            session: None,
            account_info: None,
            meter_info: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overall per-request timeout, bound when the session is created.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_session_factory(mut self, factory: impl SessionFactory + 'static) -> Self {
        self.session_factory = Box::new(factory);
        self
    }

    pub fn account_info(&self) -> Option<&AccountInfo> {
        self.account_info.as_ref()
    }

    pub fn meter_info(&self) -> Option<&MeterInfo> {
        self.meter_info.as_ref()
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Log in with the configured credentials.
    ///
    /// Returns `true` only when the page served after the credentials POST
    /// confirms the login.
    pub async fn login(&mut self) -> bool {
        match self.try_login().await {
            Ok(()) => {
                info!("logged into water portal");
                true
            }
            Err(e) => {
                debug!(error = %e, "login attempt failed");
                false
            }
        }
    }

    /// Fetch account identity and the selected meter, caching both.
    ///
    /// Logs in first only when no session exists yet. A session that exists
    /// but is no longer authenticated is used as-is.
    pub async fn get_account_info(&mut self) -> Option<AccountInfo> {
        if self.session.is_none() && !self.login().await {
            return None;
        }

        match self.try_get_account_info().await {
            Ok(info) => {
                self.meter_info = Some(info.meter());
                self.account_info = Some(info.clone());
                Some(info)
            }
            Err(PortalError::MissingElement(element)) => {
                debug!(element, "account summary element not found");
                None
            }
            Err(e) if e.is_parse() => {
                error!(error = %e, "could not parse account summary page");
                None
            }
            Err(e) => {
                error!(error = %e, "failed to get account summary");
                None
            }
        }
    }

    /// Fetch the usage table from the account summary page.
    ///
    /// Same session gate as [`get_account_info`](PortalClient::get_account_info).
    pub async fn get_usage_data(&mut self) -> Option<UsageSnapshot> {
        if self.session.is_none() && !self.login().await {
            return None;
        }

        match self.try_get_usage_data().await {
            Ok(snapshot) => Some(snapshot),
            Err(PortalError::MissingElement(selectors::USAGE_CONTAINER)) => {
                error!(element = selectors::USAGE_CONTAINER, "usage container not found on account summary page");
                None
            }
            Err(PortalError::MissingElement(element)) => {
                error!(element, "usage table not found in usage container");
                None
            }
            Err(e) if e.is_parse() => {
                error!(error = %e, "could not parse usage table");
                None
            }
            Err(e) => {
                error!(error = %e, "failed to get account summary for usage data");
                None
            }
        }
    }

    /// Drop the HTTP session. Safe to call repeatedly; the next operation
    /// creates a fresh session.
    pub fn close(&mut self) {
        if self.session.take().is_some() {
            debug!("portal session closed");
        }
    }

    async fn try_login(&mut self) -> Result<(), PortalError> {
        let session = self.ensure_session()?;
        let login_url = self.url(LOGIN_PATH);

        let login_page = fetch_page(session.get(&login_url))
            .await
            .inspect_err(|e| error!(error = %e, url = %login_url, "failed to get login page"))?;

        let form = scrape::parse_login_form(&login_page)
            .inspect_err(|e| error!(error = %e, "login page is missing required form data"))?;

        let submit_url = format!("{login_url}{LOGIN_RETURN_QUERY}");
        let body = form.submission(&self.username, &self.password);
        let content = fetch_page(session.post(&submit_url).form(&body))
            .await
            .inspect_err(|e| error!(error = %e, "login request failed"))?;

        if !scrape::is_logged_in(&content) {
            error!("login failed - invalid credentials or page structure changed");
            return Err(PortalError::LoginRejected);
        }

        Ok(())
    }

    async fn try_get_account_info(&mut self) -> Result<AccountInfo, PortalError> {
        let page = self.fetch_summary().await?;
        scrape::parse_account_summary(&page)
    }

    async fn try_get_usage_data(&mut self) -> Result<UsageSnapshot, PortalError> {
        let page = self.fetch_summary().await?;
        let records = scrape::parse_usage_table(&page)?;
        debug!(rows = records.len(), "parsed usage table");
        Ok(UsageSnapshot::from_records(records))
    }

    async fn fetch_summary(&mut self) -> Result<String, PortalError> {
        let session = self.ensure_session()?;
        fetch_page(session.get(self.url(ACCOUNT_SUMMARY_PATH))).await
    }

    fn ensure_session(&mut self) -> Result<reqwest::Client, PortalError> {
        if let Some(session) = &self.session {
            return Ok(session.clone());
        }

        let session = self
            .session_factory
            .create(self.timeout)
            .inspect_err(|e| error!(error = %e, "failed to create portal session"))?;
        debug!(timeout_secs = self.timeout.as_secs(), "portal session created");
        self.session = Some(session.clone());
        Ok(session)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Send the request and return the body, treating any status other than
/// 200 as a failure.
async fn fetch_page(request: RequestBuilder) -> Result<String, PortalError> {
    let response = request.send().await?;
    let status = response.status();
    if status != StatusCode::OK {
        return Err(PortalError::Status {
            url: response.url().to_string(),
            status,
        });
    }
    Ok(response.text().await?)
}
