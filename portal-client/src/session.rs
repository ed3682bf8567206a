use std::time::Duration;

use reqwest::redirect::Policy;

use crate::error::PortalError;

const USER_AGENT: &str = concat!("portal-client/", env!("CARGO_PKG_VERSION"));
const MAX_REDIRECTS: usize = 10;

/// Builds the HTTP session a [`crate::PortalClient`] logs in with.
///
/// The session must keep cookies between requests; the portal tracks the
/// authenticated user in an ASP.NET session cookie.
pub trait SessionFactory: Send + Sync {
    fn create(&self, timeout: Duration) -> Result<reqwest::Client, PortalError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestSessionFactory;

impl SessionFactory for ReqwestSessionFactory {
    fn create(&self, timeout: Duration) -> Result<reqwest::Client, PortalError> {
        reqwest::Client::builder()
            .cookie_store(true)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PortalError::Session(e.to_string()))
    }
}
