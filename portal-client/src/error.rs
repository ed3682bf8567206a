use reqwest::StatusCode;

/// Failures inside the portal client.
///
/// These never leave the public operations of [`crate::PortalClient`]; they
/// are logged there and turned into an empty result.
#[derive(thiserror::Error, Debug)]
pub enum PortalError {
    #[error("failed to create HTTP session: {0}")]
    Session(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected HTTP status {status} from {url}")]
    Status { url: String, status: StatusCode },
    #[error("required form field '{0}' missing from login page")]
    MissingField(&'static str),
    #[error("element '{0}' not found")]
    MissingElement(&'static str),
    #[error("invalid selector '{0}'")]
    Selector(&'static str),
    #[error("invalid pattern '{0}'")]
    Pattern(&'static str),
    #[error("login not confirmed: invalid credentials or page structure changed")]
    LoginRejected,
}

impl PortalError {
    /// True for the structural tier: the page arrived but did not look the
    /// way the client expects.
    pub fn is_parse(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_) | Self::MissingElement(_) | Self::Selector(_) | Self::Pattern(_)
        )
    }
}
