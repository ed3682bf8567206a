use scraper::Html;

use crate::{
    error::PortalError,
    portal::{form, ACCOUNT_NUMBER_MARKER, WELCOME_MARKER},
};

use super::selector;

/// Hidden Web Forms state scraped from the login page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub viewstate: String,
    pub viewstate_generator: String,
    pub event_validation: String,
    /// Empty when the page carries no antiforgery input.
    pub antiforgery: String,
}

impl LoginForm {
    /// Form body for the credentials POST, in the order the portal's own
    /// form submits it.
    pub fn submission<'a>(&'a self, username: &'a str, password: &'a str) -> Vec<(&'static str, &'a str)> {
        vec![
            (form::LAST_FOCUS, ""),
            (form::EVENT_TARGET, ""),
            (form::EVENT_ARGUMENT, ""),
            (form::VIEWSTATE, self.viewstate.as_str()),
            (form::VIEWSTATE_GENERATOR, self.viewstate_generator.as_str()),
            (form::EVENT_VALIDATION, self.event_validation.as_str()),
            (form::USERNAME, username),
            (form::PASSWORD, password),
            (form::LOGIN_BUTTON, form::LOGIN_BUTTON_VALUE),
            (form::ANTIFORGERY, self.antiforgery.as_str()),
        ]
    }
}

/// Extract the hidden state fields from the login page.
///
/// The three state fields are required; an input without a `value` counts as
/// missing. The antiforgery token defaults to an empty string.
pub fn parse_login_form(html: &str) -> Result<LoginForm, PortalError> {
    let document = Html::parse_document(html);
    let inputs = selector("input")?;

    let input_value = |name: &str| -> Option<String> {
        document
            .select(&inputs)
            .find(|input| input.value().attr("name") == Some(name))
            .and_then(|input| input.value().attr("value"))
            .map(str::to_string)
    };
    let required = |name: &'static str| input_value(name).ok_or(PortalError::MissingField(name));

    Ok(LoginForm {
        viewstate: required(form::VIEWSTATE)?,
        viewstate_generator: required(form::VIEWSTATE_GENERATOR)?,
        event_validation: required(form::EVENT_VALIDATION)?,
        antiforgery: input_value(form::ANTIFORGERY).unwrap_or_default(),
    })
}

/// The page served after the credentials POST greets the holder and shows an
/// account number only when the login was accepted.
pub fn is_logged_in(content: &str) -> bool {
    content.contains(WELCOME_MARKER) && content.contains(ACCOUNT_NUMBER_MARKER)
}
