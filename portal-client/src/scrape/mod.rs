//! Pure HTML extraction. Nothing here performs I/O; every function takes the
//! page body as a string and builds its own parsed document.

pub mod account_summary;
pub mod login_form;
pub mod usage_table;

pub use account_summary::parse_account_summary;
pub use login_form::{is_logged_in, parse_login_form, LoginForm};
pub use usage_table::parse_usage_table;

use scraper::{ElementRef, Selector};

use crate::error::PortalError;

pub(crate) fn selector(css: &'static str) -> Result<Selector, PortalError> {
    Selector::parse(css).map_err(|_| PortalError::Selector(css))
}

/// All descendant text nodes, concatenated as-is.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

pub(crate) fn child_elements<'a>(
    element: ElementRef<'a>,
    name: &'a str,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name() == name)
}
