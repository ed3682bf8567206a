use regex::Regex;
use scraper::Html;

use crate::{
    domain::AccountInfo,
    error::PortalError,
    portal::{selectors, ACCOUNT_NUMBER_PATTERN, ADDRESS_PATTERN, NAME_PATTERN},
};

use super::{element_text, selector};

/// Extract account identity and the selected meter from the summary page.
///
/// Only a missing summary element is an error. Labeled fields that do not
/// match, and a missing or unselected meter dropdown, become empty strings.
pub fn parse_account_summary(html: &str) -> Result<AccountInfo, PortalError> {
    let document = Html::parse_document(html);

    let summary_sel = selector(selectors::ACCOUNT_SUMMARY)?;
    let summary = document
        .select(&summary_sel)
        .next()
        .ok_or(PortalError::MissingElement(selectors::ACCOUNT_SUMMARY))?;
    let text = element_text(summary);

    let account_number = capture(ACCOUNT_NUMBER_PATTERN, &text)?;
    let name = capture(NAME_PATTERN, &text)?;
    let address = capture(ADDRESS_PATTERN, &text)?;

    let meter_sel = selector(selectors::METER_DROPDOWN)?;
    let option_sel = selector(selectors::SELECTED_METER)?;
    let (meter_id, meter_number) = document
        .select(&meter_sel)
        .next()
        .and_then(|dropdown| dropdown.select(&option_sel).next())
        .map(|option| {
            (
                option.value().attr("value").unwrap_or_default().to_string(),
                element_text(option).trim().to_string(),
            )
        })
        .unwrap_or_default();

    Ok(AccountInfo {
        account_number,
        name,
        address,
        meter_id,
        meter_number,
    })
}

/// First capture group of `pattern` in `text`, trimmed; empty when absent.
fn capture(pattern: &'static str, text: &str) -> Result<String, PortalError> {
    let re = Regex::new(pattern).map_err(|_| PortalError::Pattern(pattern))?;
    Ok(re
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default())
}
