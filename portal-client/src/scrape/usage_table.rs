use scraper::{ElementRef, Html};

use crate::{domain::UsageRecord, error::PortalError, portal::selectors};

use super::{child_elements, element_text, selector};

const MIN_CELLS: usize = 3;

/// Extract the reading rows from the usage table on the summary page.
///
/// When the page source gives the table an explicit `<tbody>`, every body row
/// is a candidate and a `th` header row falls out for lack of `td` cells.
/// Otherwise exactly the first row is the header and is skipped. The parser
/// adds an implicit body section to bare rows, so the source text decides.
pub fn parse_usage_table(html: &str) -> Result<Vec<UsageRecord>, PortalError> {
    let document = Html::parse_document(html);

    let container_sel = selector(selectors::USAGE_CONTAINER)?;
    let table_sel = selector(selectors::USAGE_TABLE)?;

    let container = document
        .select(&container_sel)
        .next()
        .ok_or(PortalError::MissingElement(selectors::USAGE_CONTAINER))?;
    let table = container
        .select(&table_sel)
        .next()
        .ok_or(PortalError::MissingElement(selectors::USAGE_TABLE))?;

    let explicit_body = has_explicit_body(html);
    Ok(data_rows(table, explicit_body).filter_map(row_to_record).collect())
}

/// Whether the source of the first table after the usage container opens a
/// `<tbody>` of its own.
fn has_explicit_body(html: &str) -> bool {
    let lower = html.to_ascii_lowercase();
    let id = selectors::USAGE_CONTAINER_ID.to_ascii_lowercase();
    let Some(start) = lower.find(&id) else {
        return false;
    };
    let rest = &lower[start..];
    let Some(table_start) = rest.find("<table") else {
        return false;
    };
    let table = &rest[table_start..];
    let table_end = table.find("</table").unwrap_or(table.len());
    table[..table_end].contains("<tbody")
}

fn data_rows<'a>(
    table: ElementRef<'a>,
    explicit_body: bool,
) -> Box<dyn Iterator<Item = ElementRef<'a>> + 'a> {
    if explicit_body {
        Box::new(child_elements(table, "tbody").flat_map(|body| child_elements(body, "tr")))
    } else {
        let rows = table
            .children()
            .filter_map(ElementRef::wrap)
            .flat_map(|child| match child.value().name() {
                "tr" => vec![child],
                "thead" | "tbody" | "tfoot" => child_elements(child, "tr").collect(),
                _ => Vec::new(),
            });
        Box::new(rows.skip(1))
    }
}

fn row_to_record(row: ElementRef<'_>) -> Option<UsageRecord> {
    let cells: Vec<String> = child_elements(row, "td")
        .map(|cell| element_text(cell).trim().to_string())
        .collect();
    if cells.len() < MIN_CELLS {
        return None;
    }

    Some(UsageRecord {
        date: cells[0].clone(),
        time: cells[1].clone(),
        usage: parse_usage(&cells[2]),
    })
}

/// Gallons from a table cell. Anything that is not a finite, non-negative
/// number reads as zero.
pub(crate) fn parse_usage(cell: &str) -> f64 {
    match cell.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        _ => 0.0,
    }
}
