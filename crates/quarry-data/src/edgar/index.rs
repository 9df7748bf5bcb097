//! Filing index page navigation.
//!
//! Each EDGAR filing has an index page listing its member documents.
//! The XBRL instance document appears in the `table.tableFile` whose
//! summary is "Data Files", on the row whose type column contains
//! "INS".

use crate::error::{DataError, Result};
use scraper::{Html, Selector};

const SEC_BASE_URL: &str = "https://www.sec.gov";

/// Find the XBRL instance document URL on a filing index page.
///
/// # Errors
/// Returns `DataError::FilingNotFound` when the page carries no data
/// files table or no row is typed as the instance document.
pub fn parse_index_page(html: &str) -> Result<String> {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse(r#"table.tableFile[summary="Data Files"] tr"#)
        .map_err(|e| DataError::Parse(format!("Invalid row selector: {}", e)))?;
    let cell_selector = Selector::parse("td")
        .map_err(|e| DataError::Parse(format!("Invalid cell selector: {}", e)))?;
    let link_selector = Selector::parse("a")
        .map_err(|e| DataError::Parse(format!("Invalid link selector: {}", e)))?;

    for row in document.select(&row_selector) {
        let cells: Vec<_> = row.select(&cell_selector).collect();
        if cells.len() <= 3 {
            continue;
        }

        let type_text = cells[3].text().collect::<String>();
        if !type_text.contains("INS") {
            continue;
        }

        if let Some(href) = cells[2]
            .select(&link_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
        {
            return Ok(format!("{}{}", SEC_BASE_URL, href));
        }
    }

    Err(DataError::FilingNotFound(
        "No XBRL instance document in filing index".to_string(),
    ))
}
