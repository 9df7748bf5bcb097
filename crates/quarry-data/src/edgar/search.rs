//! Filing search over the EDGAR browse-edgar endpoint.
//!
//! The full-text company search at
//! `https://www.sec.gov/cgi-bin/browse-edgar?action=getcompany&...`
//! returns an HTML page whose `table.tableFile2` lists one filing per
//! row, newest first. Each row links to the filing's index page.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use scraper::{Html, Selector};

const BROWSE_EDGAR_URL: &str = "https://www.sec.gov/cgi-bin/browse-edgar";
const SEC_BASE_URL: &str = "https://www.sec.gov";

/// Parameters for an EDGAR company filing search.
#[derive(Debug, Clone)]
pub struct FilingQuery {
    /// Zero-padded 10-digit CIK of the company.
    pub cik: String,
    /// Form type to search for (e.g. "10-Q", "10-K").
    pub form_type: String,
    /// Only return filings dated strictly before this date.
    pub date_before: Option<NaiveDate>,
    /// Maximum number of results per page.
    pub count: u32,
}

impl FilingQuery {
    /// Build a query for the most common case: all filings of one form
    /// type for one company.
    pub fn new(cik: impl Into<String>, form_type: impl Into<String>) -> Self {
        Self {
            cik: cik.into(),
            form_type: form_type.into(),
            date_before: None,
            count: 40,
        }
    }

    /// The browse-edgar URL for this query.
    pub fn search_url(&self) -> String {
        let dateb = self
            .date_before
            .map(|d| d.format("%Y%m%d").to_string())
            .unwrap_or_default();
        format!(
            "{}?action=getcompany&CIK={}&type={}&dateb={}&owner=include&count={}",
            BROWSE_EDGAR_URL, self.cik, self.form_type, dateb, self.count
        )
    }
}

/// A single filing row from a search results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilingLink {
    /// Filing date as reported by EDGAR, `YYYY-MM-DD`.
    pub filing_date: String,
    /// Absolute URL of the filing's index page.
    pub index_url: String,
}

impl FilingLink {
    /// The `YYYY-MM` prefix of the filing date, used to pick one
    /// filing per reporting period.
    pub fn year_month(&self) -> &str {
        if self.filing_date.len() >= 7 {
            &self.filing_date[0..7]
        } else {
            &self.filing_date
        }
    }
}

/// Parse a browse-edgar search results page into filing links.
///
/// Rows with fewer than four cells are header or spacer rows and are
/// skipped. Rows whose documents cell carries no link are skipped too;
/// a page with no usable rows yields an empty vec, not an error.
pub fn parse_search_results(html: &str) -> Result<Vec<FilingLink>> {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse("table.tableFile2 tr")
        .map_err(|e| DataError::Parse(format!("Invalid row selector: {}", e)))?;
    let cell_selector = Selector::parse("td")
        .map_err(|e| DataError::Parse(format!("Invalid cell selector: {}", e)))?;
    let link_selector = Selector::parse("a")
        .map_err(|e| DataError::Parse(format!("Invalid link selector: {}", e)))?;

    let mut links = Vec::new();

    for row in document.select(&row_selector) {
        let cells: Vec<_> = row.select(&cell_selector).collect();
        if cells.len() <= 3 {
            continue;
        }

        // Documents button lives in the second cell, the filing date in
        // the penultimate one.
        let Some(href) = cells[1]
            .select(&link_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
        else {
            continue;
        };

        let filing_date = cells[cells.len() - 2]
            .text()
            .collect::<String>()
            .trim()
            .to_string();

        links.push(FilingLink {
            filing_date,
            index_url: format!("{}{}", SEC_BASE_URL, href),
        });
    }

    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_PAGE: &str = r#"
        <html><body>
        <table class="tableFile2" summary="Results">
          <tr>
            <th>Filings</th><th>Format</th><th>Description</th>
            <th>Filing Date</th><th>File/Film Number</th>
          </tr>
          <tr>
            <td nowrap="nowrap">10-Q</td>
            <td nowrap="nowrap">
              <a href="/Archives/edgar/data/5272/000000527218000123-index.htm">Documents</a>
            </td>
            <td>Quarterly report</td>
            <td>2018-11-02</td>
            <td>001-08787</td>
          </tr>
          <tr>
            <td nowrap="nowrap">10-Q</td>
            <td nowrap="nowrap">
              <a href="/Archives/edgar/data/5272/000000527218000088-index.htm">Documents</a>
            </td>
            <td>Quarterly report</td>
            <td>2018-08-03</td>
            <td>001-08787</td>
          </tr>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_parse_search_results() {
        let links = parse_search_results(SEARCH_PAGE).unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].filing_date, "2018-11-02");
        assert_eq!(
            links[0].index_url,
            "https://www.sec.gov/Archives/edgar/data/5272/000000527218000123-index.htm"
        );
        assert_eq!(links[1].filing_date, "2018-08-03");
    }

    #[test]
    fn test_year_month() {
        let link = FilingLink {
            filing_date: "2018-11-02".to_string(),
            index_url: String::new(),
        };
        assert_eq!(link.year_month(), "2018-11");
    }

    #[test]
    fn test_empty_page_yields_no_links() {
        let links = parse_search_results("<html><body></body></html>").unwrap();
        assert!(links.is_empty());
    }

    #[test]
    fn test_rows_without_links_skipped() {
        let html = r#"
            <table class="tableFile2">
              <tr><td>10-Q</td><td>no link here</td><td>x</td><td>2018-11-02</td><td>y</td></tr>
            </table>
        "#;
        let links = parse_search_results(html).unwrap();
        assert!(links.is_empty());
    }

    #[test]
    fn test_search_url() {
        let mut query = FilingQuery::new("0000005272", "10-Q");
        query.date_before = NaiveDate::from_ymd_opt(2019, 1, 1);
        query.count = 100;
        assert_eq!(
            query.search_url(),
            "https://www.sec.gov/cgi-bin/browse-edgar?action=getcompany&CIK=0000005272&type=10-Q&dateb=20190101&owner=include&count=100"
        );
    }

    #[test]
    fn test_search_url_without_date() {
        let query = FilingQuery::new("0000005272", "10-K");
        assert!(query.search_url().contains("&dateb=&"));
    }
}
