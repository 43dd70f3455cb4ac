// src/extract/html.rs

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};

use super::{ExtractionError, RawTable};

/// First header cell of the wage table on the OEWS area page.
pub const TARGET_HEADER: &str = "Occupation (SOC code)";

/// Trailing summary rows at the bottom of the OEWS table.
pub const TRAILING_SUMMARY_ROWS: usize = 2;

fn sel(css: &str) -> Selector {
    Selector::parse(css).expect("static selector should parse")
}

/// Text of an element with every text node trimmed and concatenated.
fn cell_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).collect::<String>()
}

fn find_target_table<'a>(doc: &'a Html) -> Option<ElementRef<'a>> {
    let table_sel = sel("table");
    let thead_sel = sel("thead");
    let tr_sel = sel("tr");
    let th_sel = sel("th");

    doc.select(&table_sel).find(|table| {
        table
            .select(&thead_sel)
            .next()
            .and_then(|thead| thead.select(&tr_sel).next())
            .and_then(|tr| tr.select(&th_sel).next())
            .map(|th| cell_text(th) == TARGET_HEADER)
            .unwrap_or(false)
    })
}

/// True once the markup contains the wage table; used as the page-readiness probe.
pub fn has_target_table(html: &str) -> bool {
    let doc = Html::parse_document(html);
    find_target_table(&doc).is_some()
}

/// Locate the wage table and return its header labels and body rows as text.
///
/// The last [`TRAILING_SUMMARY_ROWS`] body rows are dropped unconditionally.
#[instrument(level = "info", skip(html), fields(html_len = html.len()))]
pub fn extract_table(html: &str) -> Result<RawTable, ExtractionError> {
    let doc = Html::parse_document(html);
    let table = find_target_table(&doc).ok_or(ExtractionError::TableNotFound)?;
    info!("target table found");

    let th_sel = sel("th");
    let td_sel = sel("td");
    let tr_sel = sel("tr");

    let headers: Vec<String> = table
        .select(&sel("thead"))
        .next()
        .map(|thead| thead.select(&th_sel).map(cell_text).collect())
        .unwrap_or_default();

    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    if let Some(tbody) = table.select(&sel("tbody")).next() {
        for tr in tbody.select(&tr_sel) {
            let mut row = Vec::with_capacity(headers.len());
            if let Some(th) = tr.select(&th_sel).next() {
                row.push(Some(cell_text(th)));
            }
            row.extend(tr.select(&td_sel).map(|td| Some(cell_text(td))));
            rows.push(row);
        }
    }
    debug!(collected = rows.len(), "collected body rows");

    rows.truncate(rows.len().saturating_sub(TRAILING_SUMMARY_ROWS));
    if rows.is_empty() {
        return Err(ExtractionError::NoDataRows);
    }

    info!(columns = headers.len(), rows = rows.len(), "extracted table");
    Ok(RawTable::from_ragged(headers, rows))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Markup shaped like the OEWS area page with `n` body rows (two of them summaries).
    pub(crate) fn oews_page(n: usize) -> String {
        let mut body = String::new();
        for i in 0..n {
            body.push_str(&format!(
                "<tr><th>Occupation {i} (11-{:04})</th><td>(1)1,200</td><td>$250,300</td><td>(8)-</td></tr>",
                1000 + i
            ));
        }
        format!(
            r#"<html><body>
            <table><thead><tr><th>Area</th></tr></thead><tbody><tr><td>x</td></tr></tbody></table>
            <table>
              <thead><tr>
                <th>Occupation (SOC code)</th>
                <th>Employment(1)</th>
                <th>Annual mean wage(2)</th>
                <th>Hourly mean wage</th>
              </tr></thead>
              <tbody>{body}</tbody>
            </table>
            </body></html>"#
        )
    }

    #[test]
    fn drops_two_trailing_rows() {
        let table = extract_table(&oews_page(12)).unwrap();
        assert_eq!(table.num_rows(), 10);
        assert_eq!(
            table.headers,
            vec![
                "Occupation (SOC code)",
                "Employment(1)",
                "Annual mean wage(2)",
                "Hourly mean wage"
            ]
        );
        assert_eq!(table.rows[0][0].as_deref(), Some("Occupation 0 (11-1000)"));
        assert_eq!(table.rows[0][1].as_deref(), Some("(1)1,200"));
        assert_eq!(table.rows[9][0].as_deref(), Some("Occupation 9 (11-1009)"));
    }

    #[test]
    fn missing_table_is_an_error() {
        let html = "<table><thead><tr><th>Something else</th></tr></thead></table>";
        assert!(matches!(
            extract_table(html),
            Err(ExtractionError::TableNotFound)
        ));
        assert!(!has_target_table(html));
    }

    #[test]
    fn only_summary_rows_is_an_error() {
        assert!(matches!(
            extract_table(&oews_page(2)),
            Err(ExtractionError::NoDataRows)
        ));
    }

    #[test]
    fn header_text_is_trimmed_per_node() {
        let html = r#"<table><thead><tr><th>
            Occupation (SOC code)
        </th><th>Employment <sup>(1)</sup></th></tr></thead>
        <tbody><tr><td> Cooks (35-2014) </td><td>10</td></tr>
        <tr><td>a</td></tr><tr><td>b</td></tr></tbody></table>"#;
        assert!(has_target_table(html));
        let table = extract_table(html).unwrap();
        assert_eq!(table.headers[1], "Employment(1)");
        assert_eq!(table.rows[0][0].as_deref(), Some("Cooks (35-2014)"));
    }
}
