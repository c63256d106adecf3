//! Agmarknet commodity price retriever
//!
//! The search page is an ASP.NET form: we read its hidden state fields and
//! `<select>` options, resolve the commodity and state by visible text, post
//! the form back and parse the resulting price grid.

use super::types::{PriceCell, PriceRow, QUINTAL_UNIT};
use crate::runtime::PriceSource;
use async_trait::async_trait;
use chrono::Local;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use thiserror::Error;

pub const SEARCH_URL: &str = "https://agmarknet.gov.in/SearchCmmMkt.aspx";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const PRICE_GRID_ID: &str = "cphBody_GridPriceData";
const NO_DATA_MARKER: &str = "No Data Found";

/// Column positions of the standard 12-column report
const DEFAULT_COLUMNS: Columns = Columns {
    market: 3,
    min: 8,
    max: 9,
    modal: 10,
};

#[derive(Debug, Error)]
pub enum AgmarknetError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("search form is missing control {0}")]
    MissingControl(&'static str),
    #[error("commodity not offered: {0}")]
    UnknownCommodity(String),
    #[error("state not offered: {0}")]
    UnknownRegion(String),
    #[error("report has no price table")]
    NoTable,
    #[error("report confirms no data")]
    NoData,
    #[error("invalid selector: {0}")]
    Selector(String),
}

impl AgmarknetError {
    /// Diagnostic code logged when a lookup collapses to an empty result
    pub fn reason_code(&self) -> &'static str {
        match self {
            AgmarknetError::Http(e) if e.is_timeout() => "timeout",
            AgmarknetError::Http(_) => "http_error",
            AgmarknetError::MissingControl(_) | AgmarknetError::Selector(_) => "form_changed",
            AgmarknetError::UnknownCommodity(_) => "unknown_commodity",
            AgmarknetError::UnknownRegion(_) => "unknown_region",
            AgmarknetError::NoTable => "no_table",
            AgmarknetError::NoData => "no_data",
        }
    }

    /// The source answered and said there is nothing to report
    pub fn is_confirmed_empty(&self) -> bool {
        matches!(self, AgmarknetError::NoData)
    }
}

fn selector(css: &str) -> Result<Selector, AgmarknetError> {
    Selector::parse(css).map_err(|e| AgmarknetError::Selector(format!("{css}: {e}")))
}

fn cell_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// A `<select>` control on the search form
#[derive(Debug, Clone)]
struct SelectControl {
    name: String,
    /// (value, visible text)
    options: Vec<(String, String)>,
    selected: Option<String>,
}

impl SelectControl {
    fn value_for(&self, label: &str) -> Option<&str> {
        let label = label.trim();
        self.options
            .iter()
            .find(|(_, text)| text.trim().eq_ignore_ascii_case(label))
            .map(|(value, _)| value.as_str())
    }

    fn default_value(&self) -> String {
        self.selected
            .clone()
            .or_else(|| self.options.first().map(|(v, _)| v.clone()))
            .unwrap_or_default()
    }
}

/// Parsed search form, ready to be posted back
#[derive(Debug)]
struct SearchForm {
    /// Hidden and text inputs as the browser would submit them
    inputs: Vec<(String, String)>,
    selects: Vec<(String, SelectControl)>,
    submit: Option<(String, String)>,
}

impl SearchForm {
    fn parse(html: &str) -> Result<Self, AgmarknetError> {
        let doc = Html::parse_document(html);
        let today = Local::now().format("%d-%b-%Y").to_string();

        let mut inputs = Vec::new();
        for input in doc.select(&selector("input[type=hidden], input[type=text]")?) {
            let Some(name) = input.value().attr("name") else {
                continue;
            };
            let mut value = input.value().attr("value").unwrap_or_default().to_string();
            let is_date = input.value().id().is_some_and(|id| id.starts_with("txtDate"));
            if is_date && value.is_empty() {
                value.clone_from(&today);
            }
            inputs.push((name.to_string(), value));
        }

        let option_sel = selector("option")?;
        let mut selects = Vec::new();
        for select in doc.select(&selector("select")?) {
            let (Some(id), Some(name)) = (select.value().id(), select.value().attr("name")) else {
                continue;
            };
            let mut options = Vec::new();
            let mut selected = None;
            for option in select.select(&option_sel) {
                let value = option.value().attr("value").unwrap_or_default().to_string();
                if option.value().attr("selected").is_some() {
                    selected = Some(value.clone());
                }
                options.push((value, cell_text(option)));
            }
            selects.push((
                id.to_string(),
                SelectControl {
                    name: name.to_string(),
                    options,
                    selected,
                },
            ));
        }

        let submit = doc
            .select(&selector("#btnGo")?)
            .next()
            .and_then(|b| {
                let name = b.value().attr("name")?;
                Some((name.to_string(), b.value().attr("value").unwrap_or("Go").to_string()))
            });

        Ok(Self {
            inputs,
            selects,
            submit,
        })
    }

    fn control(&self, id: &'static str) -> Result<&SelectControl, AgmarknetError> {
        self.selects
            .iter()
            .find(|(control_id, _)| control_id == id)
            .map(|(_, control)| control)
            .ok_or(AgmarknetError::MissingControl(id))
    }

    /// Form body selecting the given commodity and state
    fn submission(&self, commodity: &str, region: &str) -> Result<Vec<(String, String)>, AgmarknetError> {
        let commodity_control = self.control("ddlCommodity")?;
        let state_control = self.control("ddlState")?;
        let commodity_value = commodity_control
            .value_for(commodity)
            .ok_or_else(|| AgmarknetError::UnknownCommodity(commodity.to_string()))?;
        let state_value = state_control
            .value_for(region)
            .ok_or_else(|| AgmarknetError::UnknownRegion(region.to_string()))?;

        let mut body: Vec<(String, String)> = self
            .inputs
            .iter()
            .map(|(name, value)| {
                if name == "__EVENTTARGET" || name == "__EVENTARGUMENT" {
                    (name.clone(), String::new())
                } else {
                    (name.clone(), value.clone())
                }
            })
            .collect();

        for (_, control) in &self.selects {
            let value = if control.name == commodity_control.name {
                commodity_value.to_string()
            } else if control.name == state_control.name {
                state_value.to_string()
            } else {
                control.default_value()
            };
            body.push((control.name.clone(), value));
        }

        let (name, value) = self
            .submit
            .clone()
            .ok_or(AgmarknetError::MissingControl("btnGo"))?;
        body.push((name, value));
        Ok(body)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    market: usize,
    min: usize,
    max: usize,
    modal: usize,
}

impl Columns {
    fn from_headers(headers: &[String]) -> Self {
        let find = |needle: &str| {
            headers
                .iter()
                .position(|h| h.to_ascii_lowercase().contains(needle))
        };
        match (find("market"), find("min"), find("max"), find("modal")) {
            (Some(market), Some(min), Some(max), Some(modal)) => Self {
                market,
                min,
                max,
                modal,
            },
            _ => DEFAULT_COLUMNS,
        }
    }
}

/// Extract price rows from a report page.
///
/// `NoData` means the grid was rendered and reported nothing; `NoTable` means
/// the page did not contain a grid at all.
pub fn parse_price_table(html: &str) -> Result<Vec<PriceRow>, AgmarknetError> {
    let doc = Html::parse_document(html);
    let grid = doc
        .select(&selector(&format!("#{PRICE_GRID_ID}"))?)
        .next()
        .ok_or(AgmarknetError::NoTable)?;

    if grid.text().any(|t| t.contains(NO_DATA_MARKER)) {
        return Err(AgmarknetError::NoData);
    }

    let headers: Vec<String> = grid.select(&selector("th")?).map(cell_text).collect();
    let columns = Columns::from_headers(&headers);
    let td = selector("td")?;

    let rows: Vec<PriceRow> = grid
        .select(&selector("tr")?)
        .filter_map(|tr| {
            let cells: Vec<String> = tr.select(&td).map(cell_text).collect();
            if cells.len() <= columns.modal {
                return None;
            }
            Some(PriceRow {
                market: cells.get(columns.market).cloned().unwrap_or_default(),
                min_price: cells.get(columns.min).and_then(|c| PriceCell::from_text(c)),
                max_price: cells.get(columns.max).and_then(|c| PriceCell::from_text(c)),
                modal_price: PriceCell::from_text(&cells[columns.modal]),
                unit: QUINTAL_UNIT.to_string(),
            })
        })
        .collect();

    if rows.is_empty() {
        return Err(AgmarknetError::NoData);
    }
    Ok(rows)
}

/// HTTP client for the Agmarknet search form
#[derive(Debug, Clone)]
pub struct AgmarknetClient {
    search_url: String,
    request_timeout: Duration,
}

impl AgmarknetClient {
    pub fn new(request_timeout: Duration) -> Self {
        Self {
            search_url: SEARCH_URL.to_string(),
            request_timeout,
        }
    }

    #[must_use]
    pub fn with_search_url(mut self, url: impl Into<String>) -> Self {
        self.search_url = url.into();
        self
    }

    /// Run one search. Each search gets its own cookie jar so concurrent
    /// lookups never share ASP.NET session state.
    pub async fn fetch_report(
        &self,
        commodity: &str,
        region: &str,
    ) -> Result<Vec<PriceRow>, AgmarknetError> {
        let http = Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .timeout(self.request_timeout)
            .build()?;

        let page = http
            .get(&self.search_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let body = SearchForm::parse(&page)?.submission(commodity, region)?;

        let report = http
            .post(&self.search_url)
            .form(&body)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_price_table(&report)
    }
}

#[async_trait]
impl PriceSource for AgmarknetClient {
    async fn fetch_price_rows(&self, commodity: &str, region: &str) -> Vec<PriceRow> {
        match self.fetch_report(commodity, region).await {
            Ok(rows) => {
                tracing::info!(commodity, region, reason = "rows", rows = rows.len(), "Agmarknet report parsed");
                rows
            }
            Err(e) if e.is_confirmed_empty() => {
                tracing::info!(commodity, region, reason = e.reason_code(), "Agmarknet has no data");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(commodity, region, reason = e.reason_code(), error = %e, "Agmarknet lookup failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"
<html><body>
<table id="cphBody_GridPriceData">
  <tr><th>Sl no.</th><th>District Name</th><th>Market Name</th><th>Commodity</th><th>Variety</th><th>Grade</th><th>Min Price (Rs./Quintal)</th><th>Max Price (Rs./Quintal)</th><th>Modal Price (Rs./Quintal)</th><th>Price Date</th></tr>
  <tr><td>1</td><td>Jalandhar</td><td>Jalandhar City</td><td>Potato</td><td>Other</td><td>FAQ</td><td>800</td><td>1200</td><td>1000</td><td>14 Oct 2026</td></tr>
  <tr><td>2</td><td>Ludhiana</td><td>Khanna</td><td>Potato</td><td>Other</td><td>FAQ</td><td>900</td><td>1100</td><td> </td><td>14 Oct 2026</td></tr>
</table>
</body></html>"#;

    const LEGACY_REPORT: &str = r#"
<table id="cphBody_GridPriceData">
  <tr><td>1</td><td>Punjab</td><td>Amritsar</td><td>Amritsar</td><td>Vegetables</td><td>Tomato</td><td>Local</td><td>FAQ</td><td>1500</td><td>2000</td><td>1800</td><td>14-Oct-2026</td></tr>
</table>"#;

    const EMPTY_REPORT: &str = r#"
<table id="cphBody_GridPriceData"><tr><td colspan="12">No Data Found</td></tr></table>"#;

    const SEARCH_PAGE: &str = r#"
<form>
  <input type="hidden" name="__EVENTTARGET" value="ddlState" />
  <input type="hidden" name="__VIEWSTATE" value="vs123" />
  <input type="hidden" name="__EVENTVALIDATION" value="ev456" />
  <select id="ddlArrivalPrice" name="ddlArrivalPrice"><option value="0" selected="selected">Price</option><option value="1">Arrival</option></select>
  <select id="ddlCommodity" name="ddlCommodity"><option value="0">--Select--</option><option value="24">Potato</option><option value="78">Tomato</option></select>
  <select id="ddlState" name="ddlState"><option value="0">--Select--</option><option value="PB">Punjab</option></select>
  <input type="text" id="txtDate" name="txtDate" value="" />
  <input type="submit" id="btnGo" name="btnGo" value="Go" />
</form>"#;

    #[test]
    fn test_parse_report_by_headers() {
        let rows = parse_price_table(REPORT).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].market, "Jalandhar City");
        assert_eq!(rows[0].modal_price, Some(PriceCell::Number(1000.0)));
        assert_eq!(rows[0].min_price, Some(PriceCell::Number(800.0)));
        assert_eq!(rows[1].modal_price, None);
        assert_eq!(rows[1].unit, QUINTAL_UNIT);
    }

    #[test]
    fn test_parse_headerless_report_uses_default_layout() {
        let rows = parse_price_table(LEGACY_REPORT).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].market, "Amritsar");
        assert_eq!(rows[0].modal_price, Some(PriceCell::Number(1800.0)));
    }

    #[test]
    fn test_no_data_is_confirmed_empty() {
        let err = parse_price_table(EMPTY_REPORT).unwrap_err();
        assert!(err.is_confirmed_empty());
        assert_eq!(err.reason_code(), "no_data");
    }

    #[test]
    fn test_missing_grid_is_not_confirmed_empty() {
        let err = parse_price_table("<html><body>Service Unavailable</body></html>").unwrap_err();
        assert!(!err.is_confirmed_empty());
        assert_eq!(err.reason_code(), "no_table");
    }

    #[test]
    fn test_form_submission_selects_by_visible_text() {
        let form = SearchForm::parse(SEARCH_PAGE).unwrap();
        let body = form.submission("potato", "PUNJAB").unwrap();
        let get = |name: &str| {
            body.iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("ddlCommodity"), Some("24"));
        assert_eq!(get("ddlState"), Some("PB"));
        assert_eq!(get("ddlArrivalPrice"), Some("0"));
        assert_eq!(get("__VIEWSTATE"), Some("vs123"));
        assert_eq!(get("__EVENTTARGET"), Some(""));
        assert_eq!(get("btnGo"), Some("Go"));
        assert!(get("txtDate").is_some_and(|d| !d.is_empty()));
    }

    #[test]
    fn test_unknown_commodity_and_state() {
        let form = SearchForm::parse(SEARCH_PAGE).unwrap();
        let err = form.submission("Ghee", "Punjab").unwrap_err();
        assert_eq!(err.reason_code(), "unknown_commodity");
        let err = form.submission("Tomato", "Kerala").unwrap_err();
        assert_eq!(err.reason_code(), "unknown_region");
    }
}
