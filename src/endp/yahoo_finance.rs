//! Yahoo! Finance endpoints: quote summary, dividend events, and news
//! search, reduced to the handful of fields the engine consumes.

use anyhow::Result;
use chrono::{DateTime, Datelike};
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;

const QUOTE_SUMMARY_MODULES: &str =
    "price,financialData,defaultKeyStatistics,incomeStatementHistoryQuarterly";
const DIVIDEND_RANGE: &str = "10y";

fn quote_summary_url(symbol: &str) -> String {
    format!(
        "https://query1.finance.yahoo.com/v10/finance/quoteSummary/{symbol}?modules={}",
        QUOTE_SUMMARY_MODULES
    )
}

fn dividends_url(symbol: &str) -> String {
    format!(
        "https://query1.finance.yahoo.com/v8/finance/chart/{symbol}?symbol={symbol}&interval=1d&range={}&events=div",
        DIVIDEND_RANGE
    )
}

fn news_url(symbol: &str) -> String {
    format!(
        "https://query1.finance.yahoo.com/v1/finance/search?q={symbol}&newsCount=10&quotesCount=0"
    )
}

/// The quote-summary fields the engine cares about; anything the response
/// lacks stays absent.
#[derive(Debug, Default)]
pub struct Summary {
    pub price: Option<f64>,
    pub trailing_eps: Option<f64>,
    pub shares_outstanding: Option<f64>,
    /// Quarterly net income, most recent quarter first.
    pub quarterly_net_income: Vec<f64>,
}

/// Fetch price, trailing EPS, shares outstanding, and the quarterly
/// net-income series in one quote-summary call.
pub async fn quote_summary(client: &Client, symbol: &str) -> Result<Summary> {
    let response: QuoteSummaryEnvelope = client
        .get(quote_summary_url(symbol))
        .send()
        .await?
        .json()
        .await?;

    let result = match response
        .quote_summary
        .result
        .and_then(|mut results| (!results.is_empty()).then(|| results.remove(0)))
    {
        Some(result) => result,
        None => {
            log::warn!("[{symbol}] empty quoteSummary result; treating all fields as absent");
            return Ok(Summary::default());
        }
    };

    Ok(extract_summary(result))
}

fn extract_summary(result: QuoteSummaryResult) -> Summary {
    // `currentPrice` first, the regular market price as the fallback.
    let price = result
        .financial_data
        .as_ref()
        .and_then(|fin| fin.current_price.as_ref())
        .and_then(RawValue::value)
        .or_else(|| {
            result
                .price
                .as_ref()
                .and_then(|price| price.regular_market_price.as_ref())
                .and_then(RawValue::value)
        });

    let trailing_eps = result
        .key_statistics
        .as_ref()
        .and_then(|stats| stats.trailing_eps.as_ref())
        .and_then(RawValue::value);

    let shares_outstanding = result
        .key_statistics
        .as_ref()
        .and_then(|stats| stats.shares_outstanding.as_ref())
        .and_then(RawValue::value)
        .filter(|shares| *shares > 0.0);

    let quarterly_net_income = result
        .quarterly_income
        .map(|history| {
            history
                .statements
                .into_iter()
                .filter_map(|quarter| quarter.net_income.and_then(|ni| ni.value()))
                .collect()
        })
        .unwrap_or_default();

    Summary {
        price,
        trailing_eps,
        shares_outstanding,
        quarterly_net_income,
    }
}

/// Fetch the dividend event history and sum it per calendar year.
pub async fn dividends_by_year(client: &Client, symbol: &str) -> Result<BTreeMap<i32, f64>> {
    let response: ChartEnvelope = client.get(dividends_url(symbol)).send().await?.json().await?;

    let events = response
        .chart
        .result
        .and_then(|mut results| (!results.is_empty()).then(|| results.remove(0)))
        .and_then(|result| result.events)
        .and_then(|events| events.dividends);

    let mut by_year = BTreeMap::new();
    match events {
        Some(events) => {
            for event in events.values() {
                if let Some(dated) = DateTime::from_timestamp(event.date, 0) {
                    *by_year.entry(dated.year()).or_insert(0.0) += event.amount;
                }
            }
        }
        None => {
            log::debug!("[{symbol}] no dividend events in chart response; history stays empty")
        }
    }
    Ok(by_year)
}

/// Fetch the publish timestamp of the most recent news item, if any.
pub async fn latest_news_ts(client: &Client, symbol: &str) -> Result<Option<i64>> {
    let response: SearchResponse = client.get(news_url(symbol)).send().await?.json().await?;
    Ok(response
        .news
        .iter()
        .filter_map(|item| item.provider_publish_time)
        .max())
}

// `quoteSummary` schema
#[derive(Deserialize, Debug)]
struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryResponse,
}

#[derive(Deserialize, Debug)]
struct QuoteSummaryResponse {
    result: Option<Vec<QuoteSummaryResult>>,
}

#[derive(Deserialize, Debug, Default)]
struct QuoteSummaryResult {
    price: Option<PriceModule>,
    #[serde(rename = "financialData")]
    financial_data: Option<FinancialData>,
    #[serde(rename = "defaultKeyStatistics")]
    key_statistics: Option<KeyStatistics>,
    #[serde(rename = "incomeStatementHistoryQuarterly")]
    quarterly_income: Option<IncomeStatementHistory>,
}

#[derive(Deserialize, Debug)]
struct PriceModule {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<RawValue>,
}

#[derive(Deserialize, Debug)]
struct FinancialData {
    #[serde(rename = "currentPrice")]
    current_price: Option<RawValue>,
}

#[derive(Deserialize, Debug)]
struct KeyStatistics {
    #[serde(rename = "trailingEps")]
    trailing_eps: Option<RawValue>,
    #[serde(rename = "sharesOutstanding")]
    shares_outstanding: Option<RawValue>,
}

#[derive(Deserialize, Debug)]
struct IncomeStatementHistory {
    #[serde(rename = "incomeStatementHistory")]
    statements: Vec<QuarterStatement>,
}

#[derive(Deserialize, Debug)]
struct QuarterStatement {
    #[serde(rename = "netIncome")]
    net_income: Option<RawValue>,
}

/// Yahoo wraps numeric fields as `{"raw": 39.2, "fmt": "39.20"}`; only
/// `raw` is consumed.
#[derive(Deserialize, Debug)]
struct RawValue {
    raw: Option<f64>,
}

impl RawValue {
    fn value(&self) -> Option<f64> {
        self.raw
    }
}

// `chart` schema, trimmed to the dividend events
#[derive(Deserialize, Debug)]
struct ChartEnvelope {
    chart: ChartResponse,
}

#[derive(Deserialize, Debug)]
struct ChartResponse {
    result: Option<Vec<ChartResult>>,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    events: Option<ChartEvents>,
}

#[derive(Deserialize, Debug)]
struct ChartEvents {
    dividends: Option<BTreeMap<String, DividendEvent>>,
}

#[derive(Deserialize, Debug)]
struct DividendEvent {
    amount: f64,
    date: i64,
}

// `search` schema
#[derive(Deserialize, Debug)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<NewsItem>,
}

#[derive(Deserialize, Debug)]
struct NewsItem {
    #[serde(rename = "providerPublishTime")]
    provider_publish_time: Option<i64>,
}
