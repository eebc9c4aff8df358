use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything known about a single symbol within one run; fetched fresh from
/// the provider and never persisted verbatim.
///
/// Any field the provider could not supply is simply absent - absence flows
/// through the trigger and estimation rules rather than erroring.
#[derive(Debug, Clone, Default)]
pub struct Fundamentals {
    pub symbol: String,
    pub price: Option<f64>,
    pub trailing_eps: Option<f64>,
    pub shares_outstanding: Option<f64>,
    /// Quarterly net income, most recent quarter first.
    pub quarterly_net_income: Vec<f64>,
    /// Total dividend per share, summed per calendar year.
    pub dividend_by_year: BTreeMap<i32, f64>,
    /// Publish timestamp (epoch seconds) of the most recent news item.
    pub latest_news_ts: Option<i64>,
}

impl Fundamentals {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    /// Latest dividend year and that year's total amount. The amount defaults
    /// to `0.0` when no dividend history exists.
    pub fn latest_dividend(&self) -> (Option<i32>, f64) {
        match self.dividend_by_year.iter().next_back() {
            Some((year, amount)) => (Some(*year), *amount),
            None => (None, 0.0),
        }
    }
}

/// The fingerprint persisted per symbol between runs.
///
/// ```json
/// "2330.TW": {
///     "trailing_eps_ttm": 39.2,
///     "latest_div_year": 2024,
///     "latest_div_amt": 13.5,
///     "latest_news_ts": 1722945600,
///     "updated_at": "2025-08-06T09:00:00+00:00"
/// }
/// ```
///
/// A record exists if and only if the symbol has been processed before;
/// "never seen" and "seen with a null field" are different states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    pub trailing_eps_ttm: Option<f64>,
    pub latest_div_year: Option<i32>,
    #[serde(default)]
    pub latest_div_amt: f64,
    pub latest_news_ts: Option<i64>,
    pub updated_at: String,
}

impl StateRecord {
    /// Fingerprint a fresh snapshot, stamped with the current UTC time.
    pub fn from_snapshot(snap: &Fundamentals) -> Self {
        let (latest_div_year, latest_div_amt) = snap.latest_dividend();
        Self {
            trailing_eps_ttm: snap.trailing_eps,
            latest_div_year,
            latest_div_amt,
            latest_news_ts: snap.latest_news_ts,
            updated_at: Utc::now().to_rfc3339(),
        }
    }
}

/// One row of the final result table. All figures are rounded for
/// presentation; intermediate math runs at full precision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YieldRow {
    pub symbol: String,
    pub price: f64,
    pub trailing_eps_ttm: f64,
    pub base_q_eps: f64,
    pub next_q_eps_est: f64,
    pub next_year_eps_est: f64,
    pub avg_payout_ratio: f64,
    pub est_dividend: f64,
    pub est_yield_pct: f64,
}

/// Why a symbol was (or failed to be) recomputed this run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerEntry {
    pub symbol: String,
    pub reasons: Vec<String>,
}

/// The stable return value of a single run: all qualifying rows sorted by
/// estimated yield (descending), the threshold-filtered subset, and - in
/// event mode - the triggered symbols with their reasons.
#[derive(Debug, Default)]
pub struct RunReport {
    pub rows: Vec<YieldRow>,
    pub high_rows: Vec<YieldRow>,
    pub triggered: Vec<String>,
    pub trigger_log: Vec<TriggerEntry>,
}
