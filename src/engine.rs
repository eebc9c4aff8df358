//! The two-phase run cycle: fetch fundamentals for the whole universe,
//! detect and persist fingerprint changes, then recompute yields for the
//! symbols that triggered.

use crate::analyzer;
use crate::client_ext::FundamentalsSource;
use crate::config;
use crate::schema::{Fundamentals, RunReport, StateRecord, TriggerEntry, YieldRow};
use crate::state;
use crate::trigger;
use crate::ui;
use anyhow::Result;
use chrono::{Datelike, Utc};
use futures::StreamExt;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

/// Knobs for a single run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub years_for_payout: u32,
    pub yield_threshold: f64,
    pub force_all: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            years_for_payout: config::DEFAULT_YEARS_FOR_PAYOUT,
            yield_threshold: config::DEFAULT_YIELD_THRESHOLD,
            force_all: false,
        }
    }
}

/// Fetch every symbol's fundamentals concurrently. Each symbol's result is
/// kept separate so one fault never cancels its siblings.
async fn fetch_universe<S>(source: &S, symbols: &[String]) -> HashMap<String, Result<Fundamentals>>
where
    S: FundamentalsSource + Sync,
{
    let pb = ui::single_pb(symbols.len() as u64);
    let fetched: Vec<(String, Result<Fundamentals>)> =
        futures::stream::iter(symbols.iter().cloned())
            .map(|symbol| {
                let pb = pb.clone();
                async move {
                    let fetched = source.fundamentals(&symbol).await;
                    pb.inc(1);
                    (symbol, fetched)
                }
            })
            .buffer_unordered(num_cpus::get())
            .collect()
            .await;
    pb.finish_and_clear();
    fetched.into_iter().collect()
}

/// Estimate yields for every requested symbol; no stored state is read or
/// written.
pub async fn full_mode<S>(source: &S, symbols: &[String], opts: &RunOptions) -> RunReport
where
    S: FundamentalsSource + Sync,
{
    let cur_year = Utc::now().year();
    let mut fetched = fetch_universe(source, symbols).await;

    let mut rows = Vec::new();
    for symbol in symbols {
        match fetched.remove(symbol) {
            Some(Ok(snap)) => {
                if let Some(row) = analyzer::estimate(&snap, opts.years_for_payout, cur_year) {
                    rows.push(row);
                }
            }
            Some(Err(e)) => log::warn!("[{symbol}] skipped: {e}"),
            None => {}
        }
    }

    finish(rows, opts, Vec::new(), Vec::new())
}

/// Event-driven run. Phase 1 compares every symbol's fresh fingerprint
/// against the snapshot store and refreshes the stored record whether or not
/// the symbol triggered; the store is written back once, after the whole
/// phase. Phase 2 recomputes yields only for the triggered symbols, reusing
/// the per-run view fetched in Phase 1.
pub async fn event_mode<S>(
    source: &S,
    symbols: &[String],
    state_path: &Path,
    opts: &RunOptions,
) -> Result<RunReport>
where
    S: FundamentalsSource + Sync,
{
    let cur_year = Utc::now().year();
    let mut store = state::load(state_path).await;
    let mut fetched = fetch_universe(source, symbols).await;

    let mut triggered = Vec::new();
    let mut trigger_log = Vec::new();
    let mut snapshots: HashMap<String, Fundamentals> = HashMap::new();

    for symbol in symbols {
        let snap = match fetched.remove(symbol) {
            Some(Ok(snap)) => snap,
            Some(Err(e)) => {
                // The symbol sits out this run; its stored record, if any,
                // is left untouched.
                log::warn!("[{symbol}] fundamentals fetch failed: {e}");
                trigger_log.push(TriggerEntry {
                    symbol: symbol.clone(),
                    reasons: vec![format!("ERROR: {e}")],
                });
                continue;
            }
            None => continue,
        };

        let (latest_div_year, latest_div_amt) = snap.latest_dividend();
        let (mut fired, mut reasons) = trigger::detect(
            store.get(symbol),
            snap.trailing_eps,
            latest_div_year,
            latest_div_amt,
            snap.latest_news_ts,
        );

        // The record refreshes regardless of the trigger outcome.
        store.insert(symbol.clone(), StateRecord::from_snapshot(&snap));

        if opts.force_all {
            fired = true;
            if reasons.is_empty() {
                reasons.push("Forced recalculation".to_string());
            }
        }

        if fired {
            triggered.push(symbol.clone());
            trigger_log.push(TriggerEntry {
                symbol: symbol.clone(),
                reasons,
            });
        }
        snapshots.insert(symbol.clone(), snap);
    }

    state::save(state_path, &store).await?;
    log::info!(
        "{} of {} symbols triggered recalculation",
        triggered.len(),
        symbols.len()
    );

    let mut rows = Vec::new();
    for symbol in &triggered {
        if let Some(snap) = snapshots.get(symbol) {
            if let Some(row) = analyzer::estimate(snap, opts.years_for_payout, cur_year) {
                rows.push(row);
            }
        }
    }

    Ok(finish(rows, opts, triggered, trigger_log))
}

fn finish(
    mut rows: Vec<YieldRow>,
    opts: &RunOptions,
    triggered: Vec<String>,
    trigger_log: Vec<TriggerEntry>,
) -> RunReport {
    rows.sort_by(|a, b| {
        b.est_yield_pct
            .partial_cmp(&a.est_yield_pct)
            .unwrap_or(Ordering::Equal)
    });
    let high_rows = rows
        .iter()
        .filter(|row| row.est_yield_pct >= opts.yield_threshold * 100.0)
        .cloned()
        .collect();
    RunReport {
        rows,
        high_rows,
        triggered,
        trigger_log,
    }
}
