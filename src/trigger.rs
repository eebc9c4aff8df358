//! Fingerprint comparison: decides whether a symbol's fundamentals changed
//! enough since the last run to warrant recomputation.

use crate::analyzer::round_dp;
use crate::schema::StateRecord;

/// Compare the freshly fetched fingerprint against the stored record.
///
/// Returns whether the symbol triggered and the ordered list of reasons; a
/// symbol may accumulate several. `prev` is `None` for a never-seen symbol,
/// which is not the same as a record whose fields are null.
///
/// Price is deliberately not part of the comparison.
pub fn detect(
    prev: Option<&StateRecord>,
    eps_now: Option<f64>,
    latest_div_year: Option<i32>,
    latest_div_amt: f64,
    news_ts_now: Option<i64>,
) -> (bool, Vec<String>) {
    let mut reasons = Vec::new();

    // EPS: a change only counts past 4 decimal places; an absent current
    // value stays silent.
    let eps_prev = prev.and_then(|p| p.trailing_eps_ttm);
    match (eps_now, eps_prev) {
        (Some(now), Some(before)) => {
            if round_dp(now, 4) != round_dp(before, 4) {
                reasons.push(format!("EPS updated: {before} -> {now}"));
            }
        }
        (Some(_), None) => reasons.push("EPS became available".to_string()),
        _ => {}
    }

    // Dividend: year and amount checks are independent. The amount is
    // compared against the previously stored amount even when the year
    // changed; both reasons can fire in the same run.
    let div_year_prev = prev.and_then(|p| p.latest_div_year);
    if let Some(year_now) = latest_div_year {
        match div_year_prev {
            None => reasons.push("Dividend history became available".to_string()),
            Some(year_prev) => {
                if year_now != year_prev {
                    reasons.push(format!("Dividend year updated: {year_prev} -> {year_now}"));
                }
                if let Some(amt_prev) = prev.map(|p| p.latest_div_amt) {
                    if round_dp(latest_div_amt, 4) != round_dp(amt_prev, 4) {
                        reasons.push(format!(
                            "Dividend amount updated: {amt_prev} -> {latest_div_amt}"
                        ));
                    }
                }
            }
        }
    }

    // News: only a strictly newer timestamp counts.
    let news_prev = prev.and_then(|p| p.latest_news_ts);
    match (news_ts_now, news_prev) {
        (Some(now), Some(before)) => {
            if now > before {
                reasons.push("New news item detected".to_string());
            }
        }
        (Some(_), None) => reasons.push("News became available".to_string()),
        _ => {}
    }

    (!reasons.is_empty(), reasons)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(
        eps: Option<f64>,
        div_year: Option<i32>,
        div_amt: f64,
        news_ts: Option<i64>,
    ) -> StateRecord {
        StateRecord {
            trailing_eps_ttm: eps,
            latest_div_year: div_year,
            latest_div_amt: div_amt,
            latest_news_ts: news_ts,
            updated_at: "2025-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn never_seen_symbol_reports_availability() {
        let (triggered, reasons) = detect(None, Some(1.5), Some(2024), 2.0, Some(1_700_000_000));
        assert!(triggered);
        assert_eq!(
            reasons,
            vec![
                "EPS became available",
                "Dividend history became available",
                "News became available",
            ]
        );
    }

    #[test]
    fn nothing_changed_means_no_trigger() {
        let prev = stored(Some(1.5), Some(2024), 2.0, Some(1_700_000_000));
        let (triggered, reasons) =
            detect(Some(&prev), Some(1.5), Some(2024), 2.0, Some(1_700_000_000));
        assert!(!triggered);
        assert!(reasons.is_empty());
    }

    #[test]
    fn eps_change_past_fourth_decimal_fires() {
        let prev = stored(Some(1.2345), None, 0.0, None);
        let (triggered, reasons) = detect(Some(&prev), Some(1.2346), None, 0.0, None);
        assert!(triggered);
        assert_eq!(reasons, vec!["EPS updated: 1.2345 -> 1.2346"]);
    }

    #[test]
    fn eps_change_below_rounding_stays_silent() {
        let prev = stored(Some(1.2345), None, 0.0, None);
        let (triggered, reasons) = detect(Some(&prev), Some(1.23454), None, 0.0, None);
        assert!(!triggered, "{reasons:?}");
    }

    #[test]
    fn absent_current_eps_stays_silent() {
        let prev = stored(Some(1.2345), None, 0.0, None);
        let (triggered, _) = detect(Some(&prev), None, None, 0.0, None);
        assert!(!triggered);
    }

    #[test]
    fn dividend_year_change_fires() {
        let prev = stored(None, Some(2023), 2.0, None);
        let (triggered, reasons) = detect(Some(&prev), None, Some(2024), 2.0, None);
        assert!(triggered);
        assert_eq!(reasons, vec!["Dividend year updated: 2023 -> 2024"]);
    }

    #[test]
    fn year_and_amount_both_fire() {
        // The amount check compares against the amount stored for the *old*
        // year; a year rollover with a different payout fires both reasons.
        let prev = stored(None, Some(2023), 2.0, None);
        let (triggered, reasons) = detect(Some(&prev), None, Some(2024), 2.5, None);
        assert!(triggered);
        assert_eq!(
            reasons,
            vec![
                "Dividend year updated: 2023 -> 2024",
                "Dividend amount updated: 2 -> 2.5",
            ]
        );
    }

    #[test]
    fn amount_change_within_same_year_fires() {
        let prev = stored(None, Some(2024), 2.0, None);
        let (triggered, reasons) = detect(Some(&prev), None, Some(2024), 2.25, None);
        assert!(triggered);
        assert_eq!(reasons, vec!["Dividend amount updated: 2 -> 2.25"]);
    }

    #[test]
    fn newer_news_timestamp_fires() {
        let prev = stored(None, None, 0.0, Some(1_700_000_000));
        let (triggered, reasons) = detect(Some(&prev), None, None, 0.0, Some(1_700_000_001));
        assert!(triggered);
        assert_eq!(reasons, vec!["New news item detected"]);
    }

    #[test]
    fn equal_or_older_news_timestamp_stays_silent() {
        let prev = stored(None, None, 0.0, Some(1_700_000_000));
        let (same, _) = detect(Some(&prev), None, None, 0.0, Some(1_700_000_000));
        let (older, _) = detect(Some(&prev), None, None, 0.0, Some(1_600_000_000));
        assert!(!same);
        assert!(!older);
    }

    #[test]
    fn price_is_not_part_of_the_fingerprint() {
        // detect() takes no price at all; a run where only price moved looks
        // identical to a run where nothing moved.
        let prev = stored(Some(1.5), Some(2024), 2.0, Some(1));
        let (triggered, _) = detect(Some(&prev), Some(1.5), Some(2024), 2.0, Some(1));
        assert!(!triggered);
    }
}
