//! The yield estimation pipeline: payout-ratio averaging, next-quarter EPS
//! projection, and assembly of the final row for a single symbol.

use crate::schema::{Fundamentals, YieldRow};
use std::collections::BTreeMap;

/// Round to `dp` decimal places; used for presentation and fingerprint
/// comparison, never for intermediate math.
pub(crate) fn round_dp(x: f64, dp: u32) -> f64 {
    let scale = 10f64.powi(dp as i32);
    (x * scale).round() / scale
}

/// Mean dividend payout ratio over the `years` calendar years preceding
/// `cur_year` (the in-progress year is excluded).
///
/// Each qualifying year contributes `dividend / eps_ttm`; years missing from
/// the history are skipped, not zero-filled. `None` when the ratio cannot be
/// resolved at all.
pub fn avg_payout_ratio(
    div_by_year: &BTreeMap<i32, f64>,
    eps_ttm: f64,
    years: u32,
    cur_year: i32,
) -> Option<f64> {
    if div_by_year.is_empty() || eps_ttm <= 0.0 {
        return None;
    }

    let ratios: Vec<f64> = (0..years as i32)
        .filter_map(|back| div_by_year.get(&(cur_year - 1 - back)))
        .map(|dividend| dividend / eps_ttm)
        .collect();

    if ratios.is_empty() {
        return None;
    }
    Some(ratios.iter().sum::<f64>() / ratios.len() as f64)
}

/// Project the next quarter's EPS from the quarterly net-income series
/// (most recent first) and shares outstanding.
///
/// A single reported quarter passes through unchanged; otherwise the mean of
/// the three most recent quarters is used. `None` when shares are missing or
/// non-positive, or no quarters were reported.
pub fn next_quarter_eps(quarterly_net_income: &[f64], shares: Option<f64>) -> Option<f64> {
    let shares = shares.filter(|s| *s > 0.0)?;
    let eps_series: Vec<f64> = quarterly_net_income.iter().map(|ni| ni / shares).collect();

    match eps_series.len() {
        0 => None,
        1 => Some(eps_series[0]),
        n => {
            let recent = &eps_series[..n.min(3)];
            Some(recent.iter().sum::<f64>() / recent.len() as f64)
        }
    }
}

/// Turn one symbol's fundamentals into a yield estimate.
///
/// Requires a price and a positive trailing EPS, and a resolvable payout
/// ratio; otherwise the symbol contributes no row. The next-quarter EPS
/// projection falls back to `trailing_eps / 4` when quarterly data is
/// unavailable.
pub fn estimate(snap: &Fundamentals, years_for_payout: u32, cur_year: i32) -> Option<YieldRow> {
    let price = snap.price.filter(|p| *p > 0.0)?;
    let eps_ttm = snap.trailing_eps.filter(|e| *e > 0.0)?;

    let base_q_eps = eps_ttm / 4.0;
    let next_q_eps = next_quarter_eps(&snap.quarterly_net_income, snap.shares_outstanding)
        .unwrap_or(base_q_eps);
    let next_year_eps = next_q_eps * 4.0;

    let payout = avg_payout_ratio(&snap.dividend_by_year, eps_ttm, years_for_payout, cur_year)?;

    let est_dividend = next_year_eps * payout;
    let est_yield = est_dividend / price;

    Some(YieldRow {
        symbol: snap.symbol.clone(),
        price: round_dp(price, 2),
        trailing_eps_ttm: round_dp(eps_ttm, 2),
        base_q_eps: round_dp(base_q_eps, 3),
        next_q_eps_est: round_dp(next_q_eps, 3),
        next_year_eps_est: round_dp(next_year_eps, 2),
        avg_payout_ratio: round_dp(payout, 3),
        est_dividend: round_dp(est_dividend, 2),
        est_yield_pct: round_dp(est_yield * 100.0, 2),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn div_history(entries: &[(i32, f64)]) -> BTreeMap<i32, f64> {
        entries.iter().copied().collect()
    }

    fn snapshot(price: Option<f64>, eps: Option<f64>) -> Fundamentals {
        let mut snap = Fundamentals::new("2330.TW");
        snap.price = price;
        snap.trailing_eps = eps;
        snap
    }

    #[test]
    fn payout_window_excludes_current_year() {
        // Window for 2025 is 2024..2020; only 2024 and 2023 are present.
        let div = div_history(&[(2023, 2.0), (2024, 2.5)]);
        let payout = avg_payout_ratio(&div, 5.0, 5, 2025).unwrap();
        assert!((payout - 0.45).abs() < 1e-12);
    }

    #[test]
    fn payout_ignores_dividends_in_progress_year() {
        let div = div_history(&[(2025, 9.9), (2024, 2.5)]);
        let payout = avg_payout_ratio(&div, 5.0, 5, 2025).unwrap();
        assert!((payout - 0.5).abs() < 1e-12);
    }

    #[test]
    fn payout_unresolvable_cases() {
        let div = div_history(&[(2023, 2.0)]);
        assert_eq!(avg_payout_ratio(&BTreeMap::new(), 5.0, 5, 2025), None);
        assert_eq!(avg_payout_ratio(&div, 0.0, 5, 2025), None);
        assert_eq!(avg_payout_ratio(&div, -1.0, 5, 2025), None);
        // History exists but entirely outside the window.
        assert_eq!(avg_payout_ratio(&div, 5.0, 5, 2035), None);
    }

    #[test]
    fn next_q_eps_single_quarter_passes_through() {
        let est = next_quarter_eps(&[3_000_000.0], Some(1_000_000.0)).unwrap();
        assert!((est - 3.0).abs() < 1e-12);
    }

    #[test]
    fn next_q_eps_averages_first_three_quarters() {
        let quarters = [4_000_000.0, 2_000_000.0, 3_000_000.0, 100_000_000.0];
        let est = next_quarter_eps(&quarters, Some(1_000_000.0)).unwrap();
        assert!((est - 3.0).abs() < 1e-12, "older quarters must be ignored");
    }

    #[test]
    fn next_q_eps_requires_positive_shares() {
        assert_eq!(next_quarter_eps(&[1.0], None), None);
        assert_eq!(next_quarter_eps(&[1.0], Some(0.0)), None);
        assert_eq!(next_quarter_eps(&[], Some(1_000_000.0)), None);
    }

    #[test]
    fn estimate_falls_back_to_quarter_of_ttm_without_shares() {
        let mut snap = snapshot(Some(100.0), Some(8.0));
        snap.quarterly_net_income = vec![5_000_000.0];
        snap.dividend_by_year = div_history(&[(2024, 4.0)]);

        let row = estimate(&snap, 5, 2025).unwrap();
        assert!((row.next_q_eps_est - 2.0).abs() < 1e-9);
        assert!((row.next_year_eps_est - 8.0).abs() < 1e-9);
    }

    #[test]
    fn estimate_full_pipeline() {
        let mut snap = snapshot(Some(50.0), Some(5.0));
        snap.shares_outstanding = Some(1_000_000.0);
        snap.quarterly_net_income = vec![1_500_000.0, 1_200_000.0, 1_800_000.0];
        snap.dividend_by_year = div_history(&[(2023, 2.0), (2024, 2.5)]);

        let row = estimate(&snap, 5, 2025).unwrap();
        // next-q = mean(1.5, 1.2, 1.8) = 1.5; next-year = 6.0; payout = 0.45
        // dividend = 2.7; yield = 2.7 / 50 = 5.4%
        assert_eq!(row.base_q_eps, 1.25);
        assert_eq!(row.next_q_eps_est, 1.5);
        assert_eq!(row.next_year_eps_est, 6.0);
        assert_eq!(row.avg_payout_ratio, 0.45);
        assert_eq!(row.est_dividend, 2.7);
        assert_eq!(row.est_yield_pct, 5.4);
    }

    #[test]
    fn estimate_rejects_missing_or_nonpositive_inputs() {
        let div = div_history(&[(2024, 2.0)]);

        let mut no_price = snapshot(None, Some(5.0));
        no_price.dividend_by_year = div.clone();
        assert!(estimate(&no_price, 5, 2025).is_none());

        let mut no_eps = snapshot(Some(50.0), None);
        no_eps.dividend_by_year = div.clone();
        assert!(estimate(&no_eps, 5, 2025).is_none());

        let mut negative_eps = snapshot(Some(50.0), Some(-1.0));
        negative_eps.dividend_by_year = div;
        assert!(estimate(&negative_eps, 5, 2025).is_none());

        // Price and EPS fine, but no payout ratio resolvable.
        let no_dividends = snapshot(Some(50.0), Some(5.0));
        assert!(estimate(&no_dividends, 5, 2025).is_none());
    }
}
