use crate::endp::yahoo_finance as yf;
use crate::schema::Fundamentals;
use anyhow::Result;
use std::future::Future;

/// Supplier of one symbol's fundamentals for a single run.
///
/// A missing field is not an error; implementations return `Err` only for a
/// whole-symbol fault (transport failure, unparseable payload) so the engine
/// can isolate that symbol and keep the batch alive.
pub trait FundamentalsSource {
    fn fundamentals(&self, symbol: &str) -> impl Future<Output = Result<Fundamentals>> + Send;
}

/// Add-on methods for [`reqwest::Client`], wiring the Yahoo! Finance
/// endpoints into a single per-symbol snapshot.
///
/// [`reqwest::Client`]: https://docs.rs/reqwest/latest/reqwest/struct.Client.html
impl FundamentalsSource for reqwest::Client {
    async fn fundamentals(&self, symbol: &str) -> Result<Fundamentals> {
        let mut snap = Fundamentals::new(symbol);

        // Quote-summary fields degrade to absent; the estimator and the
        // trigger rules both know how to handle the gaps.
        match yf::quote_summary(self, symbol).await {
            Ok(summary) => {
                snap.price = summary.price;
                snap.trailing_eps = summary.trailing_eps;
                snap.shares_outstanding = summary.shares_outstanding;
                snap.quarterly_net_income = summary.quarterly_net_income;
            }
            Err(e) => log::warn!("[{symbol}] quote summary unavailable: {e}"),
        }

        // Dividend history is the backbone of the fingerprint; failing to
        // fetch it fails the symbol for this run.
        snap.dividend_by_year = yf::dividends_by_year(self, symbol).await?;

        match yf::latest_news_ts(self, symbol).await {
            Ok(ts) => snap.latest_news_ts = ts,
            Err(e) => log::debug!("[{symbol}] news lookup failed: {e}"),
        }

        Ok(snap)
    }
}
