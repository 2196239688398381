//! Performance metrics — pure functions that compute strategy statistics.
//!
//! Every metric is a pure function: trade list and/or price series in,
//! value out. Statistics that are undefined for the given input (no trades,
//! no winners, no losers) are `None` rather than zero.

use revertlab_core::domain::{PriceBar, Trade};
use serde::{Deserialize, Serialize};

/// Aggregate statistics for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub trade_count: usize,
    pub win_rate: Option<f64>,
    /// Mean return of winning trades.
    pub avg_win: Option<f64>,
    /// Mean magnitude of losing trades (positive number).
    pub avg_loss: Option<f64>,
    pub expectancy: Option<f64>,
    /// Compounded return after each trade, in trade order.
    pub cumulative_return_curve: Vec<f64>,
    /// Last point of the compounded curve; 0 with no trades.
    pub total_return: f64,
    pub buy_and_hold_return: f64,
}

impl PerformanceReport {
    /// Compute all statistics from the trade list and the full price series.
    ///
    /// Never fails: an empty trade list yields a degenerate report.
    pub fn compute(trades: &[Trade], bars: &[PriceBar]) -> Self {
        let win_rate = win_rate(trades);
        let avg_win = avg_win(trades);
        let avg_loss = avg_loss(trades);
        let cumulative_return_curve = cumulative_return_curve(trades);
        Self {
            trade_count: trades.len(),
            win_rate,
            avg_win,
            avg_loss,
            expectancy: expectancy(win_rate, avg_win, avg_loss),
            total_return: cumulative_return_curve.last().copied().unwrap_or(0.0),
            cumulative_return_curve,
            buy_and_hold_return: buy_and_hold_return(bars),
        }
    }

    /// Strategy return minus the passive baseline.
    pub fn excess_return(&self) -> f64 {
        self.total_return - self.buy_and_hold_return
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Fraction of trades with a strictly positive return.
pub fn win_rate(trades: &[Trade]) -> Option<f64> {
    if trades.is_empty() {
        return None;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    Some(winners as f64 / trades.len() as f64)
}

pub fn avg_win(trades: &[Trade]) -> Option<f64> {
    mean(trades.iter().filter(|t| t.is_winner()).map(|t| t.pnl))
}

pub fn avg_loss(trades: &[Trade]) -> Option<f64> {
    mean(trades.iter().filter(|t| t.is_loser()).map(|t| t.pnl.abs()))
}

/// `win_rate * avg_win - (1 - win_rate) * avg_loss`.
///
/// A missing average means its subset is empty and its term contributes 0.
/// Break-even trades count toward the loss weight but add nothing to the
/// loss term.
pub fn expectancy(
    win_rate: Option<f64>,
    avg_win: Option<f64>,
    avg_loss: Option<f64>,
) -> Option<f64> {
    let p = win_rate?;
    Some(p * avg_win.unwrap_or(0.0) - (1.0 - p) * avg_loss.unwrap_or(0.0))
}

/// `Π(1 + pnl[0..=k]) - 1` for every k.
pub fn cumulative_return_curve(trades: &[Trade]) -> Vec<f64> {
    trades
        .iter()
        .scan(1.0_f64, |growth, t| {
            *growth *= 1.0 + t.pnl;
            Some(*growth - 1.0)
        })
        .collect()
}

/// Last adjusted close over first adjusted close, minus one.
///
/// Returns 0.0 for fewer than two bars or a non-positive first price.
pub fn buy_and_hold_return(bars: &[PriceBar]) -> f64 {
    let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
        return 0.0;
    };
    if bars.len() < 2 || first.adj_close <= 0.0 {
        return 0.0;
    }
    last.adj_close / first.adj_close - 1.0
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}
