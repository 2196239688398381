//! Chart-ready series for an external renderer.
//!
//! Nothing here draws: the renderer receives the adjusted-close line, the
//! oscillator line, buy markers, and the compounded curve aligned to exits.

use chrono::NaiveDate;
use revertlab_core::domain::{PriceBar, Trade};
use revertlab_core::indicators::OscillatorPoint;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub adj_close: Vec<SeriesPoint>,
    pub oscillator: Vec<SeriesPoint>,
    /// Buy markers: entry date and the adjusted close on that date.
    pub entries: Vec<SeriesPoint>,
    /// Compounded strategy return, one point per trade at its exit date.
    pub equity: Vec<SeriesPoint>,
}

impl ChartSeries {
    pub fn build(
        bars: &[PriceBar],
        oscillator: &[OscillatorPoint],
        trades: &[Trade],
        cumulative_return_curve: &[f64],
    ) -> Self {
        let closes: HashMap<NaiveDate, f64> = bars.iter().map(|b| (b.date, b.adj_close)).collect();

        Self {
            adj_close: bars
                .iter()
                .map(|b| SeriesPoint {
                    date: b.date,
                    value: b.adj_close,
                })
                .collect(),
            oscillator: oscillator
                .iter()
                .map(|p| SeriesPoint {
                    date: p.date,
                    value: p.value,
                })
                .collect(),
            entries: trades
                .iter()
                .filter_map(|t| {
                    closes.get(&t.entry_date).map(|&value| SeriesPoint {
                        date: t.entry_date,
                        value,
                    })
                })
                .collect(),
            equity: trades
                .iter()
                .zip(cumulative_return_curve)
                .map(|(t, &value)| SeriesPoint {
                    date: t.exit_date,
                    value,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revertlab_core::domain::ExitReason;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn markers_and_equity_align_with_trades() {
        let bars: Vec<PriceBar> = (2..=8)
            .map(|d| PriceBar::new(day(d), 100.0, 200.0 + d as f64))
            .collect();
        let trades = vec![
            Trade {
                entry_date: day(3),
                exit_date: day(5),
                entry_price: 100.0,
                exit_price: 110.0,
                pnl: 0.10,
                exit_reason: ExitReason::Early,
                bars_held: 2,
            },
            Trade {
                entry_date: day(6),
                exit_date: day(8),
                entry_price: 100.0,
                exit_price: 95.0,
                pnl: -0.05,
                exit_reason: ExitReason::TimeStop,
                bars_held: 2,
            },
        ];
        let curve = [0.10, 0.045];

        let chart = ChartSeries::build(&bars, &[], &trades, &curve);

        assert_eq!(chart.adj_close.len(), 7);
        assert!(chart.oscillator.is_empty());
        assert_eq!(
            chart.entries,
            vec![
                SeriesPoint {
                    date: day(3),
                    value: 203.0,
                },
                SeriesPoint {
                    date: day(6),
                    value: 206.0,
                },
            ]
        );
        assert_eq!(chart.equity[0].date, day(5));
        assert_eq!(
            chart.equity[1],
            SeriesPoint {
                date: day(8),
                value: 0.045,
            }
        );
    }
}
