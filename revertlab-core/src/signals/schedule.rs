//! Entry/exit schedule with a time-boxed exit policy.
//!
//! Trigger at step `i` (value below the entry threshold) → entry at `i + 1`.
//! Offsets `j = 1..=H` inspect step `i + j`: a value above the exit threshold
//! schedules the exit at `i + j + 1`; otherwise the exit is forced at
//! `i + H + 1`. Execution is always one step after the observation.
//!
//! One position at a time: the scan resumes at the exit step, so the next
//! entry falls strictly after the previous exit. A trigger whose entry,
//! inspected step or exit lies past the end of the series is dropped, and
//! the scan stops there because the position would still be open.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{classify, Signal};
use crate::domain::ExitReason;
use crate::error::EngineError;
use crate::indicators::OscillatorPoint;
use crate::params::StrategyParams;

/// How the exit search for one trigger ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Exit step after an oscillator reading above the exit threshold.
    Early(usize),
    /// Exit step after the holding horizon elapsed.
    Timed(usize),
    /// Not enough data after the trigger to complete the trade.
    Dropped,
}

/// Step indices of one matched entry/exit pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalPair {
    pub trigger: usize,
    pub entry: usize,
    pub exit: usize,
    pub reason: ExitReason,
}

impl SignalPair {
    pub fn bars_held(&self) -> usize {
        self.exit - self.entry
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    pub pairs: Vec<SignalPair>,
    /// Trigger step left without an exit at the end of the series.
    pub dropped_trigger: Option<usize>,
}

/// Search forward from `trigger` for the exit step.
pub fn resolve_exit(values: &[f64], trigger: usize, params: &StrategyParams) -> ExitOutcome {
    if trigger + 1 >= values.len() {
        return ExitOutcome::Dropped;
    }
    for offset in 1..=params.max_holding {
        let step = trigger + offset;
        let Some(&value) = values.get(step) else {
            return ExitOutcome::Dropped;
        };
        let exit = step + 1;
        let outcome = if classify(value, params) == Signal::Idle {
            ExitOutcome::Early(exit)
        } else if offset == params.max_holding {
            ExitOutcome::Timed(exit)
        } else {
            continue;
        };
        return if exit < values.len() {
            outcome
        } else {
            ExitOutcome::Dropped
        };
    }
    // Only reachable with max_holding == 0, which validation rejects.
    ExitOutcome::Dropped
}

/// Scan a series of oscillator values into non-overlapping entry/exit pairs.
pub fn scan_pairs(values: &[f64], params: &StrategyParams) -> ScanResult {
    let mut result = ScanResult::default();
    let mut step = 0;

    while step < values.len() {
        if classify(values[step], params) != Signal::Entry {
            step += 1;
            continue;
        }
        let (exit, reason) = match resolve_exit(values, step, params) {
            ExitOutcome::Early(exit) => (exit, ExitReason::Early),
            ExitOutcome::Timed(exit) => (exit, ExitReason::TimeStop),
            ExitOutcome::Dropped => {
                result.dropped_trigger = Some(step);
                break;
            }
        };
        result.pairs.push(SignalPair {
            trigger: step,
            entry: step + 1,
            exit,
            reason,
        });
        step = exit;
    }

    result
}

/// Dated schedule handed to the trade simulator.
///
/// `entry_dates[k]` pairs with `exit_dates[k]`; both are index-aligned with
/// `pairs[k]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSchedule {
    pub entry_dates: Vec<NaiveDate>,
    pub exit_dates: Vec<NaiveDate>,
    pub pairs: Vec<SignalPair>,
    pub dropped_trigger: Option<NaiveDate>,
}

impl SignalSchedule {
    /// Build the schedule from assembled parts, enforcing 1:1 pairing.
    pub fn new(
        entry_dates: Vec<NaiveDate>,
        exit_dates: Vec<NaiveDate>,
        pairs: Vec<SignalPair>,
        dropped_trigger: Option<NaiveDate>,
    ) -> Result<Self, EngineError> {
        if entry_dates.len() != exit_dates.len() || pairs.len() != entry_dates.len() {
            return Err(EngineError::Alignment {
                entries: entry_dates.len(),
                exits: exit_dates.len(),
            });
        }
        Ok(Self {
            entry_dates,
            exit_dates,
            pairs,
            dropped_trigger,
        })
    }

    pub fn from_oscillator(
        points: &[OscillatorPoint],
        params: &StrategyParams,
    ) -> Result<Self, EngineError> {
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();
        let scan = scan_pairs(&values, params);

        let entry_dates = scan.pairs.iter().map(|p| points[p.entry].date).collect();
        let exit_dates = scan.pairs.iter().map(|p| points[p.exit].date).collect();
        let dropped_trigger = scan.dropped_trigger.map(|step| points[step].date);

        Self::new(entry_dates, exit_dates, scan.pairs, dropped_trigger)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> StrategyParams {
        StrategyParams {
            window: 1,
            ..Default::default()
        }
    }

    #[test]
    fn no_trigger_no_pairs() {
        let values = vec![55.0; 30];
        let scan = scan_pairs(&values, &params());
        assert!(scan.pairs.is_empty());
        assert_eq!(scan.dropped_trigger, None);
    }

    #[test]
    fn early_exit_one_step_after_reading() {
        // 25 at step 0 triggers, 45 at step 2 exits.
        let mut values = vec![35.0; 12];
        values[0] = 25.0;
        values[2] = 45.0;
        let scan = scan_pairs(&values, &params());
        assert_eq!(
            scan.pairs,
            vec![SignalPair {
                trigger: 0,
                entry: 1,
                exit: 3,
                reason: ExitReason::Early,
            }]
        );
    }

    #[test]
    fn time_stop_after_horizon() {
        let mut values = vec![35.0; 15];
        values[0] = 20.0;
        let scan = scan_pairs(&values, &params());
        assert_eq!(scan.pairs.len(), 1);
        let pair = scan.pairs[0];
        assert_eq!(pair.exit, 11);
        assert_eq!(pair.reason, ExitReason::TimeStop);
        assert_eq!(pair.bars_held(), 10);
    }

    #[test]
    fn exit_threshold_is_strict() {
        let mut values = vec![35.0; 15];
        values[0] = 20.0;
        values[1] = 40.0;
        let outcome = resolve_exit(&values, 0, &params());
        assert_eq!(outcome, ExitOutcome::Timed(11));
    }

    #[test]
    fn early_exit_on_last_offset_is_early() {
        let mut values = vec![35.0; 15];
        values[0] = 20.0;
        values[10] = 41.0;
        assert_eq!(resolve_exit(&values, 0, &params()), ExitOutcome::Early(11));
    }

    #[test]
    fn sub_threshold_readings_while_holding_are_not_new_entries() {
        let mut values = vec![35.0; 20];
        values[0] = 20.0;
        values[1] = 15.0;
        values[2] = 10.0;
        values[4] = 50.0;
        let scan = scan_pairs(&values, &params());
        assert_eq!(scan.pairs.len(), 1);
        assert_eq!(scan.pairs[0].entry, 1);
        assert_eq!(scan.pairs[0].exit, 5);
    }

    #[test]
    fn next_trigger_may_be_the_exit_step() {
        let mut values = vec![35.0; 20];
        values[0] = 20.0;
        values[1] = 45.0; // exit at 2
        values[2] = 25.0; // trigger on the exit step → entry at 3
        values[3] = 45.0; // exit at 4
        let scan = scan_pairs(&values, &params());
        assert_eq!(scan.pairs.len(), 2);
        assert_eq!((scan.pairs[0].entry, scan.pairs[0].exit), (1, 2));
        assert_eq!((scan.pairs[1].entry, scan.pairs[1].exit), (3, 4));
        assert!(scan.pairs[1].entry > scan.pairs[0].exit);
    }

    #[test]
    fn trigger_on_last_step_is_dropped() {
        let mut values = vec![35.0; 10];
        values[9] = 10.0;
        let scan = scan_pairs(&values, &params());
        assert!(scan.pairs.is_empty());
        assert_eq!(scan.dropped_trigger, Some(9));
    }

    #[test]
    fn time_stop_past_end_is_dropped() {
        let mut values = vec![35.0; 11];
        values[0] = 20.0;
        // exit would be step 11, one past the end
        assert_eq!(resolve_exit(&values, 0, &params()), ExitOutcome::Dropped);
    }

    #[test]
    fn early_exit_reading_on_last_step_is_dropped() {
        let mut values = vec![35.0; 5];
        values[0] = 20.0;
        values[4] = 45.0; // exit would land on step 5
        assert_eq!(resolve_exit(&values, 0, &params()), ExitOutcome::Dropped);
    }

    #[test]
    fn dropped_trigger_stops_the_scan() {
        let mut values = vec![35.0; 8];
        values[0] = 20.0;
        values[2] = 45.0; // pair (1, 3)
        values[5] = 20.0; // needs 10 more steps, dropped
        let scan = scan_pairs(&values, &params());
        assert_eq!(scan.pairs.len(), 1);
        assert_eq!(scan.dropped_trigger, Some(5));
    }

    #[test]
    fn schedule_rejects_misaligned_parts() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let err = SignalSchedule::new(vec![day], vec![], vec![], None).unwrap_err();
        assert_eq!(
            err,
            EngineError::Alignment {
                entries: 1,
                exits: 0
            }
        );
    }

    #[test]
    fn schedule_from_oscillator_maps_steps_to_dates() {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let mut values = vec![35.0; 12];
        values[0] = 25.0;
        values[2] = 45.0;
        let points: Vec<OscillatorPoint> = values
            .iter()
            .enumerate()
            .map(|(i, &value)| OscillatorPoint {
                date: base + chrono::Duration::days(i as i64),
                avg_gain: 0.0,
                avg_loss: 0.0,
                value,
            })
            .collect();

        let schedule = SignalSchedule::from_oscillator(&points, &params()).unwrap();
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule.entry_dates, vec![points[1].date]);
        assert_eq!(schedule.exit_dates, vec![points[3].date]);
        assert_eq!(schedule.dropped_trigger, None);
    }
}
