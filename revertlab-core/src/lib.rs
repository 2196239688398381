//! RevertLab Core — engine for a single-instrument mean-reversion backtest.
//!
//! This crate contains the pure stages of a run, leaves first:
//! - Domain types (price bars, trades)
//! - Return series builder (gain/loss split)
//! - Momentum oscillator over a rolling simple-mean window
//! - Signal state machine with a time-boxed exit policy
//! - Trade simulator with next-bar-open execution
//!
//! Performance statistics live in `revertlab-runner`, next to the
//! orchestration that consumes them. Nothing here performs I/O.

pub mod domain;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod params;
pub mod returns;
pub mod signals;

pub use engine::{run_pipeline, PipelineOutput};
pub use error::{EngineError, TradeLeg};
pub use params::StrategyParams;
