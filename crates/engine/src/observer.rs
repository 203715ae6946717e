use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use common::{Error, FetchJob, FetchState, StrategyMatch, Symbol};

use crate::orchestrator::RunReport;

/// Hooks for progress and per-job outcomes of a screening run.
///
/// Called from worker tasks, so implementations must be cheap and thread-safe.
/// Every method defaults to a no-op.
pub trait ScreenObserver: Send + Sync {
    fn retry_scheduled(&self, _job: &FetchJob, _error: &Error, _delay: Duration) {}

    /// The job reached a terminal state.
    fn job_finished(&self, _job: &FetchJob) {}

    fn target_missing(&self, _symbol: &Symbol, _date: NaiveDate) {}

    fn strategy_matched(&self, _m: &StrategyMatch) {}

    fn run_finished(&self, _report: &RunReport) {}
}

/// Default observer: structured log lines via `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ScreenObserver for TracingObserver {
    fn retry_scheduled(&self, job: &FetchJob, error: &Error, delay: Duration) {
        warn!(
            symbol = %job.symbol.code,
            attempt = job.attempt,
            delay_ms = delay.as_millis() as u64,
            %error,
            "Fetch failed, retrying"
        );
    }

    fn job_finished(&self, job: &FetchJob) {
        match job.state {
            FetchState::FailedTerminal => warn!(
                symbol = %job.symbol.code,
                attempts = job.attempt,
                error = ?job.last_error,
                "Giving up on symbol"
            ),
            FetchState::EmptyResult => {
                debug!(symbol = %job.symbol.code, "No bars in window")
            }
            state => debug!(symbol = %job.symbol.code, %state, attempts = job.attempt, "Fetch done"),
        }
    }

    fn target_missing(&self, symbol: &Symbol, date: NaiveDate) {
        debug!(symbol = %symbol.code, %date, "No bar on target date, skipped");
    }

    fn strategy_matched(&self, m: &StrategyMatch) {
        info!(
            symbol = %m.symbol_code,
            name = %m.symbol_name,
            strategy = %m.strategy_name,
            date = %m.target_date,
            "Strategy matched"
        );
    }

    fn run_finished(&self, report: &RunReport) {
        info!(
            screened = report.screened,
            empty = report.empty,
            failed = report.failed,
            retries = report.retries,
            matches = report.matches.len(),
            "Screening run finished"
        );
    }
}
