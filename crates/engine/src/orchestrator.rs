use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use common::{
    DataProvider, FetchJob, FetchState, FetchWindow, HistorySeries, MarketCode, StrategyMatch,
    Symbol,
};

use crate::aggregator::ResultAggregator;
use crate::observer::{ScreenObserver, TracingObserver};
use crate::retry::RetryConfig;
use crate::screening::ScreeningEngine;

/// Outcome of one screening run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// Sorted by date, symbol, then strategy.
    pub matches: Vec<StrategyMatch>,
    /// Symbols whose history was fetched and evaluated.
    pub screened: usize,
    /// Symbols for which the provider had no bars in the window.
    pub empty: usize,
    /// Symbols abandoned after a non-retryable error or exhausted retries.
    pub failed: usize,
    /// Retries consumed across all symbols.
    pub retries: u32,
    pub failed_symbols: Vec<String>,
}

impl RunReport {
    fn record(&mut self, job: &FetchJob) {
        self.retries += job.retries();
        match job.state {
            FetchState::Succeeded => self.screened += 1,
            FetchState::EmptyResult => self.empty += 1,
            _ => {
                self.failed += 1;
                self.failed_symbols.push(job.symbol.code.clone());
            }
        }
    }

    fn merge(&mut self, other: RunReport) {
        self.screened += other.screened;
        self.empty += other.empty;
        self.failed += other.failed;
        self.retries += other.retries;
        self.failed_symbols.extend(other.failed_symbols);
    }
}

/// Fans the universe out over `max_workers` tasks pulling from one queue.
///
/// Each symbol is fetched with bounded retries, then screened on the worker
/// that fetched it. A failing or panicking symbol never affects the others.
#[derive(Clone)]
pub struct FetchOrchestrator {
    provider: Arc<dyn DataProvider>,
    engine: ScreeningEngine,
    retry: RetryConfig,
    max_workers: usize,
    observer: Arc<dyn ScreenObserver>,
}

impl FetchOrchestrator {
    pub fn new(
        provider: Arc<dyn DataProvider>,
        engine: ScreeningEngine,
        retry: RetryConfig,
        max_workers: usize,
    ) -> Self {
        Self {
            provider,
            engine,
            retry,
            max_workers: max_workers.max(1),
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ScreenObserver>) -> Self {
        self.engine = self.engine.with_observer(observer.clone());
        self.observer = observer;
        self
    }

    pub async fn run(
        &self,
        universe: Vec<Symbol>,
        window: FetchWindow,
        targets: &[NaiveDate],
    ) -> RunReport {
        let total = universe.len();
        let workers = self.max_workers.min(total).max(1);
        info!(
            provider = %self.provider.name(),
            symbols = total,
            workers,
            strategies = self.engine.registry().len(),
            start = %window.start,
            end = %window.end,
            "Screening run started"
        );

        let (job_tx, job_rx) = mpsc::channel::<Symbol>(workers * 2);
        let job_rx = Arc::new(Mutex::new(job_rx));
        let sink = ResultAggregator::new();
        let targets: Arc<[NaiveDate]> = Arc::from(targets);

        let mut tasks = JoinSet::new();
        for worker_id in 0..workers {
            let this = self.clone();
            let rx = job_rx.clone();
            let sink = sink.clone();
            let targets = targets.clone();
            tasks.spawn(async move { this.work(worker_id, rx, sink, window, targets).await });
        }
        drop(job_rx);

        for symbol in universe {
            if job_tx.send(symbol).await.is_err() {
                error!("All fetch workers stopped, remaining symbols dropped");
                break;
            }
        }
        drop(job_tx);

        let mut report = RunReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(partial) => report.merge(partial),
                Err(e) => error!(error = %e, "Fetch worker aborted"),
            }
        }
        report.matches = sink.into_sorted();
        report.failed_symbols.sort();

        self.observer.run_finished(&report);
        report
    }

    async fn work(
        &self,
        worker_id: usize,
        queue: Arc<Mutex<mpsc::Receiver<Symbol>>>,
        sink: ResultAggregator,
        window: FetchWindow,
        targets: Arc<[NaiveDate]>,
    ) -> RunReport {
        let mut tally = RunReport::default();
        loop {
            // Lock only for the dequeue so other workers can pull meanwhile.
            let next = queue.lock().await.recv().await;
            let Some(symbol) = next else { break };

            let (job, matches) = self.screen_isolated(symbol, window, targets.clone()).await;
            sink.extend(matches);
            tally.record(&job);
        }
        debug!(worker_id, screened = tally.screened, "Fetch worker drained queue");
        tally
    }

    /// Fetch and evaluate one symbol on its own task so a panic ends only
    /// that job, as `FailedTerminal`, and the worker moves on.
    async fn screen_isolated(
        &self,
        symbol: Symbol,
        window: FetchWindow,
        targets: Arc<[NaiveDate]>,
    ) -> (FetchJob, Vec<StrategyMatch>) {
        let this = self.clone();
        let fallback = symbol.clone();
        let handle = tokio::spawn(async move {
            let (job, series) = this.fetch_with_retry(symbol, window).await;
            let matches = match &series {
                Some(series) => this.engine.evaluate(&job.symbol, series, &targets),
                None => Vec::new(),
            };
            (job, matches)
        });

        match handle.await {
            Ok(done) => done,
            Err(e) => {
                error!(symbol = %fallback.code, error = %e, "Screening job panicked");
                let mut job = FetchJob::new(fallback);
                job.attempt = 1;
                job.state = FetchState::FailedTerminal;
                self.observer.job_finished(&job);
                (job, Vec::new())
            }
        }
    }

    /// Drive one symbol to a terminal state.
    ///
    /// Retryable errors are retried while retries remain; anything else, or
    /// the error after the last retry, ends the job as `FailedTerminal`. An
    /// empty series ends it as `EmptyResult` without a retry.
    pub async fn fetch_with_retry(
        &self,
        symbol: Symbol,
        window: FetchWindow,
    ) -> (FetchJob, Option<HistorySeries>) {
        let market = MarketCode::resolve(&symbol.code);
        let mut job = FetchJob::new(symbol);

        let series = loop {
            job.attempt += 1;
            job.state = FetchState::Running;

            let err = match self
                .provider
                .fetch(&job.symbol.code, market, window.start, window.end)
                .await
            {
                Ok(series) if series.is_empty() => {
                    job.state = FetchState::EmptyResult;
                    break None;
                }
                Ok(series) => {
                    job.state = FetchState::Succeeded;
                    break Some(series);
                }
                Err(e) => e,
            };

            job.last_error = Some(err.kind());
            let retries_used = job.retries();
            if !err.is_retryable() || !self.retry.allows(retries_used) {
                job.state = FetchState::FailedTerminal;
                break None;
            }

            job.state = FetchState::FailedRetrying;
            let delay = self.retry.delay_for(retries_used);
            self.observer.retry_scheduled(&job, &err, delay);
            tokio::time::sleep(delay).await;
        };

        self.observer.job_finished(&job);
        (job, series)
    }
}
