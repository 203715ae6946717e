use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{info, warn};

use common::{DataProvider, FetchWindow, Result, ScreenerConfig, Symbol};
use strategy::StrategyRegistry;

use crate::observer::ScreenObserver;
use crate::orchestrator::{FetchOrchestrator, RunReport};
use crate::providers::build_provider;
use crate::retry::RetryConfig;
use crate::screening::ScreeningEngine;

/// Wires provider, registry and orchestrator together from one config.
pub struct Screener {
    orchestrator: FetchOrchestrator,
}

impl Screener {
    pub fn from_config(cfg: &ScreenerConfig) -> Result<Self> {
        let kind = cfg.provider_kind()?;
        let provider = build_provider(kind, Duration::from_millis(cfg.data_source.timeout_ms))?;
        let registry = StrategyRegistry::from_config(&cfg.strategies)?;
        if registry.is_empty() {
            warn!("No strategies enabled, every run will report zero matches");
        }
        info!(
            provider = %kind,
            strategies = registry.len(),
            max_workers = cfg.defaults.max_workers,
            retry_count = cfg.defaults.retry_count,
            "Screener configured"
        );

        Ok(Self::new(
            provider,
            registry,
            RetryConfig::exponential(cfg.defaults.retry_count),
            cfg.defaults.max_workers,
        ))
    }

    pub fn new(
        provider: Arc<dyn DataProvider>,
        registry: StrategyRegistry,
        retry: RetryConfig,
        max_workers: usize,
    ) -> Self {
        let engine = ScreeningEngine::new(Arc::new(registry));
        Self {
            orchestrator: FetchOrchestrator::new(provider, engine, retry, max_workers),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ScreenObserver>) -> Self {
        self.orchestrator = self.orchestrator.with_observer(observer);
        self
    }

    /// Screen `universe` over `window`. Empty `targets` means the window's last day.
    pub async fn run(
        &self,
        universe: Vec<Symbol>,
        window: FetchWindow,
        targets: &[NaiveDate],
    ) -> RunReport {
        if targets.is_empty() {
            let defaults = window.default_targets();
            return self.orchestrator.run(universe, window, &defaults).await;
        }
        self.orchestrator.run(universe, window, targets).await
    }
}
