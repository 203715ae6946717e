use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;

use common::{HistorySeries, StrategyMatch, Symbol};
use strategy::StrategyRegistry;

use crate::observer::{ScreenObserver, TracingObserver};

/// Evaluates the registry against one symbol's history at each target date.
///
/// For target `d` a strategy sees only bars dated on or before `d`. Targets
/// without a bar (suspension, holiday) are skipped for that symbol.
#[derive(Clone)]
pub struct ScreeningEngine {
    registry: Arc<StrategyRegistry>,
    observer: Arc<dyn ScreenObserver>,
}

impl ScreeningEngine {
    pub fn new(registry: Arc<StrategyRegistry>) -> Self {
        Self {
            registry,
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ScreenObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    pub fn evaluate(
        &self,
        symbol: &Symbol,
        series: &HistorySeries,
        targets: &[NaiveDate],
    ) -> Vec<StrategyMatch> {
        let index: HashMap<NaiveDate, usize> = series
            .bars()
            .iter()
            .enumerate()
            .map(|(i, bar)| (bar.date, i))
            .collect();

        let mut matches = Vec::new();
        for &date in targets {
            let Some(&i) = index.get(&date) else {
                self.observer.target_missing(symbol, date);
                continue;
            };
            for m in self.registry.evaluate(series.prefix(i), symbol) {
                self.observer.strategy_matched(&m);
                matches.push(m);
            }
        }
        matches
    }
}
