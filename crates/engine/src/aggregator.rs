use std::sync::{Arc, Mutex, MutexGuard};

use common::StrategyMatch;

/// Collects matches from concurrent workers. Clones share the same buffer.
///
/// Arrival order depends on scheduling; [`ResultAggregator::into_sorted`]
/// gives a stable order for reporting.
#[derive(Debug, Clone, Default)]
pub struct ResultAggregator {
    inner: Arc<Mutex<Vec<StrategyMatch>>>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&self, matches: Vec<StrategyMatch>) {
        if matches.is_empty() {
            return;
        }
        self.lock().extend(matches);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain everything collected so far, ordered by date, symbol, then strategy.
    pub fn into_sorted(self) -> Vec<StrategyMatch> {
        let mut matches = std::mem::take(&mut *self.lock());
        matches.sort_by(|a, b| {
            a.target_date
                .cmp(&b.target_date)
                .then_with(|| a.symbol_code.cmp(&b.symbol_code))
                .then_with(|| a.strategy_name.cmp(&b.strategy_name))
        });
        matches
    }

    // A panicking worker must not hide the matches already collected.
    fn lock(&self) -> MutexGuard<'_, Vec<StrategyMatch>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
