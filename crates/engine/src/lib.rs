pub mod aggregator;
pub mod observer;
pub mod orchestrator;
pub mod providers;
pub mod retry;
pub mod screener;
pub mod screening;

pub use aggregator::ResultAggregator;
pub use observer::{ScreenObserver, TracingObserver};
pub use orchestrator::{FetchOrchestrator, RunReport};
pub use providers::{build_provider, EastMoneyProvider, TencentProvider};
pub use retry::{Backoff, RetryConfig};
pub use screener::Screener;
pub use screening::ScreeningEngine;
