pub mod config;
pub mod error;
pub mod market;
pub mod provider;
pub mod types;

pub use config::{DataSourceConfig, DefaultsConfig, ProviderKind, ScreenerConfig, StrategySettings};
pub use error::{Error, ErrorKind, Result};
pub use market::MarketCode;
pub use provider::DataProvider;
pub use types::*;
