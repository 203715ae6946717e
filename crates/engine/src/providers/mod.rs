pub mod eastmoney;
pub mod tencent;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use common::{parse_number, DataProvider, Error, ProviderKind, Result};

pub use eastmoney::EastMoneyProvider;
pub use tencent::TencentProvider;

/// Instantiate the configured data source. Nothing downstream branches on `kind`.
pub fn build_provider(kind: ProviderKind, timeout: Duration) -> Result<Arc<dyn DataProvider>> {
    let provider: Arc<dyn DataProvider> = match kind {
        ProviderKind::Tencent => Arc::new(TencentProvider::new(timeout)?),
        ProviderKind::EastMoney => Arc::new(EastMoneyProvider::new(timeout)?),
    };
    Ok(provider)
}

// ─── Shared HTTP plumbing ─────────────────────────────────────────────────────

fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .use_rustls_tls()
        .timeout(timeout)
        .user_agent("Mozilla/5.0 (X11; Linux x86_64)")
        .build()
        .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))
}

/// GET `url` and return the body. Every failure on the way is transient.
async fn get_text(client: &Client, url: &str, query: &[(&str, String)]) -> Result<String> {
    let resp = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(network_error)?;

    let status = resp.status();
    if !status.is_success() {
        return Err(Error::TransientNetwork(format!("HTTP {status} from {url}")));
    }
    resp.text().await.map_err(network_error)
}

fn network_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::TransientNetwork(format!("request timed out: {e}"))
    } else {
        Error::TransientNetwork(e.to_string())
    }
}

/// Numeric JSON cell that may arrive as a number or a string. Missing or
/// malformed cells become `NaN`.
fn json_number(cell: Option<&Value>) -> f64 {
    match cell {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => parse_number(s),
        _ => f64::NAN,
    }
}
