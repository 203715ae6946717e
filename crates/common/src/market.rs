use serde::{Deserialize, Serialize};

/// Exchange a ticker trades on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketCode {
    /// Shanghai.
    Sh,
    /// Shenzhen.
    Sz,
    /// Beijing.
    Bj,
}

impl MarketCode {
    /// Resolve the venue from the leading character of a ticker code.
    ///
    /// `6` is Shanghai, `0`/`3` Shenzhen, `4`/`8`/`9` Beijing. Anything else,
    /// including an empty code, falls back to Shanghai.
    pub fn resolve(code: &str) -> Self {
        match code.chars().next() {
            Some('6') => MarketCode::Sh,
            Some('0') | Some('3') => MarketCode::Sz,
            Some('8') | Some('9') | Some('4') => MarketCode::Bj,
            _ => MarketCode::Sh,
        }
    }

    /// Lower-case prefix used by Tencent symbols, e.g. `sh600000`.
    pub fn prefix(self) -> &'static str {
        match self {
            MarketCode::Sh => "sh",
            MarketCode::Sz => "sz",
            MarketCode::Bj => "bj",
        }
    }

    /// Market id used in EastMoney `secid` values. Only Shanghai has its own id.
    pub fn eastmoney_id(self) -> u8 {
        match self {
            MarketCode::Sh => 1,
            MarketCode::Sz | MarketCode::Bj => 0,
        }
    }
}

impl std::fmt::Display for MarketCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarketCode::Sh => write!(f, "SH"),
            MarketCode::Sz => write!(f, "SZ"),
            MarketCode::Bj => write!(f, "BJ"),
        }
    }
}
