use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Unknown provider, unknown strategy or an invalid parameter. Fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connectivity failure, timeout or non-success HTTP status from a provider.
    #[error("Network error: {0}")]
    TransientNetwork(String),

    /// Upstream payload that cannot be normalized at all.
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Config,
            Error::TransientNetwork(_) => ErrorKind::TransientNetwork,
            Error::Parse(_) => ErrorKind::Parse,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// Whether a fetch job may try again after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::TransientNetwork(_) | Error::Parse(_))
    }
}

/// Copyable classification of [`Error`], recorded on fetch jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    TransientNetwork,
    Parse,
    Io,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Config => write!(f, "config"),
            ErrorKind::TransientNetwork => write!(f, "network"),
            ErrorKind::Parse => write!(f, "parse"),
            ErrorKind::Io => write!(f, "io"),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_and_parse_errors_are_retryable() {
        assert!(Error::TransientNetwork("timeout".into()).is_retryable());
        assert!(Error::Parse("bad json".into()).is_retryable());
        assert!(!Error::Config("unknown provider".into()).is_retryable());
    }

    #[test]
    fn json_errors_surface_as_parse() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{oops")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }
}
