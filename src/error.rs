use thiserror::Error;

/// Failure taxonomy for command execution.
///
/// Every variant maps to a spoken recovery at the dispatch site; none of them
/// is allowed to escape the dispatcher or stop the capture loop.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Empty, too-short, or unparseable input at the language boundary.
    #[error("unusable input: {0}")]
    Input(String),

    /// A place or contact the lookup service could not resolve.
    #[error("could not find {0}")]
    Lookup(String),

    /// Non-2xx response or unreachable collaborator. No automatic retry.
    #[error("network failure: {0}")]
    Network(String),

    /// Device position denied or unavailable.
    #[error("position unavailable: {0}")]
    Permission(String),
}

impl From<reqwest::Error> for DispatchError {
    fn from(err: reqwest::Error) -> Self {
        DispatchError::Network(err.to_string())
    }
}

impl DispatchError {
    /// True when the failure is a missing place/contact rather than transport.
    pub fn is_lookup(&self) -> bool {
        matches!(self, DispatchError::Lookup(_))
    }
}
