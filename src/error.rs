/// Failures a strategy recovers from by handing over to the next one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SoftError {
    #[error("network error: {0}")]
    Network(String),
    #[error("rendered page did not expose #{frame_id} within the settle window")]
    RenderTimeout { frame_id: String },
    #[error("renderer unavailable: {0}")]
    RenderUnavailable(String),
    #[error("no configured selector matched")]
    SelectorNotFound,
    #[error("selector {selector:?} matched but yielded {chars} chars")]
    ExtractionEmpty { selector: String, chars: usize },
}

/// Failures no later strategy can fix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HardError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StrategyError {
    #[error(transparent)]
    Soft(#[from] SoftError),
    #[error(transparent)]
    Hard(#[from] HardError),
}
