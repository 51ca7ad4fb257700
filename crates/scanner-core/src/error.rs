use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScanError {
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Insufficient history: need {required} bars, have {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("Model fit failure: {0}")]
    ModelFitFailure(String),

    #[error("Upstream transport error: {0}")]
    UpstreamTransport(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// No symbol in the selection could be resolved, mandatory ones included.
    #[error("No data: no symbol could be resolved")]
    NoData,
}
