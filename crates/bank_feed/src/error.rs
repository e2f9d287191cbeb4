use engine::EngineError;
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Server { status: StatusCode, message: String },
    #[error("malformed feed response: {0}")]
    Malformed(String),
}

impl From<FeedError> for EngineError {
    fn from(err: FeedError) -> Self {
        EngineError::UpstreamFeed(err.to_string())
    }
}
