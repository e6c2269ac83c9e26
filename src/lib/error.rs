use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("overpass responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed overpass response: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("could not serialize output: {0}")]
    Json(#[source] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid argument {0}")]
    InvalidArgument(String),

    #[error("location could not be determined: {0}")]
    Locate(String),
}
