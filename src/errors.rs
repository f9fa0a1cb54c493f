use thiserror::Error;

/// Failures talking to the station server or the geocoder.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} responded with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("prediction '{algorithm}' has no usable coordinate pair: {value}")]
    BadCoordinate { algorithm: String, value: String },
}

pub type ApiResult<T> = Result<T, ApiError>;
