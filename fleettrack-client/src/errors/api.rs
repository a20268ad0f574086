use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Transport-level failure: DNS, connect, timeout, interrupted body.
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered outside the 2xx range.
    #[error("{endpoint} returned {status}")]
    Status {
        endpoint: String,
        status: StatusCode,
    },

    /// The body was not the expected JSON shape.
    #[error("failed to decode {endpoint} payload: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}
