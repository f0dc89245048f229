#[derive(Debug, thiserror::Error)]
pub enum MonsterError {
    #[error("Credential is missing. Please provide it or set the {0} environment variable.")]
    MissingCredentials(&'static str),
    #[error("Credential is not a valid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
    #[error("Network request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Failed to parse API response: {0}")]
    ResponseParseFailed(#[from] serde_json::Error),
    #[error("API request failed: {message}")]
    ApiError { message: String },
    #[error("Task was not accepted: {message}")]
    RequestRejected { message: String },
    #[error("Task did not complete after {attempts} status checks")]
    PollLimitExceeded { attempts: u32 },
    #[error("Polling was cancelled")]
    Cancelled,
    #[error("URL parsing failed: {0}")]
    UrlParseFailed(#[from] url::ParseError),
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
