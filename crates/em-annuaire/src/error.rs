use thiserror::Error;

#[derive(Debug, Error)]
pub enum GetError {
    #[error("the request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("the request failed with status code: {0}")]
    ResponseError(reqwest::StatusCode),
    #[error("the response body could not be read: {0}")]
    ResponseBodyError(#[source] reqwest::Error),
    #[error("unable to parse the response body: {0}")]
    ParseError(#[from] serde_json::Error),
}

impl GetError {
    /// Whether the failure happened while reaching the service, as opposed to
    /// while reading what it sent back.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            GetError::RequestError(_) | GetError::ResponseError(_) | GetError::ResponseBodyError(_)
        )
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("missing required input: {0}")]
    MissingInput(&'static str),
    #[error("no commune named `{commune}` for postal code {postal_code}")]
    CommuneNotFound {
        commune: String,
        postal_code: String,
    },
    #[error("search #{sequence} was superseded by a newer search")]
    Stale { sequence: u64 },
    #[error("unable to load establishment data: {0}")]
    Fetch(#[from] GetError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointConfigError {
    #[error("missing url for endpoint {0}")]
    MissingUrl(String),
    #[error("unsupported url `{1}` for endpoint {0}, expected http or https")]
    UnsupportedScheme(String, String),
}

#[derive(Debug, Error)]
pub enum ClientInitError {
    #[error("invalid endpoint configuration: {0}")]
    InvalidEndpointConfig(#[from] EndpointConfigError),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing is selected")]
    EmptySelection,
    #[error("unable to write the file: {0}")]
    WriteError(#[from] std::io::Error),
}
