use thiserror::Error;

/// Sign-in failures. The user stays unauthenticated; nothing is retried.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("sign-in was cancelled or timed out")]
    Cancelled,
    #[error("sign-in was denied: {0}")]
    Denied(String),
    #[error("not signed in")]
    NotSignedIn,
    #[error("redirect callback failed: {0}")]
    Callback(String),
    #[error("token exchange failed: {0}")]
    Exchange(String),
    #[error("invalid identity configuration: {0}")]
    Config(String),
}

/// Any failure talking to Graph on a read endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Graph returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid Graph URL: {0}")]
    Url(String),
}

/// Rejected before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("select a SharePoint site first")]
    MissingSite,
    #[error("select a SharePoint list first")]
    MissingList,
    #[error("select at least one email")]
    EmptySelection,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("unknown ticket field '{0}' (expected subject, description, user or ticketnumber)")]
    UnknownField(String),
    #[error("column '{0}' is not a writable column of the selected list")]
    UnknownColumn(String),
    #[error("mapping must look like field=column, got '{0}'")]
    Malformed(String),
}
