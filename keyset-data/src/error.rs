/// Classification of a [`DataError`], independent of the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input from the caller: malformed cursor, conflicting or out-of-range options.
    Invalid,
    /// Engine/registry mismatch, never caused by external input.
    Internal,
    NotFound,
    /// Raised by the database collaborator (or cancellation) and passed through unchanged.
    Upstream,
}

/// Errors that can occur in the data layer.
#[derive(Debug)]
pub enum DataError {
    Invalid(String),
    Internal(String),
    NotFound(String),
    Database(Box<dyn std::error::Error + Send + Sync>),
    /// The request context was cancelled while a query was in flight.
    Cancelled,
}

impl DataError {
    /// Construct a `Database` variant from any error type.
    ///
    /// Used by backend crates (e.g. `keyset-data-sqlx`) to wrap driver-specific errors.
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DataError::Database(Box::new(err))
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        DataError::Invalid(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        DataError::Internal(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DataError::Invalid(_) => ErrorKind::Invalid,
            DataError::Internal(_) => ErrorKind::Internal,
            DataError::NotFound(_) => ErrorKind::NotFound,
            DataError::Database(_) | DataError::Cancelled => ErrorKind::Upstream,
        }
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::Invalid(msg) => write!(f, "Invalid request: {msg}"),
            DataError::Internal(msg) => write!(f, "Internal error: {msg}"),
            DataError::NotFound(msg) => write!(f, "Not found: {msg}"),
            DataError::Database(err) => write!(f, "Database error: {err}"),
            DataError::Cancelled => write!(f, "Query cancelled"),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Database(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
