/// A write rejected by, or never delivered to, a store
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The store answered with a non-success status
    Http { status: u16, body: String },
    /// The request never got a response (DNS, TLS, connection reset, ...)
    Transport(String),
    /// The batch holds more writes than the store accepts in one commit
    BatchTooLarge { size: usize, limit: usize },
    /// Refused without an HTTP exchange (in-memory stores)
    Rejected(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Http { status, body } => {
                if body.is_empty() {
                    write!(f, "HTTP {}", status)
                } else {
                    write!(f, "HTTP {}: {}", status, body)
                }
            }
            StoreError::Transport(message) => write!(f, "request failed: {}", message),
            StoreError::BatchTooLarge { size, limit } => {
                write!(f, "batch of {} writes exceeds the limit of {}", size, limit)
            }
            StoreError::Rejected(message) => write!(f, "rejected: {}", message),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Transport(err.to_string())
    }
}
