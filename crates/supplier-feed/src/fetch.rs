/// Errors from fetching a feed over the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("{0}")]
    Network(String),

    #[error("{status}")]
    Status { status: u16 },
}

impl FetchError {
    /// Whether another attempt might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Status { status } => *status == 429 || *status >= 500,
        }
    }
}

/// Raw response body of a successful fetch.
#[derive(Debug, Clone)]
pub struct FetchedBody {
    pub bytes: Vec<u8>,
}

/// Fetches a JSON product feed from a remote endpoint.
///
/// Implementations apply their own retry policy; an `Err` is terminal.
#[async_trait::async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, url: &str, token: Option<&str>) -> Result<FetchedBody, FetchError>;
}
