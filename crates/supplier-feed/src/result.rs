use serde::Serialize;

/// Summary of one sync call, returned to whoever triggered it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    /// Path or URL the feed came from.
    pub source: String,
    /// Rows read from the feed, valid and invalid.
    pub total: u64,
    pub inserted: u64,
    pub updated: u64,
    /// Human-readable messages in the order they occurred.
    pub errors: Vec<String>,
}

impl SyncResult {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// A result for a feed that could not be read at all.
    pub fn source_failure(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
            ..Self::new(source)
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// True when the feed failed before any row was read.
    pub fn is_source_failure(&self) -> bool {
        self.total == 0 && self.has_errors()
    }
}

impl std::fmt::Display for SyncResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} rows, {} inserted, {} updated, {} errors",
            self.source,
            self.total,
            self.inserted,
            self.updated,
            self.errors.len()
        )
    }
}
