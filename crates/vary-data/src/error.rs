//! Error types for data provisioning
//!
//! None of these reach a caller of the provisioning chain: source errors
//! advance the chain and store errors degrade to cache misses. They exist so
//! every stage can log precisely why it was skipped.

/// Failure of a dataset or generation source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Transport failure
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status
    #[error("unexpected status {status} from {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Response body had the wrong shape
    #[error("malformed response: {0}")]
    Decode(String),

    /// Stage exceeded its time budget
    #[error("timed out after {0}ms")]
    Timeout(u64),

    /// Source cannot serve this request
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

impl SourceError {
    /// Create decode error
    #[inline]
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create unavailable error
    #[inline]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Check if the failure was a timeout
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Why a chain stage produced nothing usable
#[derive(Debug, thiserror::Error)]
pub enum StageFailure {
    /// Valid response with zero items
    #[error("empty result")]
    Empty,

    /// Source failed
    #[error(transparent)]
    Failed(#[from] SourceError),
}

/// Persistent store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying I/O failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored payload could not be parsed
    #[error("corrupt entry {key}: {reason}")]
    Corrupt {
        /// Store key
        key: String,
        /// Parse failure
        reason: String,
    },

    /// Stored payload does not match its checksum
    #[error("checksum mismatch for {key}")]
    ChecksumMismatch {
        /// Store key
        key: String,
    },
}

impl StoreError {
    /// Create corrupt-entry error
    #[inline]
    pub fn corrupt(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::Corrupt {
            key: key.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_lower_case() {
        assert_eq!(SourceError::Timeout(250).to_string(), "timed out after 250ms");
        assert_eq!(
            StageFailure::from(SourceError::unavailable("offline")).to_string(),
            "source unavailable: offline"
        );
        assert_eq!(
            StoreError::ChecksumMismatch { key: "k".into() }.to_string(),
            "checksum mismatch for k"
        );
    }

    #[test]
    fn json_errors_decode() {
        let err: SourceError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, SourceError::Decode(_)));
        assert!(!err.is_timeout());
    }
}
