//! Page state definitions for classifying crawl outcomes
//!
//! Every task the scheduler admits ends in exactly one of these states.
use crate::FetchError;
use std::fmt;

/// Represents how the fetch of a single page ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageState {
    // ===== Terminal Success States =====
    /// Page was fetched and its links were extracted
    Fetched,

    // ===== Terminal Error States =====
    /// URL could not be turned into a request
    InvalidUrl,

    /// Page could not be reached (connection refused, DNS failure, request timeout)
    Unreachable,

    /// Page answered with a non-2xx status
    HttpError,

    /// Body could not be read or decoded
    Undecodable,

    /// Worker task panicked before reporting a result
    WorkerFailed,

    // ===== Special States =====
    /// Fetch was aborted because the run was cancelled
    Cancelled,
}

impl PageState {
    /// All states, in display order
    pub const ALL: [PageState; 7] = [
        Self::Fetched,
        Self::InvalidUrl,
        Self::Unreachable,
        Self::HttpError,
        Self::Undecodable,
        Self::WorkerFailed,
        Self::Cancelled,
    ];

    /// Classifies the outcome of a fetch attempt
    pub fn from_outcome(outcome: &Result<(), FetchError>) -> Self {
        match outcome {
            Ok(()) => Self::Fetched,
            Err(FetchError::InvalidUrl { .. }) => Self::InvalidUrl,
            Err(FetchError::Transport { .. }) => Self::Unreachable,
            Err(FetchError::Status { .. }) => Self::HttpError,
            Err(FetchError::Body { .. }) => Self::Undecodable,
            Err(FetchError::Cancelled { .. }) => Self::Cancelled,
        }
    }

    /// Returns true if this represents a successful fetch
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Fetched)
    }

    /// Returns true if the page itself (or its worker) was broken
    ///
    /// Cancellation is not an error: the page may be perfectly fine, the run
    /// simply ran out of time.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidUrl
                | Self::Unreachable
                | Self::HttpError
                | Self::Undecodable
                | Self::WorkerFailed
        )
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Fetched => "Fetched",
            Self::InvalidUrl => "Invalid URL",
            Self::Unreachable => "Unreachable",
            Self::HttpError => "HTTP Error",
            Self::Undecodable => "Undecodable",
            Self::WorkerFailed => "Worker Failed",
            Self::Cancelled => "Cancelled",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_outcome() {
        assert_eq!(PageState::from_outcome(&Ok(())), PageState::Fetched);

        let err = FetchError::Status {
            url: "https://example.com/".to_string(),
            status: 404,
        };
        assert_eq!(PageState::from_outcome(&Err(err)), PageState::HttpError);

        let err = FetchError::Transport {
            url: "https://example.com/".to_string(),
            reason: "connection refused".to_string(),
        };
        assert_eq!(PageState::from_outcome(&Err(err)), PageState::Unreachable);

        let err = FetchError::Cancelled {
            url: "https://example.com/".to_string(),
        };
        assert_eq!(PageState::from_outcome(&Err(err)), PageState::Cancelled);
    }

    #[test]
    fn test_cancelled_is_not_an_error() {
        assert!(!PageState::Cancelled.is_error());
        assert!(!PageState::Cancelled.is_success());
    }

    #[test]
    fn test_error_states() {
        let errors: Vec<_> = PageState::ALL.iter().filter(|s| s.is_error()).collect();
        assert_eq!(errors.len(), 5);
        assert!(!PageState::Fetched.is_error());
        assert!(PageState::WorkerFailed.is_error());
    }

    #[test]
    fn test_display() {
        assert_eq!(PageState::HttpError.to_string(), "HTTP Error");
        assert_eq!(PageState::Fetched.to_string(), "Fetched");
    }
}
