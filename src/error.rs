// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RefreshError>;

/// Errors raised while fetching, deriving and reconciling country data
#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("{source_name} request timed out")]
    UpstreamTimeout { source_name: &'static str },

    #[error("Failed to fetch {source_name}: {message}")]
    UpstreamUnavailable {
        source_name: &'static str,
        message: String,
    },

    #[error("Invalid {source_name} response: {message}")]
    UpstreamInvalidResponse {
        source_name: &'static str,
        message: String,
    },

    #[error("Country already exists: {0}")]
    DuplicateKey(String),

    #[error("Could not process country {name}: {reason}")]
    RecordProcessing { name: String, reason: String },

    #[error("{0} not found")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RefreshError {
    /// Whether this error came from one of the external sources and should be
    /// reported as the data source being unavailable.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            RefreshError::UpstreamTimeout { .. }
                | RefreshError::UpstreamUnavailable { .. }
                | RefreshError::UpstreamInvalidResponse { .. }
        )
    }

    pub fn source_name(&self) -> Option<&'static str> {
        match self {
            RefreshError::UpstreamTimeout { source_name }
            | RefreshError::UpstreamUnavailable { source_name, .. }
            | RefreshError::UpstreamInvalidResponse { source_name, .. } => Some(source_name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_classification() {
        let timeout = RefreshError::UpstreamTimeout {
            source_name: "Exchange Rates API",
        };
        assert!(timeout.is_upstream());
        assert_eq!(timeout.source_name(), Some("Exchange Rates API"));
        assert_eq!(timeout.to_string(), "Exchange Rates API request timed out");

        let missing = RefreshError::NotFound("Country".to_string());
        assert!(!missing.is_upstream());
        assert_eq!(missing.source_name(), None);
        assert_eq!(missing.to_string(), "Country not found");
    }
}
