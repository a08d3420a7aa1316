//! Error types for the conversation crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `StorageError`: Errors from the durable key-value backend
//! - `StoreError`: Errors from conversation store write-through

use std::fmt;

/// Errors from durable key-value storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The storage location could not be prepared.
    Unavailable { location: String, reason: String },
    /// Reading a key failed.
    ReadFailed { key: String, reason: String },
    /// Writing a key failed.
    WriteFailed { key: String, reason: String },
    /// Removing a key failed.
    RemoveFailed { key: String, reason: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { location, reason } => {
                write!(f, "storage at '{location}' unavailable: {reason}")
            }
            Self::ReadFailed { key, reason } => {
                write!(f, "failed to read '{key}': {reason}")
            }
            Self::WriteFailed { key, reason } => {
                write!(f, "failed to write '{key}': {reason}")
            }
            Self::RemoveFailed { key, reason } => {
                write!(f, "failed to remove '{key}': {reason}")
            }
        }
    }
}

impl std::error::Error for StorageError {}

/// Errors from conversation store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The collection could not be encoded for storage.
    EncodeFailed { reason: String },
    /// The durable write backing a mutation failed.
    PersistFailed { key: String, reason: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EncodeFailed { reason } => {
                write!(f, "failed to encode conversations: {reason}")
            }
            Self::PersistFailed { key, reason } => {
                write!(f, "failed to persist '{key}': {reason}")
            }
        }
    }
}

impl std::error::Error for StoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_error_display() {
        let err = StorageError::WriteFailed {
            key: "conversations".to_string(),
            reason: "disk full".to_string(),
        };
        assert!(err.to_string().contains("conversations"));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn store_error_display() {
        let err = StoreError::PersistFailed {
            key: "active-conversation".to_string(),
            reason: "permission denied".to_string(),
        };
        assert!(err.to_string().contains("active-conversation"));
    }
}
