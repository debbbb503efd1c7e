//! Error types for the threshold protocol core

use crate::types::ValidatorId;
use thiserror::Error;

/// Result type alias for threshold protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving key generation or signing
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid protocol configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Message does not have the expected shape
    #[error("Unexpected message shape: {0}")]
    MalformedMessage(String),

    /// A commitment was already recorded for this sender
    #[error("Double commit from validator {0}")]
    DoubleCommit(ValidatorId),

    /// A value from this sender was already recorded for this proposer
    #[error("Value from validator {sender} for proposer {proposer} already handled")]
    DuplicateValue {
        proposer: ValidatorId,
        sender: ValidatorId,
    },

    /// A value arrived before the proposer's commitment
    #[error("No commitment recorded for proposer {0}")]
    MissingCommitment(ValidatorId),

    /// Decrypted row is inconsistent with the sender's commitment
    #[error("Commitment from validator {0} does not match its row")]
    CommitmentMismatch(ValidatorId),

    /// Decrypted value is inconsistent with the proposer's commitment
    #[error("Value from validator {sender} does not match commitment of proposer {proposer}")]
    ValueMismatch {
        proposer: ValidatorId,
        sender: ValidatorId,
    },

    /// Envelope decryption failed
    #[error("Envelope decryption failed")]
    Decryption,

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Threshold requirements not met
    #[error("Threshold not met: required {required}, got {actual}")]
    ThresholdNotMet { required: usize, actual: usize },

    /// No session registered for this epoch
    #[error("No session registered for epoch {0}")]
    UnknownEpoch(u64),

    /// Internal invariant violation, indicates a logic defect
    #[error("Internal invariant violated: {0}")]
    InternalInvariant(String),
}

impl Error {
    /// True for conditions that indicate a bug in this crate rather than
    /// adversarial input. These must never be retried or masked.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::InternalInvariant(_))
    }

    /// True for conditions caused by an inconsistent or forged share. The
    /// outer fault-handling layer should penalize the sending validator;
    /// the session itself keeps running.
    pub fn is_byzantine(&self) -> bool {
        matches!(
            self,
            Error::CommitmentMismatch(_) | Error::ValueMismatch { .. } | Error::Decryption
        )
    }
}
