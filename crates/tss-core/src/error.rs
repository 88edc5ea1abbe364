//! Error types for threshold key generation and signing

use crate::ParticipantId;
use thiserror::Error;

/// Result type alias for threshold operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during key generation, signing or relay transport
#[derive(Debug, Error)]
pub enum Error {
    /// Threshold, participant count or share batch is unusable
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// A received share does not match the commitment data
    #[error(
        "Share verification failed for participant {recipient} (slot {slot}): \
         share point {share_point} != expected {expected_point}"
    )]
    ShareVerificationFailed {
        recipient: ParticipantId,
        slot: usize,
        share_point: String,
        expected_point: String,
    },

    /// Malformed point or scalar encoding supplied by a peer
    #[error("Decoding failed: {0}")]
    DecodingFailed(String),

    /// Threshold requirements not met
    #[error("Threshold not met: required {required}, got {actual}")]
    ThresholdNotMet { required: usize, actual: usize },

    /// Invalid party ID
    #[error("Invalid party ID: {0}")]
    InvalidPartyId(ParticipantId),

    /// A peer message failed a consistency check
    #[error("Message verification failed: {0}")]
    VerificationFailed(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Network/relay error
    #[error("Relay error: {0}")]
    Relay(String),

    /// Timeout waiting for message
    #[error("Timeout waiting for {0}")]
    Timeout(String),

    /// Key derivation error
    #[error("Key derivation error: {0}")]
    Derivation(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
