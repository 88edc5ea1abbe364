//! DKG message types

use crate::{ParticipantId, Share};
use serde::{Deserialize, Serialize};

/// Round 1 message: Feldman commitments to the sender's polynomial
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DkgRound1Message {
    /// Sender party ID
    pub party_id: ParticipantId,
    /// Hex-encoded commitment points, in coefficient order
    pub commitments: Vec<String>,
}

/// Round 2 message: Secret share
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DkgRound2Message {
    /// Sender party ID
    pub from: ParticipantId,
    /// Receiver party ID
    pub to: ParticipantId,
    /// Share of the sender's polynomial at the receiver's index
    pub share: Share,
}

/// Round 3 message: Completion announcement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DkgRound3Message {
    /// Sender party ID
    pub party_id: ParticipantId,
    /// Hex-encoded local verification key
    pub verification_key: String,
}
