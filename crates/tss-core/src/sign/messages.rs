//! Signing message types

use crate::{ParticipantId, SignatureShare};
use serde::{Deserialize, Serialize};

/// Partial signature broadcast by one signer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DsgPartialMessage {
    /// Sender party ID
    pub party_id: ParticipantId,
    /// Sender's signature share
    pub share: SignatureShare,
}
