//! Distributed Key Generation (DKG) module
//!
//! Shamir sharing with Feldman commitments: every participant deals a random
//! polynomial ([`generate`]), checks the shares it receives ([`verify`]) and
//! folds them into its key share ([`aggregate`]). [`run_dkg`] drives the three
//! steps over a [`crate::mpc::Relay`].

mod aggregator;
mod dkg;
mod messages;
mod sharer;
mod verifier;

pub use aggregator::aggregate;
pub use dkg::run_dkg;
pub use messages::*;
pub use sharer::{generate, CommitmentVector, DealerOutput};
pub use verifier::{verify, ShareCheck, VerifiedShares};

pub(crate) use sharer::validate_threshold;

use crate::{KeyShare, ParticipantId};
use std::collections::BTreeMap;

/// Result of a completed DKG round
#[derive(Debug)]
pub struct DkgOutput {
    /// This participant's key share
    pub key_share: KeyShare,
    /// Verification keys announced by every participant, hex-encoded
    pub verification_keys: BTreeMap<ParticipantId, String>,
}
