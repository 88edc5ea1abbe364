//! Signing protocol driver

use super::{combine, sign_share, verify_share_signature, DsgPartialMessage};
use crate::group::GroupParams;
use crate::keygen::DkgOutput;
use crate::mpc::Relay;
use crate::{AggregateSignature, Error, ParticipantId, Result, SessionConfig, SessionId};
use rand::rngs::OsRng;
use std::collections::BTreeSet;
use tracing::{debug, error, info, instrument};

const PARTIAL_ROUND: u32 = 1;

/// Run one signing session for this participant.
///
/// Every signer broadcasts a partial signature under `session_id`; partials
/// are ordered by party ID, checked against the verification keys announced
/// during DKG and combined.
#[instrument(skip(params, config, output, message, relay), fields(party_id = config.party_id))]
pub async fn run_dsg<R: Relay>(
    params: &GroupParams,
    config: &SessionConfig,
    output: &DkgOutput,
    session_id: &SessionId,
    message: &[u8],
    signers: &[ParticipantId],
    relay: &R,
) -> Result<AggregateSignature> {
    info!(signers = ?signers, digest = %config.digest, "Starting DSG");

    let signer_set: BTreeSet<ParticipantId> = signers.iter().copied().collect();
    if signer_set.len() != signers.len() {
        return Err(Error::InvalidParameters("Duplicate signer".into()));
    }
    if signer_set.len() < config.threshold as usize {
        return Err(Error::ThresholdNotMet {
            required: config.threshold as usize,
            actual: signer_set.len(),
        });
    }
    if !signer_set.contains(&config.party_id) {
        return Err(Error::InvalidPartyId(config.party_id));
    }

    debug!("DSG: broadcasting partial signature");
    let share = sign_share(
        params,
        config.digest,
        message,
        &output.key_share,
        &mut OsRng,
    );
    let partial_msg = DsgPartialMessage {
        party_id: config.party_id,
        share,
    };
    relay
        .broadcast(session_id, PARTIAL_ROUND, &partial_msg)
        .await?;

    let mut partials = relay
        .collect_broadcasts::<DsgPartialMessage>(session_id, PARTIAL_ROUND, signers.len())
        .await?;
    partials.sort_by_key(|msg| msg.party_id);

    let mut seen = BTreeSet::new();
    for partial in &partials {
        if !signer_set.contains(&partial.party_id) || !seen.insert(partial.party_id) {
            return Err(Error::VerificationFailed(format!(
                "Unexpected partial signature from party {}",
                partial.party_id
            )));
        }
        let encoded = output
            .verification_keys
            .get(&partial.party_id)
            .ok_or_else(|| {
                Error::VerificationFailed(format!(
                    "No verification key for party {}",
                    partial.party_id
                ))
            })?;
        let verification_key = params.decode_point(encoded)?;
        if !verify_share_signature(
            params,
            config.digest,
            message,
            &verification_key,
            &partial.share,
        ) {
            error!(from = partial.party_id, "Partial signature failed verification");
            return Err(Error::VerificationFailed(format!(
                "Invalid partial signature from party {}",
                partial.party_id
            )));
        }
    }

    let shares: Vec<_> = partials.into_iter().map(|msg| msg.share).collect();
    let signature = combine(&shares)?;

    info!(
        r = %signature.r,
        s = %signature.s,
        recovery_id = signature.recovery_id,
        "DSG completed successfully"
    );

    Ok(signature)
}
