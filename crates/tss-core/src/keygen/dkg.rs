//! DKG protocol driver

use super::{
    aggregate, generate, verify, CommitmentVector, DkgOutput, DkgRound1Message, DkgRound2Message,
    DkgRound3Message,
};
use crate::group::GroupParams;
use crate::mpc::Relay;
use crate::{Error, Result, SessionConfig};
use rand::rngs::OsRng;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Run distributed key generation for one participant.
///
/// Every participant deals its own polynomial, sends one share to each peer,
/// verifies the `N − 1` shares it receives with the configured
/// [`super::ShareCheck`] and sums them into its key share. A final round
/// publishes each participant's verification key so partial signatures can be
/// checked later.
#[instrument(skip(params, relay), fields(party_id = config.party_id))]
pub async fn run_dkg<R: Relay>(
    params: &GroupParams,
    config: &SessionConfig,
    relay: &R,
) -> Result<DkgOutput> {
    info!(
        participants = config.participants,
        threshold = config.threshold,
        share_check = %config.share_check,
        "Starting DKG"
    );

    if config.participants < 2 {
        return Err(Error::InvalidParameters(
            "DKG needs at least one peer".into(),
        ));
    }
    let session_id = &config.session_id;
    let peer_count = config.participants as usize - 1;

    // Round 1: deal a polynomial and broadcast its commitments
    debug!("DKG Round 1: Commitment");
    let dealer = generate(params, config.threshold, config.participants, &mut OsRng)?;

    let commitment_msg = DkgRound1Message {
        party_id: config.party_id,
        commitments: dealer.commitments.encode(params),
    };
    relay.broadcast(session_id, 1, &commitment_msg).await?;

    let all_commitments = relay
        .collect_broadcasts::<DkgRound1Message>(session_id, 1, config.participants as usize)
        .await?;

    // Round 2: send each peer its share
    debug!("DKG Round 2: Secret sharing");
    for share in dealer.shares.iter().filter(|s| s.recipient != config.party_id) {
        let share_msg = DkgRound2Message {
            from: config.party_id,
            to: share.recipient,
            share: share.clone(),
        };
        relay
            .send_direct(session_id, 2, share.recipient, &share_msg)
            .await?;
    }
    drop(dealer);

    let mut received = relay
        .collect_direct::<DkgRound2Message>(session_id, 2, config.party_id, peer_count)
        .await?;
    received.sort_by_key(|msg| msg.from);
    if received.windows(2).any(|pair| pair[0].from == pair[1].from) {
        return Err(Error::VerificationFailed(
            "Received more than one share from a peer".into(),
        ));
    }

    // Pair every share with its sender's commitments
    let mut shares = Vec::with_capacity(peer_count);
    let mut commitments = Vec::with_capacity(peer_count);
    for msg in received {
        if msg.from == config.party_id || msg.to != config.party_id {
            return Err(Error::VerificationFailed(format!(
                "Unexpected share routed {} -> {}",
                msg.from, msg.to
            )));
        }
        let round1 = all_commitments
            .iter()
            .find(|c| c.party_id == msg.from)
            .ok_or_else(|| {
                Error::VerificationFailed(format!("No commitments from party {}", msg.from))
            })?;
        let commitment = CommitmentVector::decode(params, &round1.commitments)?;
        if commitment.len() != config.threshold as usize {
            return Err(Error::VerificationFailed(format!(
                "Party {} committed to {} coefficients, expected {}",
                msg.from,
                commitment.len(),
                config.threshold
            )));
        }
        commitments.push(commitment);
        shares.push(msg.share);
    }

    // Round 3: verify, aggregate and announce the verification key
    debug!("DKG Round 3: Verification");
    let verified = verify(
        params,
        config.share_check,
        config.party_id,
        shares,
        &commitments,
    )?;
    let key_share = aggregate(params, verified, &mut OsRng)?;

    let announce = DkgRound3Message {
        party_id: config.party_id,
        verification_key: params.encode_point(key_share.verification_key()),
    };
    relay.broadcast(session_id, 3, &announce).await?;

    let announcements = relay
        .collect_broadcasts::<DkgRound3Message>(session_id, 3, config.participants as usize)
        .await?;
    let mut verification_keys = BTreeMap::new();
    for msg in announcements {
        if msg.party_id == 0 || msg.party_id > config.participants {
            return Err(Error::VerificationFailed(format!(
                "Verification key announced by unknown party {}",
                msg.party_id
            )));
        }
        params.decode_point(&msg.verification_key)?;
        if verification_keys
            .insert(msg.party_id, msg.verification_key)
            .is_some()
        {
            return Err(Error::VerificationFailed(format!(
                "Party {} announced more than one verification key",
                msg.party_id
            )));
        }
    }

    info!(
        verification_key = %announce.verification_key,
        "DKG completed successfully"
    );

    Ok(DkgOutput {
        key_share,
        verification_keys,
    })
}
