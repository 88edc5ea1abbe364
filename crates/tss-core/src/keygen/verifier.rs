//! Verification of received shares against commitment data

use super::CommitmentVector;
use crate::group::GroupParams;
use crate::{Error, ParticipantId, Result, Share};
use k256::{ProjectivePoint, Scalar};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use tracing::{debug, error};

/// Algorithm used to check a share against commitments
///
/// The two checks are not interchangeable. `Interpolated` combines the
/// constant-term commitments of *different* senders with Lagrange weights taken
/// at the receiver's index, and accepts a share only if its curve image equals
/// that single point. `Feldman` checks each share against its own sender's full
/// commitment vector evaluated at the receiver's index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareCheck {
    /// Cross-sender interpolation of constant-term commitments
    Interpolated,
    /// Per-sender `value·G == Σⱼ Cⱼ·xʲ`
    #[default]
    Feldman,
}

impl fmt::Display for ShareCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShareCheck::Interpolated => f.write_str("interpolated"),
            ShareCheck::Feldman => f.write_str("feldman"),
        }
    }
}

impl FromStr for ShareCheck {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "interpolated" => Ok(ShareCheck::Interpolated),
            "feldman" => Ok(ShareCheck::Feldman),
            other => Err(Error::InvalidParameters(format!(
                "unknown share check: {}",
                other
            ))),
        }
    }
}

/// Shares that passed [`verify`]; the only input [`super::aggregate`] accepts
#[derive(Debug)]
pub struct VerifiedShares {
    recipient: ParticipantId,
    shares: Vec<Share>,
}

impl VerifiedShares {
    /// Participant the shares are addressed to
    pub fn recipient(&self) -> ParticipantId {
        self.recipient
    }

    /// Number of verified shares
    pub fn len(&self) -> usize {
        self.shares.len()
    }

    /// True if no shares were verified
    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    pub(crate) fn shares(&self) -> &[Share] {
        &self.shares
    }

    #[cfg(test)]
    pub(crate) fn unchecked(recipient: ParticipantId, shares: Vec<Share>) -> Self {
        Self { recipient, shares }
    }
}

/// Verify every share addressed to `node_id`.
///
/// `commitments[i]` is the commitment vector of the sender of `shares[i]`.
/// The batch is all-or-nothing: the first failing share aborts with
/// [`Error::ShareVerificationFailed`].
pub fn verify(
    params: &GroupParams,
    check: ShareCheck,
    node_id: ParticipantId,
    shares: Vec<Share>,
    commitments: &[CommitmentVector],
) -> Result<VerifiedShares> {
    if node_id == 0 {
        return Err(Error::InvalidParameters(
            "Participant indices start at 1".into(),
        ));
    }
    if shares.is_empty() {
        return Err(Error::InvalidParameters("Empty share batch".into()));
    }
    if let Some(share) = shares.iter().find(|share| share.recipient != node_id) {
        return Err(Error::InvalidParameters(format!(
            "Share for participant {} delivered to participant {}",
            share.recipient, node_id
        )));
    }

    match check {
        ShareCheck::Interpolated => {
            let expected = interpolate_constant_terms(node_id, commitments)?;
            for (slot, share) in shares.iter().enumerate() {
                check_share(params, node_id, slot, share, &expected)?;
            }
        }
        ShareCheck::Feldman => {
            if commitments.len() != shares.len() {
                return Err(Error::InvalidParameters(format!(
                    "{} shares but {} commitment vectors",
                    shares.len(),
                    commitments.len()
                )));
            }
            for (slot, (share, commitment)) in shares.iter().zip(commitments).enumerate() {
                let expected = commitment.evaluate_at(share.recipient);
                check_share(params, node_id, slot, share, &expected)?;
            }
        }
    }

    debug!(node_id, count = shares.len(), check = %check, "Shares verified");

    Ok(VerifiedShares {
        recipient: node_id,
        shares,
    })
}

fn check_share(
    params: &GroupParams,
    node_id: ParticipantId,
    slot: usize,
    share: &Share,
    expected: &ProjectivePoint,
) -> Result<()> {
    let share_point = params.mul_generator(&share.value);
    if params.points_equal(&share_point, expected) {
        return Ok(());
    }

    let share_point = params.encode_point(&share_point);
    let expected_point = params.encode_point(expected);
    error!(
        node_id,
        slot,
        share_point = %share_point,
        expected_point = %expected_point,
        "Share verification failed"
    );
    Err(Error::ShareVerificationFailed {
        recipient: node_id,
        slot,
        share_point,
        expected_point,
    })
}

/// `Σⱼ λⱼ(node_id)·C₀⁽ʲ⁾` over sender slots `1..=k`
fn interpolate_constant_terms(
    node_id: ParticipantId,
    commitments: &[CommitmentVector],
) -> Result<ProjectivePoint> {
    if commitments.is_empty() {
        return Err(Error::InvalidParameters("No commitments supplied".into()));
    }

    let x = Scalar::from(u64::from(node_id));
    let mut expected = ProjectivePoint::IDENTITY;
    for (slot, commitment) in commitments.iter().enumerate() {
        let weight = lagrange_weight(slot, commitments.len(), &x)?;
        expected += commitment.constant_term() * weight;
    }

    Ok(expected)
}

/// Lagrange basis polynomial for `slot` over nodes `1..=slots`, evaluated at `x`
fn lagrange_weight(slot: usize, slots: usize, x: &Scalar) -> Result<Scalar> {
    let x_j = Scalar::from((slot + 1) as u64);
    let mut weight = Scalar::ONE;

    for m in (0..slots).filter(|m| *m != slot) {
        let x_m = Scalar::from((m + 1) as u64);
        let denominator = Option::<Scalar>::from((x_j - x_m).invert())
            .ok_or_else(|| Error::InvalidParameters("Duplicate interpolation node".into()))?;
        weight *= (*x - x_m) * denominator;
    }

    Ok(weight)
}
