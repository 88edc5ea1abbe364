//! Combination of partial signatures

use crate::group::encode_scalar;
use crate::{AggregateSignature, Error, Result, SignatureShare, RECOVERY_ID};
use k256::Scalar;

/// Merge partial signatures into a single `(r, s, v)` triple.
///
/// `r` is taken from the first share as-is and is not compared against the
/// others; `s` is the sum of every share's `s` mod n.
pub fn combine(shares: &[SignatureShare]) -> Result<AggregateSignature> {
    let first = shares
        .first()
        .ok_or_else(|| Error::InvalidParameters("No signature shares to combine".into()))?;

    let s = shares
        .iter()
        .fold(Scalar::ZERO, |acc, share| acc + share.s);

    Ok(AggregateSignature {
        r: encode_scalar(&first.r),
        s: encode_scalar(&s),
        recovery_id: RECOVERY_ID,
    })
}
