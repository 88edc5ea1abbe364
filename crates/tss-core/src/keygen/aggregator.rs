//! Folding verified shares into a participant's key share

use super::VerifiedShares;
use crate::group::GroupParams;
use crate::{Error, KeyShare, Result};
use k256::Scalar;
use rand_core::{CryptoRng, RngCore};

/// Sum the verified shares into this participant's private key share.
///
/// The verification key is the local image `key_share·G`; the chain code is
/// drawn fresh from `rng` and is not bound to any protocol transcript.
pub fn aggregate<R: RngCore + CryptoRng>(
    params: &GroupParams,
    verified: VerifiedShares,
    rng: &mut R,
) -> Result<KeyShare> {
    if verified.is_empty() {
        return Err(Error::InvalidParameters(
            "Cannot aggregate an empty share batch".into(),
        ));
    }

    let secret_share = verified
        .shares()
        .iter()
        .fold(Scalar::ZERO, |acc, share| acc + share.value);
    let verification_key = params.mul_generator(&secret_share);

    let mut chain_code = [0u8; 32];
    rng.fill_bytes(&mut chain_code);

    Ok(KeyShare::new(
        verified.recipient(),
        secret_share,
        verification_key,
        chain_code,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Share;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn shares(values: &[u64]) -> Vec<Share> {
        values
            .iter()
            .map(|v| Share {
                recipient: 2,
                value: Scalar::from(*v),
            })
            .collect()
    }

    #[test]
    fn test_aggregate_sums_values() {
        let params = GroupParams::secp256k1();
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let verified = VerifiedShares::unchecked(2, shares(&[3, 4, 5]));

        let key_share = aggregate(&params, verified, &mut rng).unwrap();
        assert_eq!(key_share.party_id(), 2);
        assert_eq!(*key_share.secret_share(), Scalar::from(12u64));
        assert!(params.points_equal(
            key_share.verification_key(),
            &params.mul_generator(&Scalar::from(12u64))
        ));
    }

    #[test]
    fn test_aggregate_reduces_mod_n() {
        let params = GroupParams::secp256k1();
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let minus_one = Share {
            recipient: 1,
            value: -Scalar::ONE,
        };
        let two = Share {
            recipient: 1,
            value: Scalar::from(2u64),
        };

        let verified = VerifiedShares::unchecked(1, vec![minus_one, two]);
        let key_share = aggregate(&params, verified, &mut rng).unwrap();
        assert_eq!(*key_share.secret_share(), Scalar::ONE);
    }

    #[test]
    fn test_aggregate_rejects_empty_batch() {
        let params = GroupParams::secp256k1();
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let verified = VerifiedShares::unchecked(1, Vec::new());

        assert!(matches!(
            aggregate(&params, verified, &mut rng),
            Err(Error::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_chain_code_is_fresh() {
        let params = GroupParams::secp256k1();
        let mut rng = ChaCha20Rng::seed_from_u64(4);

        let a = aggregate(&params, VerifiedShares::unchecked(1, shares(&[1])), &mut rng).unwrap();
        let b = aggregate(&params, VerifiedShares::unchecked(1, shares(&[1])), &mut rng).unwrap();
        assert_eq!(a.secret_share(), b.secret_share());
        assert_ne!(a.chain_code(), b.chain_code());
    }
}
