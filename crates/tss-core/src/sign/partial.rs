//! Per-participant signature shares

use crate::group::GroupParams;
use crate::hash::MessageDigest;
use crate::{KeyShare, SignatureShare};
use k256::{elliptic_curve::Field, ProjectivePoint, Scalar};
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

/// Produce this participant's partial signature over `message`.
///
/// A fresh nonce k is drawn from `rng` on every call and wiped before
/// returning; `r = x(k·G) mod n`, `s = k⁻¹(H(m) + r·x) mod n`.
pub fn sign_share<R: RngCore + CryptoRng>(
    params: &GroupParams,
    digest: MessageDigest,
    message: &[u8],
    key_share: &KeyShare,
    rng: &mut R,
) -> SignatureShare {
    let h = digest.hash_to_scalar(message);

    loop {
        let mut k = Scalar::random(&mut *rng);
        let k_inv = Option::<Scalar>::from(k.invert());
        let r = params.x_scalar(&params.mul_generator(&k));
        k.zeroize();

        let Some(mut k_inv) = k_inv else { continue };
        let s = k_inv * (h + r * key_share.secret_share());
        k_inv.zeroize();

        // degenerate nonces are redrawn
        if r == Scalar::ZERO || s == Scalar::ZERO {
            continue;
        }
        return SignatureShare { r, s };
    }
}

/// Check a partial signature against its signer's verification key.
///
/// Each share is an ordinary ECDSA signature under `verification_key`.
pub fn verify_share_signature(
    params: &GroupParams,
    digest: MessageDigest,
    message: &[u8],
    verification_key: &ProjectivePoint,
    share: &SignatureShare,
) -> bool {
    if share.r == Scalar::ZERO || share.s == Scalar::ZERO {
        return false;
    }
    let Some(s_inv) = Option::<Scalar>::from(share.s.invert()) else {
        return false;
    };

    let h = digest.hash_to_scalar(message);
    let point = params.mul_generator(&(h * s_inv)) + *verification_key * (share.r * s_inv);
    if point == ProjectivePoint::IDENTITY {
        return false;
    }

    params.x_scalar(&point) == share.r
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    const MESSAGE: &[u8] = b"Hello, Threshold Signature!";

    fn key_share() -> KeyShare {
        let params = GroupParams::secp256k1();
        let secret = Scalar::random(&mut OsRng);
        KeyShare::new(1, secret, params.mul_generator(&secret), [0u8; 32])
    }

    #[test]
    fn test_share_is_valid_ecdsa_under_verification_key() {
        let params = GroupParams::secp256k1();
        let key_share = key_share();

        for digest in [MessageDigest::Keccak256, MessageDigest::Sha256] {
            let share = sign_share(&params, digest, MESSAGE, &key_share, &mut OsRng);
            assert!(verify_share_signature(
                &params,
                digest,
                MESSAGE,
                key_share.verification_key(),
                &share
            ));
        }
    }

    #[test]
    fn test_share_equation_holds() {
        let params = GroupParams::secp256k1();
        let key_share = key_share();
        let share = sign_share(
            &params,
            MessageDigest::Keccak256,
            MESSAGE,
            &key_share,
            &mut OsRng,
        );

        // k = s⁻¹(H(m) + r·x) and x(k·G) = r
        let h = MessageDigest::Keccak256.hash_to_scalar(MESSAGE);
        let s_inv = Option::<Scalar>::from(share.s.invert()).unwrap();
        let k = s_inv * (h + share.r * key_share.secret_share());
        assert_eq!(params.x_scalar(&params.mul_generator(&k)), share.r);
    }

    #[test]
    fn test_nonces_are_fresh() {
        let params = GroupParams::secp256k1();
        let key_share = key_share();
        let mut rng = ChaCha20Rng::seed_from_u64(5);

        let a = sign_share(&params, MessageDigest::Keccak256, MESSAGE, &key_share, &mut rng);
        let b = sign_share(&params, MessageDigest::Keccak256, MESSAGE, &key_share, &mut rng);
        assert_ne!(a.r, b.r);
        assert_ne!(a.s, b.s);
    }

    #[test]
    fn test_rejects_wrong_key_message_or_digest() {
        let params = GroupParams::secp256k1();
        let key_share = key_share();
        let other = self::key_share();
        let share = sign_share(
            &params,
            MessageDigest::Keccak256,
            MESSAGE,
            &key_share,
            &mut OsRng,
        );
        let vk = key_share.verification_key();

        assert!(!verify_share_signature(
            &params,
            MessageDigest::Keccak256,
            MESSAGE,
            other.verification_key(),
            &share
        ));
        assert!(!verify_share_signature(
            &params,
            MessageDigest::Keccak256,
            b"another message",
            vk,
            &share
        ));
        assert!(!verify_share_signature(
            &params,
            MessageDigest::Sha256,
            MESSAGE,
            vk,
            &share
        ));

        let zero_s = SignatureShare {
            r: share.r,
            s: Scalar::ZERO,
        };
        assert!(!verify_share_signature(
            &params,
            MessageDigest::Keccak256,
            MESSAGE,
            vk,
            &zero_s
        ));
    }
}
