//! Core types shared by key generation, signing and the protocol drivers

use crate::group::{decode_scalar, GroupParams};
use crate::hash::MessageDigest;
use crate::keygen::{validate_threshold, ShareCheck};
use crate::{Error, Result};
use k256::{
    elliptic_curve::{bigint::U256, ops::Reduce, sec1::ToEncodedPoint},
    ProjectivePoint, Scalar,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// 1-based index of a participant; shares are evaluations at this index
pub type ParticipantId = u32;

/// Unique identifier for a session
pub type SessionId = [u8; 32];

/// Recovery identifier attached to every combined signature
pub const RECOVERY_ID: u8 = 27;

/// One evaluation of a dealer polynomial, addressed to `recipient`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    /// Index the polynomial was evaluated at
    pub recipient: ParticipantId,
    /// f(recipient) mod n
    #[serde(with = "scalar_hex")]
    pub value: Scalar,
}

impl fmt::Debug for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Share")
            .field("recipient", &self.recipient)
            .field("value", &"<redacted>")
            .finish()
    }
}

/// Partial signature produced by a single key-share holder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureShare {
    /// x-coordinate of k·G, reduced mod n
    #[serde(with = "scalar_hex")]
    pub r: Scalar,
    /// k⁻¹(H(m) + r·x) mod n
    #[serde(with = "scalar_hex")]
    pub s: Scalar,
}

/// Combined signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateSignature {
    /// R component (hex)
    pub r: String,
    /// S component (hex)
    pub s: String,
    /// Recovery ID
    pub recovery_id: u8,
}

impl AggregateSignature {
    /// Convert to bytes (r || s || v)
    pub fn to_bytes(&self) -> Result<[u8; 65]> {
        let r = decode_scalar(&self.r)?;
        let s = decode_scalar(&self.s)?;

        let mut bytes = [0u8; 65];
        bytes[..32].copy_from_slice(&r.to_bytes());
        bytes[32..64].copy_from_slice(&s.to_bytes());
        bytes[64] = self.recovery_id;
        Ok(bytes)
    }
}

/// Serde adapter encoding scalars as 64-character hex strings
pub mod scalar_hex {
    use crate::group::{decode_scalar, encode_scalar};
    use k256::Scalar;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(scalar: &Scalar, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&encode_scalar(scalar))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Scalar, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        decode_scalar(&encoded).map_err(serde::de::Error::custom)
    }
}

/// Private key share held by a participant after DKG
///
/// The secret scalar is wiped on drop and the type is deliberately not
/// serializable: key material never leaves the participant.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyShare {
    #[zeroize(skip)]
    party_id: ParticipantId,

    secret_share: Scalar,

    #[zeroize(skip)]
    verification_key: ProjectivePoint,

    chain_code: [u8; 32],
}

impl KeyShare {
    pub(crate) fn new(
        party_id: ParticipantId,
        secret_share: Scalar,
        verification_key: ProjectivePoint,
        chain_code: [u8; 32],
    ) -> Self {
        Self {
            party_id,
            secret_share,
            verification_key,
            chain_code,
        }
    }

    /// Index of the participant owning this share
    pub fn party_id(&self) -> ParticipantId {
        self.party_id
    }

    /// Secret scalar; must never be transmitted
    pub fn secret_share(&self) -> &Scalar {
        &self.secret_share
    }

    /// Local verification key `secret_share·G`
    pub fn verification_key(&self) -> &ProjectivePoint {
        &self.verification_key
    }

    /// Chain code for BIP32-style derivation
    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    /// Derive a child key share using non-hardened BIP32 derivation
    pub fn derive_child(&self, params: &GroupParams, path: &str) -> Result<KeyShare> {
        use derivation_path::{ChildIndex, DerivationPath};

        let derivation_path: DerivationPath = path
            .parse()
            .map_err(|e| Error::Derivation(format!("Invalid path: {}", e)))?;

        let mut current = self.clone();
        for child_index in derivation_path.path() {
            let index = match child_index {
                ChildIndex::Normal(idx) => *idx,
                ChildIndex::Hardened(_) => {
                    return Err(Error::Derivation(
                        "Hardened derivation not supported in threshold setting".into(),
                    ));
                }
            };
            current = derive_non_hardened(params, &current, index)?;
        }

        Ok(current)
    }
}

impl fmt::Debug for KeyShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyShare")
            .field("party_id", &self.party_id)
            .field("secret_share", &"<redacted>")
            .field("verification_key", &self.verification_key)
            .finish()
    }
}

/// Derive non-hardened child key
fn derive_non_hardened(params: &GroupParams, parent: &KeyShare, index: u32) -> Result<KeyShare> {
    use hmac::{Hmac, Mac};
    use sha2::Sha512;

    // HMAC-SHA512(chain_code, compressed_key || index)
    let mut hmac = Hmac::<Sha512>::new_from_slice(&parent.chain_code)
        .map_err(|e| Error::Derivation(e.to_string()))?;
    let public_key = parent.verification_key.to_affine().to_encoded_point(true);
    hmac.update(public_key.as_bytes());
    hmac.update(&index.to_be_bytes());

    let result = hmac.finalize().into_bytes();

    let mut tweak_bytes = [0u8; 32];
    tweak_bytes.copy_from_slice(&result[..32]);
    let tweak = <Scalar as Reduce<U256>>::reduce_bytes(&tweak_bytes.into());
    let mut chain_code = [0u8; 32];
    chain_code.copy_from_slice(&result[32..]);
    tweak_bytes.zeroize();

    Ok(KeyShare::new(
        parent.party_id,
        parent.secret_share + tweak,
        parent.verification_key + params.mul_generator(&tweak),
        chain_code,
    ))
}

/// Configuration for DKG/signing sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session identifier shared by all participants
    pub session_id: SessionId,

    /// Polynomial degree + 1
    pub threshold: u32,

    /// Number of participants
    pub participants: u32,

    /// This party's index (1-based)
    pub party_id: ParticipantId,

    /// Verification algorithm applied to received shares
    pub share_check: ShareCheck,

    /// Message digest used when signing
    pub digest: MessageDigest,
}

impl SessionConfig {
    /// Create a new session configuration
    pub fn new(
        session_id: SessionId,
        threshold: u32,
        participants: u32,
        party_id: ParticipantId,
    ) -> Result<Self> {
        validate_threshold(threshold, participants)?;
        if party_id == 0 || party_id > participants {
            return Err(Error::InvalidPartyId(party_id));
        }

        Ok(Self {
            session_id,
            threshold,
            participants,
            party_id,
            share_check: ShareCheck::default(),
            digest: MessageDigest::default(),
        })
    }

    /// Select the share verification algorithm
    pub fn with_share_check(mut self, share_check: ShareCheck) -> Self {
        self.share_check = share_check;
        self
    }

    /// Select the message digest
    pub fn with_digest(mut self, digest: MessageDigest) -> Self {
        self.digest = digest;
        self
    }

    /// Every participant except this one, in index order
    pub fn peers(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        (1..=self.participants).filter(move |id| *id != self.party_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::encode_scalar;
    use k256::elliptic_curve::Field;
    use rand::rngs::OsRng;

    fn key_share(party_id: ParticipantId) -> KeyShare {
        let params = GroupParams::secp256k1();
        let secret = Scalar::random(&mut OsRng);
        KeyShare::new(party_id, secret, params.mul_generator(&secret), [7u8; 32])
    }

    #[test]
    fn test_session_config_validation() {
        let id = [1u8; 32];
        assert!(SessionConfig::new(id, 2, 3, 1).is_ok());
        assert!(SessionConfig::new(id, 1, 1, 1).is_ok());
        assert!(matches!(
            SessionConfig::new(id, 0, 3, 1),
            Err(Error::InvalidParameters(_))
        ));
        assert!(matches!(
            SessionConfig::new(id, 4, 3, 1),
            Err(Error::InvalidParameters(_))
        ));
        assert!(matches!(
            SessionConfig::new(id, 2, 3, 0),
            Err(Error::InvalidPartyId(0))
        ));
        assert!(matches!(
            SessionConfig::new(id, 2, 3, 4),
            Err(Error::InvalidPartyId(4))
        ));
    }

    #[test]
    fn test_peers_skip_self() {
        let config = SessionConfig::new([0u8; 32], 2, 4, 2).unwrap();
        assert_eq!(config.peers().collect::<Vec<_>>(), vec![1, 3, 4]);
    }

    #[test]
    fn test_share_serde_uses_hex() {
        let share = Share {
            recipient: 3,
            value: Scalar::from(255u64),
        };
        let json = serde_json::to_string(&share).unwrap();
        assert_eq!(
            json,
            format!(r#"{{"recipient":3,"value":"{}ff"}}"#, "0".repeat(62))
        );

        let decoded: Share = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, share);
        assert!(!format!("{:?}", share).contains("ff"));
    }

    #[test]
    fn test_aggregate_signature_bytes() {
        let signature = AggregateSignature {
            r: encode_scalar(&Scalar::from(1u64)),
            s: encode_scalar(&Scalar::from(2u64)),
            recovery_id: RECOVERY_ID,
        };
        let bytes = signature.to_bytes().unwrap();
        assert_eq!(bytes[31], 1);
        assert_eq!(bytes[63], 2);
        assert_eq!(bytes[64], 27);

        let malformed = AggregateSignature {
            r: "zz".into(),
            ..signature
        };
        assert!(matches!(malformed.to_bytes(), Err(Error::DecodingFailed(_))));
    }

    #[test]
    fn test_derive_child_keeps_key_pair_consistent() {
        let params = GroupParams::secp256k1();
        let parent = key_share(1);

        let child = parent.derive_child(&params, "m/0/1/42").unwrap();
        assert_ne!(child.secret_share(), parent.secret_share());
        assert_ne!(child.chain_code(), parent.chain_code());
        assert!(params.points_equal(
            child.verification_key(),
            &params.mul_generator(child.secret_share())
        ));

        let again = parent.derive_child(&params, "m/0/1/42").unwrap();
        assert_eq!(again.secret_share(), child.secret_share());
    }

    #[test]
    fn test_derive_child_tweaks_by_hmac_of_compressed_key() {
        use hmac::{Hmac, Mac};
        use sha2::Sha512;

        let params = GroupParams::secp256k1();
        let parent = key_share(3);
        let child = parent.derive_child(&params, "m/7").unwrap();

        let mut mac = Hmac::<Sha512>::new_from_slice(parent.chain_code()).unwrap();
        mac.update(&hex::decode(params.encode_point(parent.verification_key())).unwrap());
        mac.update(&7u32.to_be_bytes());
        let digest = mac.finalize().into_bytes();

        let mut tweak = [0u8; 32];
        tweak.copy_from_slice(&digest[..32]);
        let tweak = <Scalar as Reduce<U256>>::reduce_bytes(&tweak.into());
        assert_eq!(*child.secret_share(), *parent.secret_share() + tweak);
        assert_eq!(&child.chain_code()[..], &digest[32..]);
    }

    #[test]
    fn test_derive_child_rejects_hardened() {
        let params = GroupParams::secp256k1();
        let parent = key_share(2);

        assert!(matches!(
            parent.derive_child(&params, "m/0'/1"),
            Err(Error::Derivation(_))
        ));
        assert!(matches!(
            parent.derive_child(&params, "not a path"),
            Err(Error::Derivation(_))
        ));
    }
}
