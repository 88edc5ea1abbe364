//! Message digests mapped into the scalar field

use crate::{Error, Result};
use digest::Digest;
use k256::{
    elliptic_curve::{bigint::U256, ops::Reduce},
    FieldBytes, Scalar,
};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use sha3::Keccak256;
use std::{fmt, str::FromStr};

/// Hash function applied to raw message bytes before signing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageDigest {
    /// Keccak-256, as used for Ethereum-style message signing
    #[default]
    Keccak256,
    /// SHA-256
    Sha256,
}

impl MessageDigest {
    /// 32-byte digest of the message
    pub fn digest(&self, message: &[u8]) -> [u8; 32] {
        let mut out = [0u8; 32];
        match self {
            MessageDigest::Keccak256 => out.copy_from_slice(&Keccak256::digest(message)),
            MessageDigest::Sha256 => out.copy_from_slice(&Sha256::digest(message)),
        }
        out
    }

    /// Big-endian digest reduced mod n
    pub fn hash_to_scalar(&self, message: &[u8]) -> Scalar {
        let bytes: FieldBytes = self.digest(message).into();
        <Scalar as Reduce<U256>>::reduce_bytes(&bytes)
    }
}

impl fmt::Display for MessageDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageDigest::Keccak256 => f.write_str("keccak256"),
            MessageDigest::Sha256 => f.write_str("sha256"),
        }
    }
}

impl FromStr for MessageDigest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "keccak256" | "keccak" => Ok(MessageDigest::Keccak256),
            "sha256" => Ok(MessageDigest::Sha256),
            other => Err(Error::InvalidParameters(format!(
                "unknown message digest: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::encode_scalar;

    #[test]
    fn test_known_digests() {
        assert_eq!(
            hex::encode(MessageDigest::Keccak256.digest(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
        assert_eq!(
            hex::encode(MessageDigest::Sha256.digest(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hash_to_scalar_is_deterministic() {
        let message = b"Hello, Threshold Signature!";
        let a = MessageDigest::Keccak256.hash_to_scalar(message);
        let b = MessageDigest::Keccak256.hash_to_scalar(message);
        let c = MessageDigest::Sha256.hash_to_scalar(message);

        assert_eq!(a, b);
        assert_ne!(a, c);
        // digests below n map to themselves
        assert_eq!(
            encode_scalar(&MessageDigest::Sha256.hash_to_scalar(b"abc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(
            "sha256".parse::<MessageDigest>().unwrap(),
            MessageDigest::Sha256
        );
        assert_eq!(
            "Keccak256".parse::<MessageDigest>().unwrap(),
            MessageDigest::Keccak256
        );
        assert_eq!(MessageDigest::Keccak256.to_string(), "keccak256");
        assert!("md5".parse::<MessageDigest>().is_err());
    }
}
