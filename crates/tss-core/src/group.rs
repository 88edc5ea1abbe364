//! Explicit secp256k1 group context
//!
//! Components receive a [`GroupParams`] value instead of reaching for a
//! process-wide curve object, so every check is a pure function of its inputs.

use crate::{Error, Result};
use k256::{
    elliptic_curve::{
        bigint::U256,
        ops::Reduce,
        point::AffineCoordinates,
        sec1::{FromEncodedPoint, ToEncodedPoint},
        PrimeField,
    },
    AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar,
};
use subtle::ConstantTimeEq;

/// Immutable group parameters: generator, order and the point codec
#[derive(Clone, Copy, Debug)]
pub struct GroupParams {
    generator: ProjectivePoint,
}

impl GroupParams {
    /// Parameters of the secp256k1 curve
    pub fn secp256k1() -> Self {
        Self {
            generator: ProjectivePoint::GENERATOR,
        }
    }

    /// Generator point G
    pub fn generator(&self) -> ProjectivePoint {
        self.generator
    }

    /// Group order n as a hex string
    pub fn order(&self) -> &'static str {
        Scalar::MODULUS
    }

    /// Curve image `s·G` of a scalar
    pub fn mul_generator(&self, scalar: &Scalar) -> ProjectivePoint {
        self.generator * scalar
    }

    /// Canonical encoding: hex of the SEC1 compressed point (`"00"` for the identity)
    pub fn encode_point(&self, point: &ProjectivePoint) -> String {
        hex::encode(compressed(point).as_bytes())
    }

    /// Decode a point produced by [`GroupParams::encode_point`]
    pub fn decode_point(&self, encoded: &str) -> Result<ProjectivePoint> {
        let bytes = hex::decode(encoded)
            .map_err(|e| Error::DecodingFailed(format!("point is not hex: {}", e)))?;
        let point = EncodedPoint::from_bytes(&bytes)
            .map_err(|e| Error::DecodingFailed(format!("bad SEC1 encoding: {}", e)))?;
        let affine_opt = AffinePoint::from_encoded_point(&point);
        let affine: AffinePoint = Option::<AffinePoint>::from(affine_opt)
            .ok_or_else(|| Error::DecodingFailed(format!("{} is not a curve point", encoded)))?;
        Ok(ProjectivePoint::from(affine))
    }

    /// Exact equality of canonical encodings, compared in constant time
    pub fn points_equal(&self, a: &ProjectivePoint, b: &ProjectivePoint) -> bool {
        compressed(a).as_bytes().ct_eq(compressed(b).as_bytes()).into()
    }

    /// Affine x-coordinate of a point, reduced mod n
    pub fn x_scalar(&self, point: &ProjectivePoint) -> Scalar {
        <Scalar as Reduce<U256>>::reduce_bytes(&point.to_affine().x())
    }
}

impl Default for GroupParams {
    fn default() -> Self {
        Self::secp256k1()
    }
}

fn compressed(point: &ProjectivePoint) -> EncodedPoint {
    point.to_affine().to_encoded_point(true)
}

/// 64-character big-endian hex of a scalar
pub fn encode_scalar(scalar: &Scalar) -> String {
    hex::encode(scalar.to_bytes())
}

/// Decode a canonical scalar; values outside `[0, n)` are rejected
pub fn decode_scalar(encoded: &str) -> Result<Scalar> {
    let bytes = hex::decode(encoded)
        .map_err(|e| Error::DecodingFailed(format!("scalar is not hex: {}", e)))?;
    if bytes.len() != 32 {
        return Err(Error::DecodingFailed(format!(
            "scalar must be 32 bytes, got {}",
            bytes.len()
        )));
    }
    let repr: FieldBytes = <[u8; 32]>::try_from(bytes.as_slice())
        .map_err(|e| Error::DecodingFailed(e.to_string()))?
        .into();
    Option::<Scalar>::from(Scalar::from_repr(repr))
        .ok_or_else(|| Error::DecodingFailed("scalar is not reduced mod n".into()))
}
