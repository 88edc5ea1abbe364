//! Shamir polynomial sharing with Feldman commitments

use crate::group::GroupParams;
use crate::{Error, ParticipantId, Result, Share};
use k256::{elliptic_curve::Field, ProjectivePoint, Scalar};
use rand_core::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Secret polynomial `c₀ + c₁x + … + c_{t−1}x^{t−1}`.
///
/// Lives only inside [`generate`]; the coefficients are wiped when it drops.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct Polynomial {
    coefficients: Vec<Scalar>,
}

impl Polynomial {
    /// Draw `threshold` independent uniform coefficients
    pub(crate) fn random<R: RngCore + CryptoRng>(threshold: usize, rng: &mut R) -> Self {
        let coefficients = (0..threshold).map(|_| Scalar::random(&mut *rng)).collect();
        Self { coefficients }
    }

    /// Evaluate at `x`, accumulating incremental powers of x mod n
    pub(crate) fn evaluate(&self, x: ParticipantId) -> Scalar {
        let x_scalar = Scalar::from(u64::from(x));
        let mut result = Scalar::ZERO;
        let mut x_power = Scalar::ONE;

        for coef in &self.coefficients {
            result += *coef * x_power;
            x_power *= x_scalar;
        }

        result
    }

    /// `Cⱼ = cⱼ·G`, in coefficient order
    pub(crate) fn commit(&self, params: &GroupParams) -> CommitmentVector {
        CommitmentVector(
            self.coefficients
                .iter()
                .map(|coef| params.mul_generator(coef))
                .collect(),
        )
    }

    #[cfg(test)]
    pub(crate) fn from_coefficients(coefficients: Vec<Scalar>) -> Self {
        Self { coefficients }
    }
}

/// Public images of a dealer's coefficients, one point per coefficient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitmentVector(Vec<ProjectivePoint>);

impl CommitmentVector {
    /// `C₀ = c₀·G`, the image of the dealer's secret contribution
    pub fn constant_term(&self) -> ProjectivePoint {
        // non-empty by construction
        self.0[0]
    }

    /// Number of commitments (the threshold)
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for vectors built by [`generate`] or [`CommitmentVector::decode`]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Σⱼ Cⱼ·xʲ`, the curve image of the committed polynomial at `x`
    pub fn evaluate_at(&self, x: ParticipantId) -> ProjectivePoint {
        let x_scalar = Scalar::from(u64::from(x));
        let mut result = ProjectivePoint::IDENTITY;
        let mut x_power = Scalar::ONE;

        for commitment in &self.0 {
            result += *commitment * x_power;
            x_power *= x_scalar;
        }

        result
    }

    /// Canonical hex encodings, one per point
    pub fn encode(&self, params: &GroupParams) -> Vec<String> {
        self.0.iter().map(|point| params.encode_point(point)).collect()
    }

    /// Decode a vector received from a peer
    pub fn decode<S: AsRef<str>>(params: &GroupParams, encoded: &[S]) -> Result<Self> {
        if encoded.is_empty() {
            return Err(Error::DecodingFailed("empty commitment vector".into()));
        }
        let points = encoded
            .iter()
            .map(|point| params.decode_point(point.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self(points))
    }
}

/// What a dealer hands to the transport: one share per participant and its commitments
#[derive(Debug, Clone)]
pub struct DealerOutput {
    /// `shares[i-1]` is addressed to participant `i`
    pub shares: Vec<Share>,
    /// Commitments to the dealer's coefficients
    pub commitments: CommitmentVector,
}

/// Check `1 ≤ threshold ≤ participants`
pub(crate) fn validate_threshold(threshold: u32, participants: u32) -> Result<()> {
    if threshold < 1 {
        return Err(Error::InvalidParameters(
            "Threshold must be at least 1".into(),
        ));
    }
    if participants < threshold {
        return Err(Error::InvalidParameters(format!(
            "Threshold {} exceeds participant count {}",
            threshold, participants
        )));
    }
    Ok(())
}

/// Deal a fresh random polynomial of degree `threshold − 1`.
///
/// Returns the evaluations at `1..=participants` and the Feldman commitments.
/// The coefficients themselves never leave this function.
pub fn generate<R: RngCore + CryptoRng>(
    params: &GroupParams,
    threshold: u32,
    participants: u32,
    rng: &mut R,
) -> Result<DealerOutput> {
    validate_threshold(threshold, participants)?;

    let polynomial = Polynomial::random(threshold as usize, rng);
    let shares = (1..=participants)
        .map(|recipient| Share {
            recipient,
            value: polynomial.evaluate(recipient),
        })
        .collect();
    let commitments = polynomial.commit(params);

    Ok(DealerOutput {
        shares,
        commitments,
    })
}
