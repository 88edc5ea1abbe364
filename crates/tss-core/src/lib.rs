//! # TSS Core
//!
//! Threshold cryptography engine over secp256k1.
//!
//! This crate provides:
//! - Shamir polynomial sharing with Feldman commitments
//! - Verification of received shares (canonical Feldman or cross-sender interpolation)
//! - Aggregation of verified shares into a participant key share
//! - Per-participant signature shares and their combination
//!
//! Moving shares and commitments between participants is left to a
//! [`mpc::Relay`]; the core itself never performs I/O.
//!
//! ## Example
//!
//! ```rust,ignore
//! use tss_core::{keygen, sign, GroupParams, SessionConfig};
//!
//! let params = GroupParams::secp256k1();
//! let config = SessionConfig::new(session_id, 2, 3, party_id)?;
//!
//! // Run distributed key generation
//! let output = keygen::run_dkg(&params, &config, &relay).await?;
//!
//! // Produce a partial signature and combine the signers' partials
//! let signature =
//!     sign::run_dsg(&params, &config, &output, &sign_session, message, &[1, 2], &relay).await?;
//! ```

pub mod error;
pub mod group;
pub mod hash;
pub mod keygen;
pub mod mpc;
pub mod sign;
pub mod types;

pub use error::{Error, Result};
pub use group::GroupParams;
pub use hash::MessageDigest;
pub use keygen::ShareCheck;
pub use types::{
    AggregateSignature, KeyShare, ParticipantId, SessionConfig, SessionId, Share, SignatureShare,
    RECOVERY_ID,
};

/// Protocol version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default threshold for a 3-party setup
pub const DEFAULT_THRESHOLD: u32 = 2;

/// Default number of participants
pub const DEFAULT_PARTICIPANTS: u32 = 3;
