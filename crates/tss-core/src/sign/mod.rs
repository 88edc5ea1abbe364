//! Threshold signing module
//!
//! Each key-share holder produces a partial signature with its own fresh
//! nonce ([`sign_share`]); partials are merged by summing their `s` values
//! ([`combine`]). This is not a standard threshold-ECDSA construction: the
//! combined `(r, s)` does not in general verify under any single public key.

mod combine;
mod dsg;
mod messages;
mod partial;

pub use combine::combine;
pub use dsg::run_dsg;
pub use messages::*;
pub use partial::{sign_share, verify_share_signature};
