//! # TBFT Threshold Core
//!
//! Threshold-cryptography core for an asynchronous BFT validator:
//! trustless distributed key generation over bivariate symmetric
//! polynomials and BLS threshold signing over BLS12-381.
//!
//! The crate provides:
//! - Verifiable secret sharing with Feldman commitments in G2
//! - A multi-round, handler-driven DKG state machine
//!   ([`TrustlessKeygen`]) tolerating up to `f` Byzantine validators
//!   out of `n > 3f`
//! - Threshold key material ([`ThresholdKeyring`]) and signature
//!   assembly by Lagrange interpolation ([`ThresholdSigner`])
//!
//! All handlers are synchronous and non-blocking; waiting is expressed
//! by polling ([`TrustlessKeygen::try_get_keys`],
//! [`sign::AddShareOutcome`]). Networking, persistence, and fault
//! accounting live in outer layers.
//!
//! ## Example
//!
//! ```rust,ignore
//! use tbft_core::{ProtocolParams, TrustlessKeygen, ThresholdSigner};
//!
//! let keygen = TrustlessKeygen::new(params, my_id, secret, recipients)?;
//! let commit = keygen.start(&mut rng);
//! // ... broadcast, feed handle_commit / handle_value ...
//! if let Some(keys) = keygen.try_get_keys()? {
//!     let mut signer = ThresholdSigner::new(
//!         keys.signature_share().clone(),
//!         keys.public_key_set().clone(),
//!         message,
//!     );
//! }
//! ```

pub mod curve;
pub mod error;
pub mod keygen;
pub mod keys;
pub mod lagrange;
pub mod poly;
pub mod sealed;
pub mod session;
pub mod sign;
pub mod types;

pub use error::{Error, Result};
pub use keygen::{CommitMessage, DkgPartyState, TrustlessKeygen, ValueMessage};
pub use keys::{PrivateKeyShare, PublicKey, PublicKeySet, PublicKeyShare, ThresholdKeyring};
pub use session::KeygenSessions;
pub use sign::{
    AddShareOutcome, RejectReason, Signature, SignatureShare, SignatureShareMessage,
    ThresholdSigner,
};
pub use types::{Epoch, ProtocolMessage, ProtocolParams, ValidatorId};

/// Protocol version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
