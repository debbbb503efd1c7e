//! Threshold signature collection and assembly.
//!
//! Each validator computes its own share deterministically and broadcasts
//! it; the [`ThresholdSigner`] collects shares, validates each with a
//! pairing check against the claimed public key share, and assembles the
//! joint signature by Lagrange interpolation over G1 once `threshold + 1`
//! valid shares are present.

mod messages;
mod signer;

pub use messages::SignatureShareMessage;
pub use signer::{AddShareOutcome, RejectReason, ThresholdSigner};

use blstrs::{G1Projective, G2Projective};
use group::Group;

use crate::keys::{PublicKey, PublicKeyShare};
use crate::{curve, Result};

/// A full BLS signature under the committee's shared public key
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature(pub(crate) G1Projective);

impl Signature {
    /// Pairing check against the aggregate public key
    pub fn verify(&self, public_key: &PublicKey, message: &[u8]) -> bool {
        curve::pairing(&self.0, &G2Projective::generator())
            == curve::pairing(&curve::hash_to_g1(message), &public_key.0)
    }

    pub fn to_bytes(&self) -> [u8; curve::G1_BYTES] {
        curve::g1_to_bytes(&self.0)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self(curve::g1_from_bytes(bytes)?))
    }
}

/// One validator's partial signature over a message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureShare(pub(crate) G1Projective);

impl SignatureShare {
    /// Pairing check against the share's claimed public key share
    pub fn validate(&self, claimed: &PublicKeyShare, message: &[u8]) -> bool {
        curve::pairing(&self.0, &G2Projective::generator())
            == curve::pairing(&curve::hash_to_g1(message), &claimed.0)
    }

    pub fn to_bytes(&self) -> [u8; curve::G1_BYTES] {
        curve::g1_to_bytes(&self.0)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self(curve::g1_from_bytes(bytes)?))
    }
}
