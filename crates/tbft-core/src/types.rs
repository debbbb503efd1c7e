//! Core types shared across the protocol

use serde::{Deserialize, Serialize};

use crate::keygen::{CommitMessage, ValueMessage};
use crate::sign::SignatureShareMessage;

/// Unique identifier for a validator in the committee, 0-based.
///
/// Polynomial evaluation always happens at [`crate::curve::evaluation_point`],
/// which maps id `i` to the scalar `i + 1`.
pub type ValidatorId = usize;

/// Key-generation epoch. A new epoch starts whenever the validator set
/// changes and a fresh DKG round is triggered by governance.
pub type Epoch = u64;

/// Committee parameters for one protocol instance.
///
/// Only constructible through [`ProtocolParams::new`] (deserialization
/// funnels through it as well), so `n > 3f` holds wherever a value of
/// this type exists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "RawProtocolParams")]
pub struct ProtocolParams {
    n: usize,
    f: usize,
}

#[derive(Deserialize)]
struct RawProtocolParams {
    n: usize,
    f: usize,
}

impl TryFrom<RawProtocolParams> for ProtocolParams {
    type Error = crate::Error;

    fn try_from(raw: RawProtocolParams) -> crate::Result<Self> {
        Self::new(raw.n, raw.f)
    }
}

impl ProtocolParams {
    /// Create validated parameters. Asynchronous BFT requires `n > 3f`.
    pub fn new(n: usize, f: usize) -> crate::Result<Self> {
        if n == 0 {
            return Err(crate::Error::InvalidConfig(
                "Committee cannot be empty".into(),
            ));
        }
        if n <= 3 * f {
            return Err(crate::Error::InvalidConfig(format!(
                "n must exceed 3f, got n={} f={}",
                n, f
            )));
        }
        Ok(Self { n, f })
    }

    /// Committee size
    pub fn n(&self) -> usize {
        self.n
    }

    /// Tolerated number of Byzantine validators
    pub fn f(&self) -> usize {
        self.f
    }

    /// Signing threshold: any `threshold + 1` shares assemble a signature.
    pub fn threshold(&self) -> usize {
        self.f
    }
}

/// Closed set of messages exchanged by the threshold protocols.
///
/// The outer consensus layer routes these by variant; there is no open
/// dispatch over message kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProtocolMessage {
    /// DKG round 1: commitment plus per-recipient encrypted rows
    Commit(CommitMessage),
    /// DKG round 2: re-encrypted point values for one proposer
    Value(ValueMessage),
    /// A validator's signature share for the current message
    SignatureShare(SignatureShareMessage),
}
