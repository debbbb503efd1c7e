//! Signature-share message types

use serde::{Deserialize, Serialize};

/// A validator's signature share together with the public key share it
/// claims to sign under. Routed to the [`super::ThresholdSigner`] for the
/// matching message/round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureShareMessage {
    /// Compressed public key share (96 bytes)
    pub public_key_share: Vec<u8>,
    /// Compressed signature share (48 bytes)
    pub share: Vec<u8>,
}
