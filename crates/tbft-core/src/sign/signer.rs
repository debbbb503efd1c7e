//! Threshold signer implementation

use std::collections::BTreeMap;

use blstrs::G1Projective;
use tracing::{debug, info, instrument, warn};

use crate::keys::{PrivateKeyShare, PublicKeySet, PublicKeyShare};
use crate::lagrange;
use crate::types::ValidatorId;
use crate::{Error, Result};

use super::{Signature, SignatureShare, SignatureShareMessage};

/// Why an offered share was not counted toward the threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The claimed public key share does not belong to this committee
    UnknownKey,
    /// A share for this index was already recorded
    AlreadyRecorded,
    /// The pairing check against the claimed key share failed
    InvalidShare,
}

/// Result of feeding one share into the signer
#[derive(Debug, Clone)]
pub enum AddShareOutcome {
    /// Share not counted; a no-op, never fatal. Invalid shares should be
    /// reported to the outer fault-handling layer by the caller.
    Rejected(RejectReason),
    /// Share counted, signature not yet assemblable
    Accepted { collected: usize, required: usize },
    /// The joint signature, assembled and validated
    Complete(Signature),
}

/// Collects signature shares for one message and assembles the joint
/// signature once `threshold + 1` valid, distinct shares are present.
///
/// Waiting is expressed by [`AddShareOutcome::Accepted`]; the signer
/// never blocks. Calls after assembly return the cached signature.
pub struct ThresholdSigner {
    key_share: PrivateKeyShare,
    public_keys: PublicKeySet,
    message: Vec<u8>,
    shares: BTreeMap<ValidatorId, G1Projective>,
    assembled: Option<Signature>,
}

impl ThresholdSigner {
    pub fn new(
        key_share: PrivateKeyShare,
        public_keys: PublicKeySet,
        message: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            key_share,
            public_keys,
            message: message.into(),
            shares: BTreeMap::new(),
            assembled: None,
        }
    }

    /// This validator's own share over the message. Deterministic: no
    /// randomness is involved, repeated calls yield the same share.
    pub fn sign(&self) -> SignatureShare {
        self.key_share.sign(&self.message)
    }

    /// Own share packaged for broadcast
    pub fn share_message(&self) -> SignatureShareMessage {
        SignatureShareMessage {
            public_key_share: self.key_share.public_key_share().to_bytes().to_vec(),
            share: self.sign().to_bytes().to_vec(),
        }
    }

    /// The assembled signature, if enough shares have been collected
    pub fn signature(&self) -> Option<&Signature> {
        self.assembled.as_ref()
    }

    /// Decode and fold in a received share message
    pub fn handle_message(&mut self, msg: &SignatureShareMessage) -> Result<AddShareOutcome> {
        let claimed = PublicKeyShare::from_bytes(&msg.public_key_share)?;
        let share = SignatureShare::from_bytes(&msg.share)?;
        self.add_share(&claimed, &share)
    }

    /// Fold in one share. Unknown keys, duplicates, and shares failing
    /// the pairing check are rejected as no-ops; an assembled signature
    /// failing validation against the aggregate key is a fatal internal
    /// invariant violation.
    #[instrument(skip(self, claimed, share))]
    pub fn add_share(
        &mut self,
        claimed: &PublicKeyShare,
        share: &SignatureShare,
    ) -> Result<AddShareOutcome> {
        if let Some(signature) = &self.assembled {
            return Ok(AddShareOutcome::Complete(signature.clone()));
        }

        let index = match self.public_keys.index_of(claimed) {
            Some(index) => index,
            None => {
                debug!("share under unknown public key share ignored");
                return Ok(AddShareOutcome::Rejected(RejectReason::UnknownKey));
            }
        };
        if self.shares.contains_key(&index) {
            return Ok(AddShareOutcome::Rejected(RejectReason::AlreadyRecorded));
        }
        if !share.validate(claimed, &self.message) {
            warn!(index, "signature share failed pairing check");
            return Ok(AddShareOutcome::Rejected(RejectReason::InvalidShare));
        }

        self.shares.insert(index, share.0);
        let required = self.public_keys.threshold() + 1;
        if self.shares.len() < required {
            debug!(
                collected = self.shares.len(),
                required, "share accepted, waiting for more"
            );
            return Ok(AddShareOutcome::Accepted {
                collected: self.shares.len(),
                required,
            });
        }

        let pairs: Vec<(ValidatorId, G1Projective)> =
            self.shares.iter().map(|(id, p)| (*id, *p)).collect();
        let combined = lagrange::interpolate_g1_at_zero(&pairs, required)?;
        let signature = Signature(combined);
        if !signature.verify(self.public_keys.public_key(), &self.message) {
            // All shares passed their individual pairing checks, so a bad
            // combination points at key derivation or interpolation, not
            // at Byzantine input.
            return Err(Error::InternalInvariant(
                "assembled signature does not verify against the shared public key".into(),
            ));
        }

        info!(
            signature = hex::encode(signature.to_bytes()),
            "threshold signature assembled"
        );
        self.assembled = Some(signature.clone());
        Ok(AddShareOutcome::Complete(signature))
    }
}
