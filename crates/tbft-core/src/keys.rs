//! Threshold key material produced by a successful DKG run.

use blstrs::{G2Projective, Scalar};
use group::Group;

use crate::curve;
use crate::sign::SignatureShare;
use crate::types::ValidatorId;
use crate::{Error, Result};

/// One validator's secret share of the joint private key.
///
/// Never serialized or broadcast in clear; the debug representation is
/// redacted.
#[derive(Clone)]
pub struct PrivateKeyShare {
    index: ValidatorId,
    scalar: Scalar,
}

impl PrivateKeyShare {
    pub(crate) fn new(index: ValidatorId, scalar: Scalar) -> Self {
        Self { index, scalar }
    }

    pub fn index(&self) -> ValidatorId {
        self.index
    }

    /// Deterministic BLS signature share: hash the message into G1 and
    /// multiply by the share. Repeated calls yield the same share.
    pub fn sign(&self, message: &[u8]) -> SignatureShare {
        SignatureShare(curve::hash_to_g1(message) * self.scalar)
    }

    /// The public image of this share
    pub fn public_key_share(&self) -> PublicKeyShare {
        PublicKeyShare(G2Projective::generator() * self.scalar)
    }
}

impl std::fmt::Debug for PrivateKeyShare {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKeyShare")
            .field("index", &self.index)
            .field("scalar", &"<redacted>")
            .finish()
    }
}

/// Public commitment to one validator's private key share
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKeyShare(pub(crate) G2Projective);

impl PublicKeyShare {
    pub fn to_bytes(&self) -> [u8; curve::G2_BYTES] {
        curve::g2_to_bytes(&self.0)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self(curve::g2_from_bytes(bytes)?))
    }
}

/// The aggregate joint public key of the committee
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey(pub(crate) G2Projective);

impl PublicKey {
    pub fn to_bytes(&self) -> [u8; curve::G2_BYTES] {
        curve::g2_to_bytes(&self.0)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self(curve::g2_from_bytes(bytes)?))
    }
}

/// Ordered collection of all validators' public key shares, the
/// aggregate key, and the signing threshold
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKeySet {
    public_key: PublicKey,
    shares: Vec<PublicKeyShare>,
    threshold: usize,
}

impl PublicKeySet {
    pub(crate) fn new(public_key: PublicKey, shares: Vec<PublicKeyShare>, threshold: usize) -> Self {
        Self {
            public_key,
            shares,
            threshold,
        }
    }

    pub fn len(&self) -> usize {
        self.shares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    /// Any `threshold + 1` valid shares assemble a signature
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn share(&self, index: ValidatorId) -> Option<&PublicKeyShare> {
        self.shares.get(index)
    }

    /// Numeric index of a claimed public key share, if it belongs to
    /// this committee
    pub fn index_of(&self, share: &PublicKeyShare) -> Option<ValidatorId> {
        self.shares.iter().position(|s| s == share)
    }

    /// `u32 threshold (BE) || aggregate || share_0 || .. || share_{n-1}`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + (1 + self.shares.len()) * curve::G2_BYTES);
        out.extend_from_slice(&(self.threshold as u32).to_be_bytes());
        out.extend_from_slice(&self.public_key.to_bytes());
        for share in &self.shares {
            out.extend_from_slice(&share.to_bytes());
        }
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 4 + curve::G2_BYTES
            || (bytes.len() - 4) % curve::G2_BYTES != 0
        {
            return Err(Error::Deserialization(
                "public key set has invalid length".into(),
            ));
        }
        let mut threshold_raw = [0u8; 4];
        threshold_raw.copy_from_slice(&bytes[..4]);
        let threshold = u32::from_be_bytes(threshold_raw) as usize;
        let public_key = PublicKey::from_bytes(&bytes[4..4 + curve::G2_BYTES])?;
        let mut shares = Vec::new();
        for chunk in bytes[4 + curve::G2_BYTES..].chunks_exact(curve::G2_BYTES) {
            shares.push(PublicKeyShare::from_bytes(chunk)?);
        }
        if shares.len() <= threshold {
            return Err(Error::Deserialization(format!(
                "public key set of {} shares cannot meet threshold {}",
                shares.len(),
                threshold
            )));
        }
        Ok(Self {
            public_key,
            shares,
            threshold,
        })
    }
}

/// Final output of a successful DKG run for one validator: threshold-
/// encryption material and threshold-signature material, both derived
/// from the same joint secret.
///
/// Only constructible by the keygen once its completion criteria hold.
pub struct ThresholdKeyring {
    encryption_share: PrivateKeyShare,
    signature_share: PrivateKeyShare,
    public_keys: PublicKeySet,
}

impl ThresholdKeyring {
    pub(crate) fn new(share: PrivateKeyShare, public_keys: PublicKeySet) -> Self {
        Self {
            encryption_share: share.clone(),
            signature_share: share,
            public_keys,
        }
    }

    /// Share used for threshold decryption of ciphertexts addressed to
    /// the committee
    pub fn decryption_share(&self) -> &PrivateKeyShare {
        &self.encryption_share
    }

    /// Share used to produce signature shares
    pub fn signature_share(&self) -> &PrivateKeyShare {
        &self.signature_share
    }

    pub fn public_key_set(&self) -> &PublicKeySet {
        &self.public_keys
    }

    pub fn shared_public_key(&self) -> &PublicKey {
        self.public_keys.public_key()
    }
}
