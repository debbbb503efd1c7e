//! Per-recipient envelope encryption for DKG rows and point values.
//!
//! Every validator holds one long-lived X25519 key pair; its public half
//! is known to the whole committee. Sealing uses an ephemeral key
//! exchange, a blake3-derived ChaCha20-Poly1305 key, and a fixed nonce
//! (the key is unique per message). The keygen receives these keys
//! explicitly; there is no process-global crypto provider.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use rand_core::{CryptoRng, RngCore};
use x25519_dalek::{EphemeralSecret, StaticSecret};
use zeroize::Zeroizing;

use crate::{Error, Result};

const KDF_CONTEXT: &str = "tbft-core envelope v1";
const PUBLIC_KEY_BYTES: usize = 32;
const SECRET_KEY_BYTES: usize = 32;

/// A validator's long-lived envelope decryption key
#[derive(Clone)]
pub struct SecretKey {
    secret: StaticSecret,
}

/// The public half of a validator's envelope key pair
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey {
    public: x25519_dalek::PublicKey,
}

impl SecretKey {
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self {
            secret: StaticSecret::random_from_rng(&mut *rng),
        }
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            public: x25519_dalek::PublicKey::from(&self.secret),
        }
    }

    pub fn to_bytes(&self) -> Zeroizing<[u8; SECRET_KEY_BYTES]> {
        Zeroizing::new(self.secret.to_bytes())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw: [u8; SECRET_KEY_BYTES] = bytes.try_into().map_err(|_| {
            Error::Deserialization(format!("envelope key must be {} bytes", SECRET_KEY_BYTES))
        })?;
        Ok(Self {
            secret: StaticSecret::from(raw),
        })
    }
}

impl PublicKey {
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_BYTES] {
        self.public.to_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw: [u8; PUBLIC_KEY_BYTES] = bytes.try_into().map_err(|_| {
            Error::Deserialization(format!("envelope key must be {} bytes", PUBLIC_KEY_BYTES))
        })?;
        Ok(Self {
            public: x25519_dalek::PublicKey::from(raw),
        })
    }
}

fn derive_key(shared: &[u8; 32], ephemeral: &x25519_dalek::PublicKey, recipient: &PublicKey) -> Key {
    let mut ikm = Zeroizing::new(Vec::with_capacity(96));
    ikm.extend_from_slice(shared);
    ikm.extend_from_slice(ephemeral.as_bytes());
    ikm.extend_from_slice(&recipient.to_bytes());
    let key = blake3::derive_key(KDF_CONTEXT, &ikm);
    *Key::from_slice(&key)
}

/// Seal `plaintext` to `recipient`: `ephemeral_pk || ciphertext`
pub fn seal<R: RngCore + CryptoRng>(
    rng: &mut R,
    recipient: &PublicKey,
    plaintext: &[u8],
) -> Vec<u8> {
    let ephemeral = EphemeralSecret::random_from_rng(&mut *rng);
    let ephemeral_pk = x25519_dalek::PublicKey::from(&ephemeral);
    let shared = ephemeral.diffie_hellman(&recipient.public);
    let key = derive_key(shared.as_bytes(), &ephemeral_pk, recipient);

    let cipher = ChaCha20Poly1305::new(&key);
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&[0u8; 12]), plaintext)
        .expect("ChaCha20-Poly1305 encrypt");

    let mut out = Vec::with_capacity(PUBLIC_KEY_BYTES + ciphertext.len());
    out.extend_from_slice(ephemeral_pk.as_bytes());
    out.extend_from_slice(&ciphertext);
    out
}

/// Open a sealed envelope addressed to `secret`'s key pair. The plaintext
/// may be a secret share, so it is returned zeroizing.
pub fn open(secret: &SecretKey, sealed: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if sealed.len() < PUBLIC_KEY_BYTES {
        return Err(Error::Decryption);
    }
    let (ephemeral_raw, ciphertext) = sealed.split_at(PUBLIC_KEY_BYTES);
    let raw: [u8; PUBLIC_KEY_BYTES] = ephemeral_raw.try_into().map_err(|_| Error::Decryption)?;
    let ephemeral_pk = x25519_dalek::PublicKey::from(raw);
    let shared = secret.secret.diffie_hellman(&ephemeral_pk);
    let key = derive_key(shared.as_bytes(), &ephemeral_pk, &secret.public_key());

    let cipher = ChaCha20Poly1305::new(&key);
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&[0u8; 12]), ciphertext)
        .map_err(|_| Error::Decryption)?;
    Ok(Zeroizing::new(plaintext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn seal_open_round_trip() {
        let secret = SecretKey::generate(&mut OsRng);
        let sealed = seal(&mut OsRng, &secret.public_key(), b"row material");
        let opened = open(&secret, &sealed).unwrap();
        assert_eq!(&opened[..], b"row material");
    }

    #[test]
    fn wrong_recipient_fails() {
        let alice = SecretKey::generate(&mut OsRng);
        let bob = SecretKey::generate(&mut OsRng);
        let sealed = seal(&mut OsRng, &alice.public_key(), b"for alice");
        assert!(matches!(open(&bob, &sealed), Err(Error::Decryption)));
    }

    #[test]
    fn tampered_or_truncated_fails() {
        let secret = SecretKey::generate(&mut OsRng);
        let mut sealed = seal(&mut OsRng, &secret.public_key(), b"payload");
        let last = sealed.len() - 1;
        sealed[last] ^= 0x01;
        assert!(open(&secret, &sealed).is_err());
        assert!(open(&secret, &sealed[..16]).is_err());
    }

    #[test]
    fn public_key_bytes_round_trip() {
        let secret = SecretKey::generate(&mut OsRng);
        let pk = secret.public_key();
        assert_eq!(PublicKey::from_bytes(&pk.to_bytes()).unwrap(), pk);
    }

    #[test]
    fn secret_key_bytes_round_trip() {
        let secret = SecretKey::generate(&mut OsRng);
        let restored = SecretKey::from_bytes(&secret.to_bytes()[..]).unwrap();
        assert_eq!(restored.public_key(), secret.public_key());

        let sealed = seal(&mut OsRng, &secret.public_key(), b"payload");
        assert_eq!(&open(&restored, &sealed).unwrap()[..], b"payload");
    }
}
