//! Helpers over the BLS12-381 arithmetic provided by `blstrs`.
//!
//! Commitments and public keys live in G2 (96-byte compressed encoding),
//! signatures in G1 (48 bytes). Scalars use the canonical 32-byte
//! big-endian encoding throughout.

use blstrs::{G1Affine, G1Projective, G2Affine, G2Projective, Gt, Scalar};
use group::Curve;

use crate::{Error, Result, types::ValidatorId};

/// Domain separation tag for message hashing
const SIG_DST: &[u8] = b"TBFT-CORE-SIG-V1";

/// Compressed G1 encoding length
pub const G1_BYTES: usize = 48;
/// Compressed G2 encoding length
pub const G2_BYTES: usize = 96;
/// Canonical scalar encoding length
pub const SCALAR_BYTES: usize = 32;

/// Map a validator id to its polynomial evaluation point.
///
/// The crate uses one convention everywhere: validator `i` (0-based)
/// evaluates at `i + 1`, so the constant term (point 0) is never a
/// validator's share.
pub fn evaluation_point(id: ValidatorId) -> Scalar {
    Scalar::from(id as u64 + 1)
}

/// Hash a message into the signature group
pub fn hash_to_g1(msg: &[u8]) -> G1Projective {
    G1Projective::hash_to_curve(msg, SIG_DST, &[])
}

pub fn pairing(g1: &G1Projective, g2: &G2Projective) -> Gt {
    blstrs::pairing(&g1.to_affine(), &g2.to_affine())
}

pub fn scalar_to_bytes(s: &Scalar) -> [u8; SCALAR_BYTES] {
    s.to_bytes_be()
}

pub fn scalar_from_bytes(bytes: &[u8]) -> Result<Scalar> {
    let raw: [u8; SCALAR_BYTES] = bytes
        .try_into()
        .map_err(|_| Error::Deserialization(format!("scalar must be {} bytes", SCALAR_BYTES)))?;
    Option::<Scalar>::from(Scalar::from_bytes_be(&raw))
        .ok_or_else(|| Error::Deserialization("non-canonical scalar encoding".into()))
}

pub fn g1_to_bytes(p: &G1Projective) -> [u8; G1_BYTES] {
    p.to_affine().to_compressed()
}

pub fn g1_from_bytes(bytes: &[u8]) -> Result<G1Projective> {
    let raw: [u8; G1_BYTES] = bytes
        .try_into()
        .map_err(|_| Error::Deserialization(format!("G1 point must be {} bytes", G1_BYTES)))?;
    let affine = Option::<G1Affine>::from(G1Affine::from_compressed(&raw))
        .ok_or_else(|| Error::Deserialization("invalid G1 point encoding".into()))?;
    Ok(affine.into())
}

pub fn g2_to_bytes(p: &G2Projective) -> [u8; G2_BYTES] {
    p.to_affine().to_compressed()
}

pub fn g2_from_bytes(bytes: &[u8]) -> Result<G2Projective> {
    let raw: [u8; G2_BYTES] = bytes
        .try_into()
        .map_err(|_| Error::Deserialization(format!("G2 point must be {} bytes", G2_BYTES)))?;
    let affine = Option::<G2Affine>::from(G2Affine::from_compressed(&raw))
        .ok_or_else(|| Error::Deserialization("invalid G2 point encoding".into()))?;
    Ok(affine.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff::Field;
    use group::Group;
    use rand::rngs::OsRng;

    #[test]
    fn evaluation_points_are_one_based() {
        assert_eq!(evaluation_point(0), Scalar::ONE);
        assert_eq!(evaluation_point(3), Scalar::from(4u64));
    }

    #[test]
    fn scalar_round_trip() {
        let s = Scalar::random(&mut OsRng);
        let decoded = scalar_from_bytes(&scalar_to_bytes(&s)).unwrap();
        assert_eq!(decoded, s);
    }

    #[test]
    fn point_round_trips() {
        let s = Scalar::random(&mut OsRng);
        let p1 = G1Projective::generator() * s;
        let p2 = G2Projective::generator() * s;
        assert_eq!(g1_from_bytes(&g1_to_bytes(&p1)).unwrap(), p1);
        assert_eq!(g2_from_bytes(&g2_to_bytes(&p2)).unwrap(), p2);
    }

    #[test]
    fn rejects_wrong_lengths() {
        assert!(scalar_from_bytes(&[0u8; 31]).is_err());
        assert!(g1_from_bytes(&[0u8; 96]).is_err());
        assert!(g2_from_bytes(&[0u8; 48]).is_err());
    }

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(hash_to_g1(b"block header"), hash_to_g1(b"block header"));
        assert_ne!(hash_to_g1(b"block header"), hash_to_g1(b"other header"));
    }
}
