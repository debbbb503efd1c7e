//! Bivariate symmetric polynomial secret sharing and Feldman commitments.
//!
//! A degree-`d` symmetric polynomial `f(x, y) = f(y, x)` is stored as the
//! upper triangle of its coefficient matrix, `(d+1)(d+2)/2` scalars, so
//! symmetry is enforced by the storage layout rather than duplication.
//! The commitment maps every coefficient to a G2 point; recipients check
//! received scalar rows against the homomorphic evaluation of those
//! points without learning any secret.

use blstrs::{G2Projective, Scalar};
use ff::Field;
use group::Group;
use rand_core::RngCore;

use crate::curve;
use crate::{Error, Result};

/// Number of upper-triangular coefficients of a degree-`d` symmetric
/// bivariate polynomial.
pub fn triangle_len(degree: usize) -> usize {
    (degree + 1) * (degree + 2) / 2
}

/// Degree whose triangle has exactly `count` coefficients, if any.
fn degree_for_triangle(count: usize) -> Option<usize> {
    let mut degree = 0;
    loop {
        let len = triangle_len(degree);
        if len == count {
            return Some(degree);
        }
        if len > count {
            return None;
        }
        degree += 1;
    }
}

/// Storage index of coefficient `(i, j)` with `i <= j`
fn tri_index(i: usize, j: usize) -> usize {
    debug_assert!(i <= j);
    j * (j + 1) / 2 + i
}

/// Horner evaluation of a univariate coefficient row
pub fn evaluate_univariate(coeffs: &[Scalar], x: &Scalar) -> Scalar {
    let mut acc = Scalar::ZERO;
    for coeff in coeffs.iter().rev() {
        acc *= x;
        acc += coeff;
    }
    acc
}

/// Horner evaluation of a univariate row of G2 points
pub(crate) fn evaluate_univariate_g2(points: &[G2Projective], x: &Scalar) -> G2Projective {
    let mut acc = G2Projective::identity();
    for point in points.iter().rev() {
        acc *= x;
        acc += point;
    }
    acc
}

/// A secret random symmetric bivariate polynomial
#[derive(Clone)]
pub struct BivariatePolynomial {
    degree: usize,
    coeffs: Vec<Scalar>,
}

impl BivariatePolynomial {
    /// Draw a fresh polynomial with uniformly random coefficients
    pub fn random<R: RngCore>(degree: usize, rng: &mut R) -> Self {
        let coeffs = (0..triangle_len(degree))
            .map(|_| Scalar::random(&mut *rng))
            .collect();
        Self { degree, coeffs }
    }

    /// Construct from explicit triangular coefficients. Rejects any count
    /// that does not match the stated degree; this is a hard parameter
    /// integrity check.
    pub fn from_coefficients(degree: usize, coeffs: Vec<Scalar>) -> Result<Self> {
        if coeffs.len() != triangle_len(degree) {
            return Err(Error::InvalidConfig(format!(
                "degree {} needs {} coefficients, got {}",
                degree,
                triangle_len(degree),
                coeffs.len()
            )));
        }
        Ok(Self { degree, coeffs })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    fn coeff(&self, i: usize, j: usize) -> &Scalar {
        let (lo, hi) = if i <= j { (i, j) } else { (j, i) };
        &self.coeffs[tri_index(lo, hi)]
    }

    /// The univariate row `f(x, ·)` as `degree + 1` scalar coefficients
    pub fn evaluate_row(&self, x: &Scalar) -> Vec<Scalar> {
        let mut row = Vec::with_capacity(self.degree + 1);
        for j in 0..=self.degree {
            let mut acc = Scalar::ZERO;
            for i in (0..=self.degree).rev() {
                acc *= x;
                acc += self.coeff(i, j);
            }
            row.push(acc);
        }
        row
    }

    /// Full evaluation `f(x, y)`
    pub fn evaluate(&self, x: &Scalar, y: &Scalar) -> Scalar {
        evaluate_univariate(&self.evaluate_row(x), y)
    }

    /// Feldman commitment: every coefficient mapped to `G2 * coeff`
    pub fn commit(&self) -> Commitment {
        let points = self
            .coeffs
            .iter()
            .map(|c| G2Projective::generator() * c)
            .collect();
        Commitment {
            degree: self.degree,
            points,
        }
    }
}

/// Public commitment to a [`BivariatePolynomial`], same triangular layout
/// in G2-point form
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commitment {
    degree: usize,
    points: Vec<G2Projective>,
}

impl Commitment {
    pub fn degree(&self) -> usize {
        self.degree
    }

    fn point(&self, i: usize, j: usize) -> &G2Projective {
        let (lo, hi) = if i <= j { (i, j) } else { (j, i) };
        &self.points[tri_index(lo, hi)]
    }

    /// The committed row `f(x, ·)` as `degree + 1` G2 points. A recipient
    /// checks its decrypted scalar row `r` by verifying
    /// `G2 * r[j] == evaluate_row(x)[j]` for every `j`.
    pub fn evaluate_row(&self, x: &Scalar) -> Vec<G2Projective> {
        let mut row = Vec::with_capacity(self.degree + 1);
        for j in 0..=self.degree {
            let mut acc = G2Projective::identity();
            for i in (0..=self.degree).rev() {
                acc *= x;
                acc += self.point(i, j);
            }
            row.push(acc);
        }
        row
    }

    /// Homomorphic evaluation of the committed polynomial at `(x, y)`
    pub fn evaluate(&self, x: &Scalar, y: &Scalar) -> G2Projective {
        let row = self.evaluate_row(x);
        let mut acc = G2Projective::identity();
        for point in row.iter().rev() {
            acc *= y;
            acc += point;
        }
        acc
    }

    /// Concatenated compressed point encodings in triangular index order
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.points.len() * curve::G2_BYTES);
        for point in &self.points {
            out.extend_from_slice(&curve::g2_to_bytes(point));
        }
        out
    }

    /// Decode a commitment, inferring the degree from the byte length.
    /// Lengths that do not correspond to a triangular coefficient count
    /// are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() || bytes.len() % curve::G2_BYTES != 0 {
            return Err(Error::Deserialization(format!(
                "commitment length {} is not a multiple of {}",
                bytes.len(),
                curve::G2_BYTES
            )));
        }
        let count = bytes.len() / curve::G2_BYTES;
        let degree = degree_for_triangle(count).ok_or_else(|| {
            Error::Deserialization(format!(
                "{} points do not form a triangular coefficient count",
                count
            ))
        })?;
        let mut points = Vec::with_capacity(count);
        for chunk in bytes.chunks_exact(curve::G2_BYTES) {
            points.push(curve::g2_from_bytes(chunk)?);
        }
        Ok(Self { degree, points })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn triangle_lengths() {
        assert_eq!(triangle_len(0), 1);
        assert_eq!(triangle_len(1), 3);
        assert_eq!(triangle_len(2), 6);
        assert_eq!(degree_for_triangle(6), Some(2));
        assert_eq!(degree_for_triangle(2), None);
        assert_eq!(degree_for_triangle(4), None);
    }

    #[test]
    fn rejects_wrong_coefficient_count() {
        let coeffs = vec![Scalar::ONE; 4];
        assert!(BivariatePolynomial::from_coefficients(1, coeffs).is_err());
    }

    #[test]
    fn seeded_rng_reproduces_polynomial() {
        use rand::SeedableRng;
        use rand_chacha::ChaCha8Rng;

        let a = BivariatePolynomial::random(2, &mut ChaCha8Rng::seed_from_u64(42));
        let b = BivariatePolynomial::random(2, &mut ChaCha8Rng::seed_from_u64(42));
        let x = Scalar::from(2u64);
        let y = Scalar::from(6u64);
        assert_eq!(a.evaluate(&x, &y), b.evaluate(&x, &y));
    }

    #[test]
    fn polynomial_is_symmetric() {
        let poly = BivariatePolynomial::random(3, &mut OsRng);
        let x = Scalar::from(5u64);
        let y = Scalar::from(11u64);
        assert_eq!(poly.evaluate(&x, &y), poly.evaluate(&y, &x));
    }

    #[test]
    fn commitment_matches_polynomial() {
        let poly = BivariatePolynomial::random(2, &mut OsRng);
        let commitment = poly.commit();
        let x = Scalar::from(3u64);
        let y = Scalar::from(7u64);

        // Row coefficients match the committed row pointwise.
        let row = poly.evaluate_row(&x);
        let committed_row = commitment.evaluate_row(&x);
        for (coeff, point) in row.iter().zip(committed_row.iter()) {
            assert_eq!(G2Projective::generator() * coeff, *point);
        }

        // Full evaluation matches in the group.
        assert_eq!(
            G2Projective::generator() * poly.evaluate(&x, &y),
            commitment.evaluate(&x, &y)
        );
    }

    #[test]
    fn commitment_byte_round_trip() {
        let poly = BivariatePolynomial::random(2, &mut OsRng);
        let commitment = poly.commit();
        let decoded = Commitment::from_bytes(&commitment.to_bytes()).unwrap();
        assert_eq!(decoded.degree(), 2);
        let x = Scalar::from(4u64);
        let y = Scalar::from(9u64);
        assert_eq!(decoded.evaluate(&x, &y), commitment.evaluate(&x, &y));
    }

    #[test]
    fn commitment_rejects_bad_lengths() {
        // Not a multiple of the point size.
        assert!(Commitment::from_bytes(&[0u8; 95]).is_err());
        // Multiple of the point size but not a triangular count.
        let poly = BivariatePolynomial::random(1, &mut OsRng);
        let mut bytes = poly.commit().to_bytes();
        bytes.truncate(2 * curve::G2_BYTES);
        assert!(Commitment::from_bytes(&bytes).is_err());
        assert!(Commitment::from_bytes(&[]).is_err());
    }
}
