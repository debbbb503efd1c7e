//! Lagrange interpolation at zero, over the scalar field and over G1.
//!
//! Used by the keygen to recover each qualifying proposer's secret
//! contribution from acknowledged point values, and by the signer to
//! assemble a full signature from threshold + 1 shares.

use blstrs::{G1Projective, Scalar};
use ff::Field;
use group::Group;

use crate::curve::evaluation_point;
use crate::types::ValidatorId;
use crate::{Error, Result};

/// Lagrange basis coefficients at zero for the given validators'
/// evaluation points. Errors on empty or duplicated ids.
pub fn coefficients_at_zero(ids: &[ValidatorId]) -> Result<Vec<Scalar>> {
    if ids.is_empty() {
        return Err(Error::ThresholdNotMet {
            required: 1,
            actual: 0,
        });
    }
    let mut coeffs = Vec::with_capacity(ids.len());
    for (i, id_i) in ids.iter().enumerate() {
        let x_i = evaluation_point(*id_i);
        let mut num = Scalar::ONE;
        let mut den = Scalar::ONE;
        for (j, id_j) in ids.iter().enumerate() {
            if i == j {
                continue;
            }
            let x_j = evaluation_point(*id_j);
            num *= -x_j;
            den *= x_i - x_j;
        }
        let den_inv = Option::<Scalar>::from(den.invert()).ok_or_else(|| {
            Error::InternalInvariant("duplicate evaluation point in interpolation".into())
        })?;
        coeffs.push(num * den_inv);
    }
    Ok(coeffs)
}

/// Interpolate `f(0)` from `(validator, f(evaluation_point(validator)))`
/// pairs. The caller must supply at least `required` points.
pub fn interpolate_scalar_at_zero(
    pairs: &[(ValidatorId, Scalar)],
    required: usize,
) -> Result<Scalar> {
    if pairs.len() < required {
        return Err(Error::ThresholdNotMet {
            required,
            actual: pairs.len(),
        });
    }
    let ids: Vec<ValidatorId> = pairs.iter().map(|(id, _)| *id).collect();
    let coeffs = coefficients_at_zero(&ids)?;
    let mut acc = Scalar::ZERO;
    for (coeff, (_, value)) in coeffs.iter().zip(pairs.iter()) {
        acc += coeff * value;
    }
    Ok(acc)
}

/// Interpolate a G1 point at zero, interpolating curve points under the
/// same evaluation-point convention as the scalar variant
pub fn interpolate_g1_at_zero(
    pairs: &[(ValidatorId, G1Projective)],
    required: usize,
) -> Result<G1Projective> {
    if pairs.len() < required {
        return Err(Error::ThresholdNotMet {
            required,
            actual: pairs.len(),
        });
    }
    let ids: Vec<ValidatorId> = pairs.iter().map(|(id, _)| *id).collect();
    let coeffs = coefficients_at_zero(&ids)?;
    let mut acc = G1Projective::identity();
    for (coeff, (_, value)) in coeffs.iter().zip(pairs.iter()) {
        acc += *value * coeff;
    }
    Ok(acc)
}
