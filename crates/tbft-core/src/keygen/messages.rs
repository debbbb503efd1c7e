//! DKG message types

use serde::{Deserialize, Serialize};

use crate::types::ValidatorId;

/// Round 1 message: a proposer's commitment plus one encrypted polynomial
/// row per validator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitMessage {
    /// Serialized [`crate::poly::Commitment`]
    pub commitment: Vec<u8>,
    /// Sealed row (`f + 1` scalars) for each of the `n` validators, in
    /// validator order
    pub encrypted_rows: Vec<Vec<u8>>,
}

/// Round 2 message: the sender's re-encrypted point values of one
/// proposer's row, one sealed scalar per validator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueMessage {
    /// The validator whose polynomial these values come from
    pub proposer: ValidatorId,
    /// Sealed scalar for each of the `n` validators, in validator order
    pub encrypted_values: Vec<Vec<u8>>,
}
