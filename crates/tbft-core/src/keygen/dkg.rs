//! DKG state machine

use blstrs::{G2Projective, Scalar};
use ff::Field;
use group::Group;
use rand_core::{CryptoRng, RngCore};
use tracing::{debug, info, instrument, warn};
use zeroize::Zeroizing;

use crate::curve::{self, evaluation_point};
use crate::keys::{PrivateKeyShare, PublicKey, PublicKeySet, PublicKeyShare, ThresholdKeyring};
use crate::lagrange;
use crate::poly::{evaluate_univariate, evaluate_univariate_g2, BivariatePolynomial, Commitment};
use crate::sealed;
use crate::types::{ProtocolParams, ValidatorId};
use crate::{Error, Result};

use super::{CommitMessage, ValueMessage};

/// Per-proposer accumulation state during a DKG run.
///
/// One commitment is accepted at most once; a value slot is written at
/// most once per `(proposer, sender)` pair.
pub struct DkgPartyState {
    commitment: Option<Commitment>,
    values: Vec<Option<Scalar>>,
    acks: Vec<bool>,
}

impl DkgPartyState {
    fn new(n: usize) -> Self {
        Self {
            commitment: None,
            values: vec![None; n],
            acks: vec![false; n],
        }
    }

    /// Number of validators whose value for this proposer was verified
    pub fn value_count(&self) -> usize {
        self.acks.iter().filter(|acked| **acked).count()
    }

    pub fn commitment(&self) -> Option<&Commitment> {
        self.commitment.as_ref()
    }
}

/// One validator's view of a trustless key-generation round.
///
/// Handlers are short, synchronous, CPU-bound units of work; the machine
/// never blocks. Waiting for more messages is expressed by
/// [`TrustlessKeygen::finished`] staying false and
/// [`TrustlessKeygen::try_get_keys`] returning `None`. The caller must
/// serialize calls into one instance; independent instances (one per
/// epoch) may run in parallel.
pub struct TrustlessKeygen {
    params: ProtocolParams,
    local_id: ValidatorId,
    secret: sealed::SecretKey,
    recipients: Vec<sealed::PublicKey>,
    parties: Vec<DkgPartyState>,
}

impl TrustlessKeygen {
    /// Create a session for `local_id`, holding the local envelope secret
    /// and the committee's envelope public keys in validator order.
    pub fn new(
        params: ProtocolParams,
        local_id: ValidatorId,
        secret: sealed::SecretKey,
        recipients: Vec<sealed::PublicKey>,
    ) -> Result<Self> {
        if recipients.len() != params.n() {
            return Err(Error::InvalidConfig(format!(
                "expected {} envelope keys, got {}",
                params.n(),
                recipients.len()
            )));
        }
        if local_id >= params.n() {
            return Err(Error::InvalidConfig(format!(
                "validator id {} out of range for committee of {}",
                local_id, params.n()
            )));
        }
        if secret.public_key() != recipients[local_id] {
            return Err(Error::InvalidConfig(
                "local envelope secret does not match the registered public key".into(),
            ));
        }
        let parties = (0..params.n())
            .map(|_| DkgPartyState::new(params.n()))
            .collect();
        Ok(Self {
            params,
            local_id,
            secret,
            recipients,
            parties,
        })
    }

    pub fn params(&self) -> ProtocolParams {
        self.params
    }

    pub fn local_id(&self) -> ValidatorId {
        self.local_id
    }

    /// Deal a fresh degree-`f` polynomial: commit to it and seal one row
    /// per validator. The polynomial itself is discarded once the rows
    /// are distributed.
    #[instrument(skip(self, rng), fields(local = self.local_id))]
    pub fn start<R: RngCore + CryptoRng>(&self, rng: &mut R) -> CommitMessage {
        info!(
            n = self.params.n(),
            f = self.params.f(),
            "dealing key-generation polynomial"
        );
        let poly = BivariatePolynomial::random(self.params.f(), rng);
        let commitment = poly.commit();

        let mut encrypted_rows = Vec::with_capacity(self.params.n());
        for (id, recipient) in self.recipients.iter().enumerate() {
            let row = poly.evaluate_row(&evaluation_point(id));
            let mut plain =
                Zeroizing::new(Vec::with_capacity(row.len() * curve::SCALAR_BYTES));
            for coeff in &row {
                plain.extend_from_slice(&curve::scalar_to_bytes(coeff));
            }
            encrypted_rows.push(sealed::seal(rng, recipient, &plain));
        }

        CommitMessage {
            commitment: commitment.to_bytes(),
            encrypted_rows,
        }
    }

    /// Fold in a proposer's commitment. On success the decrypted local
    /// row checks out against the commitment and the re-shared point
    /// values are returned for broadcast.
    ///
    /// A structurally valid commitment is recorded even when the locally
    /// addressed row cannot be decrypted, parsed, or verified: other
    /// validators' relayed values for this proposer must stay
    /// verifiable. In those cases no `ValueMessage` is produced and the
    /// failure is surfaced so the outer layer can flag the sender as
    /// faulty.
    #[instrument(skip(self, msg, rng), fields(local = self.local_id))]
    pub fn handle_commit<R: RngCore + CryptoRng>(
        &mut self,
        sender: ValidatorId,
        msg: &CommitMessage,
        rng: &mut R,
    ) -> Result<ValueMessage> {
        if sender >= self.params.n() {
            return Err(Error::MalformedMessage(format!(
                "sender {} out of range for committee of {}",
                sender,
                self.params.n()
            )));
        }
        if msg.encrypted_rows.len() != self.params.n() {
            return Err(Error::MalformedMessage(format!(
                "expected {} encrypted rows, got {}",
                self.params.n(),
                msg.encrypted_rows.len()
            )));
        }
        let commitment = Commitment::from_bytes(&msg.commitment)?;
        if commitment.degree() != self.params.f() {
            return Err(Error::MalformedMessage(format!(
                "commitment degree {} does not match f = {}",
                commitment.degree(),
                self.params.f()
            )));
        }
        if self.parties[sender].commitment.is_some() {
            return Err(Error::DoubleCommit(sender));
        }

        let committed_row = commitment.evaluate_row(&evaluation_point(self.local_id));
        self.parties[sender].commitment = Some(commitment);

        let row = match self.decrypt_row(&msg.encrypted_rows[self.local_id]) {
            Ok(row) => row,
            Err(err) => {
                warn!(sender, "local row cannot be opened, flagging proposer");
                return Err(err);
            }
        };
        let consistent = row
            .iter()
            .zip(committed_row.iter())
            .all(|(coeff, point)| G2Projective::generator() * coeff == *point);
        if !consistent {
            warn!(sender, "row does not match commitment, flagging proposer");
            return Err(Error::CommitmentMismatch(sender));
        }
        debug!(sender, "commitment accepted, re-sharing point values");

        let mut encrypted_values = Vec::with_capacity(self.params.n());
        for (id, recipient) in self.recipients.iter().enumerate() {
            let value = evaluate_univariate(&row, &evaluation_point(id));
            encrypted_values.push(sealed::seal(
                rng,
                recipient,
                &curve::scalar_to_bytes(&value),
            ));
        }
        Ok(ValueMessage {
            proposer: sender,
            encrypted_values,
        })
    }

    /// Fold in a sender's re-shared value for one proposer
    #[instrument(skip(self, msg), fields(local = self.local_id))]
    pub fn handle_value(&mut self, sender: ValidatorId, msg: &ValueMessage) -> Result<()> {
        if sender >= self.params.n() || msg.proposer >= self.params.n() {
            return Err(Error::MalformedMessage(format!(
                "sender {} or proposer {} out of range for committee of {}",
                sender,
                msg.proposer,
                self.params.n()
            )));
        }
        if msg.encrypted_values.len() != self.params.n() {
            return Err(Error::MalformedMessage(format!(
                "expected {} encrypted values, got {}",
                self.params.n(),
                msg.encrypted_values.len()
            )));
        }
        if self.parties[msg.proposer].acks[sender] {
            return Err(Error::DuplicateValue {
                proposer: msg.proposer,
                sender,
            });
        }
        let commitment = self.parties[msg.proposer]
            .commitment
            .as_ref()
            .ok_or(Error::MissingCommitment(msg.proposer))?;

        let plain = sealed::open(&self.secret, &msg.encrypted_values[self.local_id])?;
        let value = curve::scalar_from_bytes(&plain)?;
        let expected = commitment.evaluate(
            &evaluation_point(self.local_id),
            &evaluation_point(sender),
        );
        if G2Projective::generator() * value != expected {
            warn!(
                sender,
                proposer = msg.proposer,
                "value does not match commitment, flagging sender"
            );
            return Err(Error::ValueMismatch {
                proposer: msg.proposer,
                sender,
            });
        }

        let state = &mut self.parties[msg.proposer];
        state.values[sender] = Some(value);
        state.acks[sender] = true;
        debug!(
            sender,
            proposer = msg.proposer,
            acks = state.value_count(),
            "value recorded"
        );
        Ok(())
    }

    /// True iff more than `f` proposers have more than `2f` acknowledged
    /// values each. The double threshold guarantees that at least one
    /// honest proposer's polynomial is included and that no coalition of
    /// `f` or fewer can bias the output.
    pub fn finished(&self) -> bool {
        self.qualifying().count() > self.params.f()
    }

    fn qualifying(&self) -> impl Iterator<Item = (ValidatorId, &DkgPartyState)> {
        let f = self.params.f();
        self.parties
            .iter()
            .enumerate()
            .filter(move |(_, state)| state.value_count() > 2 * f)
    }

    /// Derive the final keyring once the completion criteria hold.
    /// Returns `None` while the session is still waiting for messages;
    /// the caller re-invokes on later arrivals.
    #[instrument(skip(self), fields(local = self.local_id))]
    pub fn try_get_keys(&self) -> Result<Option<ThresholdKeyring>> {
        if !self.finished() {
            return Ok(None);
        }
        let required = self.params.f() + 1;
        let mut master_row = vec![G2Projective::identity(); required];
        let mut secret = Scalar::ZERO;

        for (proposer, state) in self.qualifying() {
            let commitment = state.commitment.as_ref().ok_or_else(|| {
                Error::InternalInvariant(format!(
                    "proposer {} has acknowledged values but no commitment",
                    proposer
                ))
            })?;
            for (dst, src) in master_row
                .iter_mut()
                .zip(commitment.evaluate_row(&Scalar::ZERO))
            {
                *dst += src;
            }

            let pairs: Vec<(ValidatorId, Scalar)> = state
                .values
                .iter()
                .enumerate()
                .filter_map(|(id, value)| value.map(|v| (id, v)))
                .take(required)
                .collect();
            if pairs.len() < required {
                return Err(Error::InternalInvariant(format!(
                    "proposer {} qualifies with fewer than {} recorded values",
                    proposer, required
                )));
            }
            secret += lagrange::interpolate_scalar_at_zero(&pairs, required)?;
        }

        let shares: Vec<PublicKeyShare> = (0..self.params.n())
            .map(|id| PublicKeyShare(evaluate_univariate_g2(&master_row, &evaluation_point(id))))
            .collect();
        if G2Projective::generator() * secret != shares[self.local_id].0 {
            return Err(Error::InternalInvariant(
                "derived private share disagrees with the derived public key share".into(),
            ));
        }

        let public_key = PublicKey(master_row[0]);
        info!(
            public_key = hex::encode(public_key.to_bytes()),
            "key generation finished"
        );
        let key_set = PublicKeySet::new(public_key, shares, self.params.f());
        let share = PrivateKeyShare::new(self.local_id, secret);
        Ok(Some(ThresholdKeyring::new(share, key_set)))
    }

    fn decrypt_row(&self, sealed_row: &[u8]) -> Result<Vec<Scalar>> {
        let plain = sealed::open(&self.secret, sealed_row)?;
        let expected = (self.params.f() + 1) * curve::SCALAR_BYTES;
        if plain.len() != expected {
            return Err(Error::Deserialization(format!(
                "row plaintext must be {} bytes, got {}",
                expected,
                plain.len()
            )));
        }
        plain
            .chunks_exact(curve::SCALAR_BYTES)
            .map(curve::scalar_from_bytes)
            .collect()
    }
}
