//! Concurrent arena of key-generation sessions keyed by epoch.
//!
//! A validator runs at most one [`TrustlessKeygen`] per epoch but may
//! have several epochs in flight while the committee rotates. The arena
//! routes incoming messages to the right session; each session is
//! mutated under the map's exclusive entry lock, so handlers stay
//! single-writer without any extra synchronization.

use dashmap::DashMap;
use rand_core::{CryptoRng, RngCore};
use tracing::{info, warn};

use crate::keygen::{CommitMessage, TrustlessKeygen, ValueMessage};
use crate::keys::ThresholdKeyring;
use crate::types::{Epoch, ValidatorId};
use crate::{Error, Result};

/// Registry of independent key-generation sessions, one per epoch
#[derive(Default)]
pub struct KeygenSessions {
    sessions: DashMap<Epoch, TrustlessKeygen>,
}

impl KeygenSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a session for `epoch`. Registering an epoch twice is a
    /// configuration error and leaves the existing session untouched.
    pub fn register(&self, epoch: Epoch, keygen: TrustlessKeygen) -> Result<()> {
        match self.sessions.entry(epoch) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(Error::InvalidConfig(format!(
                "epoch {} already has a key-generation session",
                epoch
            ))),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                info!(epoch, "key-generation session registered");
                slot.insert(keygen);
                Ok(())
            }
        }
    }

    /// Route a commitment into the epoch's session
    pub fn handle_commit<R: RngCore + CryptoRng>(
        &self,
        epoch: Epoch,
        sender: ValidatorId,
        msg: &CommitMessage,
        rng: &mut R,
    ) -> Result<ValueMessage> {
        let mut session = self.get_mut(epoch)?;
        session.handle_commit(sender, msg, rng)
    }

    /// Route a value message into the epoch's session
    pub fn handle_value(&self, epoch: Epoch, sender: ValidatorId, msg: &ValueMessage) -> Result<()> {
        let mut session = self.get_mut(epoch)?;
        session.handle_value(sender, msg)
    }

    pub fn finished(&self, epoch: Epoch) -> Result<bool> {
        let session = self
            .sessions
            .get(&epoch)
            .ok_or(Error::UnknownEpoch(epoch))?;
        Ok(session.finished())
    }

    /// Poll the epoch's session for completed key material
    pub fn try_get_keys(&self, epoch: Epoch) -> Result<Option<ThresholdKeyring>> {
        let session = self
            .sessions
            .get(&epoch)
            .ok_or(Error::UnknownEpoch(epoch))?;
        session.try_get_keys()
    }

    /// Drop the epoch's session, returning it if it existed
    pub fn remove(&self, epoch: Epoch) -> Option<TrustlessKeygen> {
        self.sessions.remove(&epoch).map(|(_, session)| session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn get_mut(
        &self,
        epoch: Epoch,
    ) -> Result<dashmap::mapref::one::RefMut<'_, Epoch, TrustlessKeygen>> {
        self.sessions.get_mut(&epoch).ok_or_else(|| {
            warn!(epoch, "message for unknown key-generation epoch");
            Error::UnknownEpoch(epoch)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sealed;
    use crate::types::ProtocolParams;
    use rand::rngs::OsRng;

    fn session(local_id: ValidatorId, secrets: &[sealed::SecretKey]) -> TrustlessKeygen {
        let params = ProtocolParams::new(4, 1).unwrap();
        let recipients = secrets.iter().map(|s| s.public_key()).collect();
        TrustlessKeygen::new(params, local_id, secrets[local_id].clone(), recipients).unwrap()
    }

    fn envelope_secrets(n: usize) -> Vec<sealed::SecretKey> {
        (0..n).map(|_| sealed::SecretKey::generate(&mut OsRng)).collect()
    }

    #[test]
    fn register_rejects_duplicate_epoch() {
        let secrets = envelope_secrets(4);
        let sessions = KeygenSessions::new();
        sessions.register(7, session(0, &secrets)).unwrap();
        assert_eq!(sessions.len(), 1);

        let err = sessions.register(7, session(0, &secrets)).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn unknown_epoch_is_reported() {
        let sessions = KeygenSessions::new();
        assert!(matches!(sessions.finished(3), Err(Error::UnknownEpoch(3))));
        assert!(matches!(
            sessions.try_get_keys(3),
            Err(Error::UnknownEpoch(3))
        ));

        let secrets = envelope_secrets(4);
        let commit = session(1, &secrets).start(&mut OsRng);
        assert!(matches!(
            sessions.handle_commit(3, 1, &commit, &mut OsRng),
            Err(Error::UnknownEpoch(3))
        ));
    }

    #[test]
    fn messages_are_routed_per_epoch() {
        let secrets = envelope_secrets(4);
        let sessions = KeygenSessions::new();
        sessions.register(1, session(0, &secrets)).unwrap();
        sessions.register(2, session(0, &secrets)).unwrap();

        let dealer = session(1, &secrets);
        let commit = dealer.start(&mut OsRng);
        sessions.handle_commit(1, 1, &commit, &mut OsRng).unwrap();

        // Epoch 2 never saw the commitment, so a second delivery there
        // still succeeds while epoch 1 reports the duplicate.
        assert!(matches!(
            sessions.handle_commit(1, 1, &commit, &mut OsRng),
            Err(Error::DoubleCommit(1))
        ));
        sessions.handle_commit(2, 1, &commit, &mut OsRng).unwrap();

        assert!(!sessions.finished(1).unwrap());
        assert!(sessions.try_get_keys(1).unwrap().is_none());

        assert!(sessions.remove(1).is_some());
        assert!(sessions.remove(1).is_none());
        assert_eq!(sessions.len(), 1);
    }
}
