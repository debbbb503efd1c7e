//! Shared helpers for driving a full committee in-process.

#![allow(dead_code)]

use rand::rngs::OsRng;

use tbft_core::keygen::{CommitMessage, ValueMessage};
use tbft_core::{sealed, ProtocolParams, ThresholdKeyring, TrustlessKeygen};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A fresh committee with one long-lived envelope key pair per validator
pub fn committee(n: usize, f: usize) -> (Vec<TrustlessKeygen>, Vec<sealed::PublicKey>) {
    let params = ProtocolParams::new(n, f).unwrap();
    let secrets: Vec<sealed::SecretKey> = (0..n)
        .map(|_| sealed::SecretKey::generate(&mut OsRng))
        .collect();
    let publics: Vec<sealed::PublicKey> = secrets.iter().map(|s| s.public_key()).collect();
    let nodes = secrets
        .into_iter()
        .enumerate()
        .map(|(id, secret)| TrustlessKeygen::new(params, id, secret, publics.clone()).unwrap())
        .collect();
    (nodes, publics)
}

/// Run an honest DKG to completion and return every validator's keyring
pub fn run_dkg(n: usize, f: usize) -> Vec<ThresholdKeyring> {
    let (mut nodes, _) = committee(n, f);

    let commits: Vec<CommitMessage> = nodes.iter().map(|node| node.start(&mut OsRng)).collect();
    let mut value_msgs: Vec<(usize, ValueMessage)> = Vec::new();
    for receiver in 0..n {
        for (proposer, commit) in commits.iter().enumerate() {
            let msg = nodes[receiver]
                .handle_commit(proposer, commit, &mut OsRng)
                .unwrap();
            value_msgs.push((receiver, msg));
        }
    }
    for (sender, msg) in &value_msgs {
        for node in nodes.iter_mut() {
            node.handle_value(*sender, msg).unwrap();
        }
    }

    nodes
        .iter()
        .map(|node| {
            node.try_get_keys()
                .unwrap()
                .expect("honest run must complete")
        })
        .collect()
}
