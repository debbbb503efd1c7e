//! Threshold signing over freshly generated DKG keys.

mod common;

use tbft_core::{AddShareOutcome, RejectReason, Signature, ThresholdSigner};

fn signer(keyrings: &[tbft_core::ThresholdKeyring], id: usize, msg: &[u8]) -> ThresholdSigner {
    ThresholdSigner::new(
        keyrings[id].signature_share().clone(),
        keyrings[id].public_key_set().clone(),
        msg,
    )
}

#[test]
fn dkg_keys_sign_and_verify() {
    common::init_tracing();
    let keyrings = common::run_dkg(4, 1);
    let msg = b"round 12 proposal digest";

    // Every validator broadcasts its share; every validator assembles.
    let wires: Vec<_> = (0..4)
        .map(|id| signer(&keyrings, id, msg).share_message())
        .collect();

    let mut signatures: Vec<Signature> = Vec::new();
    for id in 0..4 {
        let mut collector = signer(&keyrings, id, msg);
        let mut complete = None;
        for wire in &wires {
            if let AddShareOutcome::Complete(s) = collector.handle_message(wire).unwrap() {
                complete = Some(s);
                break;
            }
        }
        signatures.push(complete.expect("threshold + 1 shares assemble"));
    }

    // All validators agree on one unique signature over this message.
    let joint = &signatures[0];
    assert!(signatures.iter().all(|s| s == joint));
    assert!(joint.verify(keyrings[0].shared_public_key(), msg));
    assert!(!joint.verify(keyrings[0].shared_public_key(), b"different digest"));

    let restored = Signature::from_bytes(&joint.to_bytes()).unwrap();
    assert_eq!(&restored, joint);
}

#[test]
fn below_threshold_never_assembles() {
    let keyrings = common::run_dkg(4, 1);
    let msg = b"round 3 proposal digest";

    let mut collector = signer(&keyrings, 0, msg);
    let only = signer(&keyrings, 2, msg).share_message();
    let out = collector.handle_message(&only).unwrap();
    assert!(matches!(
        out,
        AddShareOutcome::Accepted {
            collected: 1,
            required: 2
        }
    ));
    assert!(collector.signature().is_none());

    // A duplicate of the same share does not help.
    let out = collector.handle_message(&only).unwrap();
    assert!(matches!(
        out,
        AddShareOutcome::Rejected(RejectReason::AlreadyRecorded)
    ));
    assert!(collector.signature().is_none());
}

#[test]
fn invalid_share_does_not_block_assembly() {
    let keyrings = common::run_dkg(4, 1);
    let msg = b"round 9 proposal digest";

    let mut collector = signer(&keyrings, 0, msg);

    // A share over the wrong message under a legitimate key.
    let mut forged = signer(&keyrings, 1, b"stale digest").share_message();
    let out = collector.handle_message(&forged).unwrap();
    assert!(matches!(
        out,
        AddShareOutcome::Rejected(RejectReason::InvalidShare)
    ));

    // Mangled share bytes are a decode error, not a panic.
    forged.share.truncate(10);
    assert!(collector.handle_message(&forged).is_err());

    // Honest shares still assemble afterwards.
    collector
        .handle_message(&signer(&keyrings, 2, msg).share_message())
        .unwrap();
    let out = collector
        .handle_message(&signer(&keyrings, 3, msg).share_message())
        .unwrap();
    let joint = match out {
        AddShareOutcome::Complete(s) => s,
        other => panic!("expected Complete, got {:?}", other),
    };
    assert!(joint.verify(keyrings[0].shared_public_key(), msg));
}
