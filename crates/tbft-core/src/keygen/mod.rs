//! Trustless distributed key generation.
//!
//! Every validator acts as one of `n` proposers: it deals a fresh
//! bivariate symmetric polynomial, commits to it, and distributes one
//! encrypted row per validator. Recipients verify their rows against the
//! commitment and re-share point values so that each validator can
//! interpolate its key share once enough proposals are acknowledged.

mod dkg;
mod messages;

pub use dkg::{DkgPartyState, TrustlessKeygen};
pub use messages::{CommitMessage, ValueMessage};
