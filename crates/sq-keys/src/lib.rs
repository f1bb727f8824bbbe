//! Ed25519 identity and request signing for the sqlway SDK.
//!
//! The data platform authenticates clients by challenge: the service issues
//! a single-use auth code, the client signs it with its Ed25519 private key
//! and submits the 128-character hex signature together with the base64
//! public key. This crate owns the pure-computation half of that handshake:
//!
//! 1. [`Keypair`]: generation, decoding and encoding of the client identity
//! 2. [`sign`]: deterministic signing of an auth code
//!
//! No I/O happens here. Persisting the active identity and speaking to the
//! auth endpoints is `sq-auth`'s job.

pub mod errors;
pub mod keypair;
pub mod sign;

pub use errors::{KeyError, Result};
pub use keypair::{Keypair, KEY_LEN, SIGNATURE_LEN};
pub use sign::{sign, SignedMessage, SIGNATURE_HEX_LEN};
