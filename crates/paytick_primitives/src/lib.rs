#![forbid(unsafe_code)]
#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::result_large_err
)]

//! Paytick primitives: Keccak-256 hashing, domain-tagged digests, base16 text
//! codec, and fixed-width big-endian encodings.
//!
//! This crate holds the non-algorithmic utilities shared by the ticket engine:
//!
//! - One-shot and streaming Keccak-256
//! - Domain-tagged Keccak-256 with length framing (`h_tag`)
//! - Fixed-width big-endian integer encodings
//! - Constant-time equality for 32-byte digests
//! - Base16 encode/decode for transport and display

use sha3::{Digest, Keccak256};
use subtle::ConstantTimeEq;

/// 32-byte hash (Keccak-256 output).
pub type Digest32 = [u8; 32];

/// Width of every fixed-size record in the system (secrets, proofs, values).
pub const DIGEST_LEN: usize = 32;

pub mod base16;
pub mod constants;

/// Convert an unsigned integer to fixed-width big-endian bytes.
///
/// The output is exactly `W` bytes (no overlong encodings).
#[must_use]
pub fn be_bytes<const W: usize>(mut x: u128) -> [u8; W] {
    let mut out = [0u8; W];
    let mut i = W;
    while i > 0 {
        i -= 1;
        out[i] = (x & 0xFF) as u8;
        x >>= 8;
    }
    out
}

/// One-shot Keccak-256.
#[must_use]
pub fn keccak256(input: &[u8]) -> Digest32 {
    let mut hasher = Keccak256::new();
    hasher.update(input);
    finalize32(hasher)
}

/// Streaming Keccak-256 hasher with a cloneable intermediate state.
#[derive(Clone, Default)]
pub struct Keccak256Hasher(Keccak256);

impl Keccak256Hasher {
    #[must_use]
    pub fn new() -> Self {
        Self(Keccak256::new())
    }

    pub fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    #[must_use]
    pub fn finalize(self) -> Digest32 {
        finalize32(self.0)
    }
}

fn finalize32(hasher: Keccak256) -> Digest32 {
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Domain-tagged Keccak-256 with length framing:
/// `h_tag(tag, parts)` = `Keccak256`( UTF8(tag) || Σ ( BE(|p|,8) || p ) )
#[must_use]
pub fn h_tag(tag: &str, parts: &[&[u8]]) -> Digest32 {
    // All domain tags live in the `paytick.` namespace (debug builds assert it).
    debug_assert!(
        tag.starts_with("paytick."),
        "non-paytick.* domain tag: {tag}"
    );
    let mut hasher = Keccak256::new();
    hasher.update(tag.as_bytes());
    for p in parts {
        hasher.update(be_bytes::<8>(p.len() as u128));
        hasher.update(p);
    }
    finalize32(hasher)
}

/// Constant-time equality for two 32-byte digests.
#[must_use]
pub fn ct_eq_digest(a: &Digest32, b: &Digest32) -> bool {
    a.ct_eq(b).into()
}
