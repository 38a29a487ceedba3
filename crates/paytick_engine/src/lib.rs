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

//! Paytick engine — probabilistic value tickets.
//!
//! A ticket is a (secret, proof, value) triple. The proof is the Keccak-256
//! digest of the context preimage followed by the secret; the value is
//! `2^clz(digest)` where `clz` counts leading zero bits of the digest. More
//! leading zeros means an exponentially larger value, so tickets follow a
//! proof-of-work-style reward curve: overwhelmingly small, with rare and
//! exponentially larger winners.
//!
//! A [`Mixin`] binds generation and verification to a (chain, contract,
//! receiver, optional nonce) context. Tickets generated under one context are
//! worthless under any other: the context bytes are part of every scoring
//! preimage.

use paytick_primitives::{be_bytes, constants, ct_eq_digest, h_tag, Digest32, Keccak256Hasher};
use primitive_types::U256;
use rand_core::{OsRng, RngCore};
use thiserror::Error;

/// Width of every context field, secret, proof, and encoded value.
pub const RECORD_LEN: usize = paytick_primitives::DIGEST_LEN;

/// Iteration cap for the single-ticket search. The expected number of rounds
/// to reach a minimum value of `2^k` is `2^k`, so this cap bounds the
/// reachable minimum rather than the honest path; hostile minimums surface as
/// [`EngineError::Exhausted`] instead of an unbounded loop.
pub const MAX_SEARCH_ROUNDS: u64 = 1 << 24;

/// Error variants for format, arithmetic, and exhaustion failures.
///
/// A verification mismatch is never an error: verifiers return the recomputed
/// value and leave threshold decisions to the settlement layer.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    #[error("context field must be exactly {RECORD_LEN} bytes, got {0}")]
    BadFieldLength(usize),
    #[error("batch length {0} is not a multiple of the {RECORD_LEN}-byte record width")]
    Misaligned(usize),
    #[error("empty batch")]
    EmptyBatch,
    #[error("value accumulation overflow")]
    Overflow,
    #[error("search exhausted after {0} rounds")]
    Exhausted(u64),
}

/// Encode a value as 32-byte big-endian.
#[must_use]
pub fn u256_be(v: U256) -> [u8; RECORD_LEN] {
    let mut out = [0u8; RECORD_LEN];
    v.to_big_endian(&mut out);
    out
}

/// Value from a digest under the leading-zero-bit rule: `2^clz(digest)`.
///
/// The all-zero digest (256 leading zeros) is a legal, astronomically rare
/// outcome; `2^256` does not fit in a `U256`, so it saturates to `U256::MAX`.
#[must_use]
pub fn value_from_digest(digest: &Digest32) -> U256 {
    let zeros = U256::from_big_endian(digest).leading_zeros();
    if zeros >= 256 {
        U256::MAX
    } else {
        U256::one() << zeros
    }
}

/// Score a secret under a context preimage.
///
/// `digest = Keccak256(preimage || secret)`; the proof is the digest itself
/// and the value follows [`value_from_digest`]. Pure and stateless: identical
/// inputs always produce the identical (proof, value) pair.
#[must_use]
pub fn score(preimage: &[u8], secret: &[u8; RECORD_LEN]) -> (Digest32, U256) {
    let mut hasher = Keccak256Hasher::new();
    hasher.update(preimage);
    hasher.update(secret);
    let digest = hasher.finalize();
    let value = value_from_digest(&digest);
    (digest, value)
}

// ——— Record codec (flat 32-byte records, generation order) ———————————

/// Concatenate fixed-width records in order.
#[must_use]
pub fn encode_records(records: &[[u8; RECORD_LEN]]) -> Vec<u8> {
    let mut out = Vec::with_capacity(records.len() * RECORD_LEN);
    for r in records {
        out.extend_from_slice(r);
    }
    out
}

/// Exact inverse of [`encode_records`]. Empty buffers and buffers whose
/// length is not a multiple of the record width are format errors, never
/// silent truncation.
pub fn decode_records(src: &[u8]) -> Result<Vec<[u8; RECORD_LEN]>, EngineError> {
    if src.is_empty() {
        return Err(EngineError::EmptyBatch);
    }
    if src.len() % RECORD_LEN != 0 {
        return Err(EngineError::Misaligned(src.len()));
    }
    let mut out = Vec::with_capacity(src.len() / RECORD_LEN);
    for chunk in src.chunks_exact(RECORD_LEN) {
        let mut rec = [0u8; RECORD_LEN];
        rec.copy_from_slice(chunk);
        out.push(rec);
    }
    Ok(out)
}

// ——— Secret sampling —————————————————————————————————————————————————

/// Sampling policy, fixed by the presence of the context nonce.
///
/// Without a nonce secrets come from the OS CSPRNG. With a nonce they are a
/// deterministic stream `h_tag("paytick.secret.stream", [nonce, BE64(i)])`
/// with `i` starting at 0 for every generation call, so two mixins sharing a
/// context regenerate identical batches for audit.
enum SecretSampler {
    Random,
    Stream { nonce: [u8; RECORD_LEN], index: u64 },
}

impl SecretSampler {
    fn next_secret(&mut self) -> [u8; RECORD_LEN] {
        match self {
            Self::Random => {
                let mut secret = [0u8; RECORD_LEN];
                OsRng.fill_bytes(&mut secret);
                secret
            }
            Self::Stream { nonce, index } => {
                let secret = h_tag(
                    constants::TAG_SECRET_STREAM,
                    &[nonce.as_slice(), &be_bytes::<8>(u128::from(*index))],
                );
                *index += 1;
                secret
            }
        }
    }
}

// ——— Tickets and bundles —————————————————————————————————————————————

/// A single generated ticket: the atomic unit of value transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticket {
    secret: [u8; RECORD_LEN],
    proof: Digest32,
    value: U256,
}

impl Ticket {
    #[must_use]
    pub const fn to_secret(&self) -> [u8; RECORD_LEN] {
        self.secret
    }

    #[must_use]
    pub const fn to_proof(&self) -> Digest32 {
        self.proof
    }

    /// The value as 32-byte big-endian.
    #[must_use]
    pub fn to_value(&self) -> [u8; RECORD_LEN] {
        u256_be(self.value)
    }

    #[must_use]
    pub const fn value(&self) -> U256 {
        self.value
    }
}

/// An ordered batch of tickets whose values sum to at least the requested
/// target. Generation order is redemption order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedBundle {
    secrets: Vec<[u8; RECORD_LEN]>,
    proofs: Vec<Digest32>,
    total: U256,
}

impl GeneratedBundle {
    #[must_use]
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    #[must_use]
    pub fn secrets(&self) -> &[[u8; RECORD_LEN]] {
        &self.secrets
    }

    #[must_use]
    pub fn proofs(&self) -> &[Digest32] {
        &self.proofs
    }

    #[must_use]
    pub const fn total(&self) -> U256 {
        self.total
    }

    /// Flat concatenation of secrets in generation order.
    #[must_use]
    pub fn encode_secrets(&self) -> Vec<u8> {
        encode_records(&self.secrets)
    }

    /// Flat concatenation of proofs in generation order.
    #[must_use]
    pub fn encode_proofs(&self) -> Vec<u8> {
        encode_records(&self.proofs)
    }

    /// Aggregate value as 32-byte big-endian.
    #[must_use]
    pub fn encode_total(&self) -> [u8; RECORD_LEN] {
        u256_be(self.total)
    }
}

/// Per-ticket values and checked aggregate recomputed by a verifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedBatch {
    values: Vec<U256>,
    total: U256,
}

impl VerifiedBatch {
    #[must_use]
    pub fn values(&self) -> &[U256] {
        &self.values
    }

    #[must_use]
    pub const fn total(&self) -> U256 {
        self.total
    }

    /// Per-ticket values as concatenated 32-byte big-endian records.
    #[must_use]
    pub fn encode_values(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.values.len() * RECORD_LEN);
        for v in &self.values {
            out.extend_from_slice(&u256_be(*v));
        }
        out
    }

    #[must_use]
    pub fn encode_total(&self) -> [u8; RECORD_LEN] {
        u256_be(self.total)
    }
}

fn checked_sum(values: &[U256]) -> Result<U256, EngineError> {
    let mut total = U256::zero();
    for v in values {
        total = total.checked_add(*v).ok_or(EngineError::Overflow)?;
    }
    Ok(total)
}

// ——— Mixin: context binding, generation, verification ————————————————

/// A context-bound ticket mixin.
///
/// The context is immutable once constructed; every hash in generation and
/// verification is keyed by the preimage `chain_id || contract || receiver ||
/// nonce`. The nonce is omitted entirely when absent (96 vs 128 byte
/// preimage), which deliberately separates the nonced and non-nonced domains.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mixin {
    chain_id: [u8; RECORD_LEN],
    contract: [u8; RECORD_LEN],
    receiver: [u8; RECORD_LEN],
    nonce: Option<[u8; RECORD_LEN]>,
}

fn context_field(bytes: &[u8]) -> Result<[u8; RECORD_LEN], EngineError> {
    if bytes.len() != RECORD_LEN {
        return Err(EngineError::BadFieldLength(bytes.len()));
    }
    let mut out = [0u8; RECORD_LEN];
    out.copy_from_slice(bytes);
    Ok(out)
}

impl Mixin {
    /// Bind a context. Every field must be exactly 32 bytes; the mixin never
    /// pads (left-padding shorter semantic values is the caller's job).
    pub fn new(
        chain_id: &[u8],
        contract: &[u8],
        receiver: &[u8],
        nonce: Option<&[u8]>,
    ) -> Result<Self, EngineError> {
        Ok(Self {
            chain_id: context_field(chain_id)?,
            contract: context_field(contract)?,
            receiver: context_field(receiver)?,
            nonce: nonce.map(context_field).transpose()?,
        })
    }

    /// Bind a context from already-sized fields.
    #[must_use]
    pub const fn from_parts(
        chain_id: [u8; RECORD_LEN],
        contract: [u8; RECORD_LEN],
        receiver: [u8; RECORD_LEN],
        nonce: Option<[u8; RECORD_LEN]>,
    ) -> Self {
        Self {
            chain_id,
            contract,
            receiver,
            nonce,
        }
    }

    /// The scoring preimage: `chain_id || contract || receiver || nonce`,
    /// nonce omitted (not zero-filled) when absent.
    #[must_use]
    pub fn preimage(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 * RECORD_LEN);
        out.extend_from_slice(&self.chain_id);
        out.extend_from_slice(&self.contract);
        out.extend_from_slice(&self.receiver);
        if let Some(nonce) = &self.nonce {
            out.extend_from_slice(nonce);
        }
        out
    }

    fn sampler(&self) -> SecretSampler {
        self.nonce.map_or(SecretSampler::Random, |nonce| {
            SecretSampler::Stream { nonce, index: 0 }
        })
    }

    /// Single-ticket mode: sample and score until `value >= minimum`, bounded
    /// by [`MAX_SEARCH_ROUNDS`].
    pub fn generate_one(&self, minimum: U256) -> Result<Ticket, EngineError> {
        self.generate_one_with_cap(minimum, MAX_SEARCH_ROUNDS)
    }

    /// Single-ticket mode with an explicit round cap, for callers with a
    /// tighter resource envelope than the default.
    pub fn generate_one_with_cap(
        &self,
        minimum: U256,
        max_rounds: u64,
    ) -> Result<Ticket, EngineError> {
        let preimage = self.preimage();
        let mut sampler = self.sampler();
        for _ in 0..max_rounds {
            let secret = sampler.next_secret();
            let (proof, value) = score(&preimage, &secret);
            if value >= minimum {
                return Ok(Ticket {
                    secret,
                    proof,
                    value,
                });
            }
        }
        Err(EngineError::Exhausted(max_rounds))
    }

    /// Batch mode: every sampled ticket is accepted (low values still count
    /// toward the sum) and sampling stops as soon as `total >= target`.
    ///
    /// The stopping rule is checked before the first sample, so a zero target
    /// yields an empty bundle. Accumulation is checked; overflow aborts the
    /// call rather than wrapping.
    pub fn generate(&self, target: U256) -> Result<GeneratedBundle, EngineError> {
        let preimage = self.preimage();
        let mut sampler = self.sampler();
        let mut secrets = Vec::new();
        let mut proofs = Vec::new();
        let mut total = U256::zero();
        while total < target {
            let secret = sampler.next_secret();
            let (proof, value) = score(&preimage, &secret);
            total = total.checked_add(value).ok_or(EngineError::Overflow)?;
            secrets.push(secret);
            proofs.push(proof);
        }
        Ok(GeneratedBundle {
            secrets,
            proofs,
            total,
        })
    }

    /// Recompute the value of a revealed secret under this context.
    ///
    /// No threshold is enforced here; an unsatisfying value is data for the
    /// settlement layer, not an error.
    #[must_use]
    pub fn verify_secret(&self, secret: &[u8; RECORD_LEN]) -> U256 {
        let (_proof, value) = score(&self.preimage(), secret);
        value
    }

    /// Check that a presented proof is the scoring digest of `secret` under
    /// this context. Constant-time digest comparison; a mismatch is data
    /// (a forged or foreign proof), not an error.
    #[must_use]
    pub fn verify_binding(&self, secret: &[u8; RECORD_LEN], proof: &Digest32) -> bool {
        let (recomputed, _value) = score(&self.preimage(), secret);
        ct_eq_digest(&recomputed, proof)
    }

    /// Recompute per-ticket values and the checked aggregate for a flat
    /// buffer of revealed secrets. Empty or misaligned buffers are format
    /// errors.
    pub fn verify_secrets(&self, secrets_bytes: &[u8]) -> Result<VerifiedBatch, EngineError> {
        let preimage = self.preimage();
        let values: Vec<U256> = decode_records(secrets_bytes)?
            .iter()
            .map(|secret| score(&preimage, secret).1)
            .collect();
        let total = checked_sum(&values)?;
        Ok(VerifiedBatch { values, total })
    }
}

// Proofs are value-transparent: a proof is the scoring digest itself, so its
// value is recomputable from the proof alone via the leading-zero-bit rule.
// What cannot be checked without the secret is authenticity, which is why
// these take no context.

/// Check a proof's format and recompute its value.
pub fn verify_proof(proof_bytes: &[u8]) -> Result<U256, EngineError> {
    let proof = context_field(proof_bytes)?;
    Ok(value_from_digest(&proof))
}

/// Batch analogue of [`verify_proof`], with the same format rules as
/// [`Mixin::verify_secrets`].
pub fn verify_proofs(proofs_bytes: &[u8]) -> Result<VerifiedBatch, EngineError> {
    let values: Vec<U256> = decode_records(proofs_bytes)?
        .iter()
        .map(value_from_digest)
        .collect();
    let total = checked_sum(&values)?;
    Ok(VerifiedBatch { values, total })
}
