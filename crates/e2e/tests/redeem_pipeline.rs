//! Full generate → encode → transport → verify pipeline against a known
//! on-chain context.

use paytick_engine::{verify_proofs, EngineError, Mixin};
use paytick_primitives::base16;
use primitive_types::U256;

const CONTRACT: &str = "B57ee0797C3fc0205714a577c02F7205bB89dF30";
const RECEIVER: &str = "5B38Da6a701c568545dCfcB03FcB875f56beddC4";

/// Left-pad a base16 field to the 32-byte context width and decode it.
fn context_field(base16_text: &str) -> Vec<u8> {
    let padded = format!("{base16_text:0>64}");
    base16::decode_mixed(&padded).unwrap()
}

fn known_mixin() -> Mixin {
    let chain_id = context_field("1");
    let contract = context_field(CONTRACT);
    let receiver = context_field(RECEIVER);
    Mixin::new(&chain_id, &contract, &receiver, None).unwrap()
}

#[test]
fn generate_batch_for_known_context_and_verify() {
    let mixin = known_mixin();
    let target = U256::from(10_000u32);

    let bundle = mixin.generate(target).unwrap();
    assert!(!bundle.is_empty());

    // The encoded total decodes to an integer meeting the target.
    let total = U256::from_big_endian(&bundle.encode_total());
    assert!(total >= target);
    assert_eq!(total, bundle.total());

    // Transport as base16 text and back, as a remote verifier would receive it.
    let secrets_text = base16::encode_lower(&bundle.encode_secrets());
    let secrets_bytes = base16::decode_lower(&secrets_text).unwrap();

    // An independent verifier bound to the same context recovers the total.
    let verifier = known_mixin();
    let verified = verifier.verify_secrets(&secrets_bytes).unwrap();
    assert_eq!(verified.total(), bundle.total());
    assert_eq!(verified.values().len(), bundle.len());
    let sum = verified
        .values()
        .iter()
        .fold(U256::zero(), |acc, v| acc + *v);
    assert_eq!(sum, verified.total());
}

#[test]
fn proofs_alone_recover_the_same_total() {
    let mixin = known_mixin();
    let bundle = mixin.generate(U256::from(10_000u32)).unwrap();

    // Proofs are value-transparent digests: their values are recomputable
    // without the secrets, and they never reveal the secrets themselves.
    let verified = verify_proofs(&bundle.encode_proofs()).unwrap();
    assert_eq!(verified.total(), bundle.total());
    for (proof, secret) in bundle.proofs().iter().zip(bundle.secrets()) {
        assert_ne!(proof, secret);
        // Each proof binds to its secret under the generating context.
        assert!(mixin.verify_binding(secret, proof));
    }
}

#[test]
fn foreign_context_yields_different_values() {
    let mixin = known_mixin();
    let bundle = mixin.generate(U256::from(10_000u32)).unwrap();

    // Same secrets replayed against a different receiver do not reproduce
    // the redeemed total.
    let chain_id = context_field("1");
    let contract = context_field(CONTRACT);
    let other_receiver = context_field(CONTRACT);
    let foreign = Mixin::new(&chain_id, &contract, &other_receiver, None).unwrap();
    let replayed = foreign.verify_secrets(&bundle.encode_secrets()).unwrap();
    let honest = mixin.verify_secrets(&bundle.encode_secrets()).unwrap();
    assert_ne!(replayed.values(), honest.values());
}

#[test]
fn empty_batch_is_a_format_error_not_zero_value() {
    let mixin = known_mixin();
    assert_eq!(mixin.verify_secrets(&[]), Err(EngineError::EmptyBatch));
    assert_eq!(verify_proofs(&[]), Err(EngineError::EmptyBatch));
}
