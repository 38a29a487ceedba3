#![forbid(unsafe_code)]

//! Domain tags for every `h_tag` use in the workspace.

/// Deterministic secret stream: `h_tag(TAG_SECRET_STREAM, [nonce, BE64(index)])`.
pub const TAG_SECRET_STREAM: &str = "paytick.secret.stream";

/// All public domain tags, for namespace audits.
pub const PAYTICK_TAGS: &[&str] = &[TAG_SECRET_STREAM];
