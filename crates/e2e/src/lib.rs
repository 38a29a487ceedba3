//! End-to-end integration tests for the paytick workspace
//!
//! Exercises the full pipeline across `paytick_primitives` and
//! `paytick_engine`: context binding, batch generation, transport encoding,
//! and independent verification.

#![forbid(unsafe_code)]
#![deny(warnings)]
