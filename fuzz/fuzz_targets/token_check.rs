//! Fuzz target for token verification.
//!
//! Arbitrary token strings must never panic and never verify against a
//! fixed secret.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rampart_csrf::{OsRandom, Secret, TokenCodec, Verification};
use std::sync::Arc;

fuzz_target!(|token: &str| {
    let codec = TokenCodec::new(Arc::new(OsRandom));
    let Some(secret) = Secret::parse("deadbeefdeadbeefdeadbeefdeadbeef") else {
        return;
    };

    assert_ne!(codec.check(&secret, token), Verification::Valid);
});
