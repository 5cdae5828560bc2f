//! Fuzz target for the request guard.
//!
//! Feeds arbitrary methods, paths, cookies, headers and bodies through
//! `CsrfGuard::evaluate`. Unsafe requests must never pass without a token
//! derived from the cookie secret.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rampart_csrf::{CsrfConfig, CsrfGuard, Outcome};
use rampart_http::HttpRequest;

#[derive(Debug, Arbitrary)]
struct FuzzRequest {
    method: String,
    path: String,
    cookie: Option<String>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

fuzz_target!(|data: FuzzRequest| {
    let Ok(guard) = CsrfGuard::new(CsrfConfig::default()) else {
        return;
    };

    let mut req = HttpRequest::new(data.method, data.path).with_body(data.body);
    for (name, value) in &data.headers {
        req.append_header(name, value);
    }
    if let Some(cookie) = data.cookie {
        req = req.with_header("Cookie", cookie);
    }

    if let Ok(decision) = guard.evaluate(&req) {
        // Random input cannot carry a valid MAC.
        assert_ne!(decision.outcome, Outcome::Verified);
    }
});
