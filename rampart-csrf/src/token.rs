use crate::error::{ErrorSignal, Result};
use crate::random::RandomSource;
use crate::secret::Secret;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

type HmacSha256 = Hmac<Sha256>;

/// Random bytes per token
pub const NONCE_LEN: usize = 16;
/// HMAC-SHA256 output size
pub const MAC_LEN: usize = 32;

const NONCE_ENCODED_LEN: usize = 22;
const MAC_ENCODED_LEN: usize = 43;
const SEPARATOR: u8 = b'.';

/// Length of every token produced by [`TokenCodec::issue`]
pub const TOKEN_LEN: usize = NONCE_ENCODED_LEN + 1 + MAC_ENCODED_LEN;

/// Token issued for the current request, stored in request extensions for
/// handlers to embed in forms or responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(pub String);

impl CsrfToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Outcome of checking a token against a secret
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Valid,
    /// Not shaped like a token; the MAC was never computed
    Malformed,
    /// Well formed, but not derived from this secret
    Mismatch,
}

impl Verification {
    /// The rejection this outcome maps to, if any
    pub fn signal(self) -> Option<ErrorSignal> {
        match self {
            Verification::Valid => None,
            Verification::Malformed => Some(ErrorSignal::MalformedToken),
            Verification::Mismatch => Some(ErrorSignal::TokenMismatch),
        }
    }
}

/// Derives tokens from a secret and checks them.
///
/// A token is `<nonce>.<mac>` with `mac = HMAC-SHA256(secret, nonce)`, both
/// halves URL-safe base64 without padding. Every issued token carries a
/// fresh nonce, so tokens differ per call while all of them verify against
/// the same secret.
#[derive(Clone)]
pub struct TokenCodec {
    random: Arc<dyn RandomSource>,
}

impl TokenCodec {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    /// Issue a new token for `secret`.
    pub fn issue(&self, secret: &Secret) -> Result<String> {
        let mut nonce = [0u8; NONCE_LEN];
        self.random.fill(&mut nonce)?;

        let mac = Self::mac(secret, &nonce).finalize().into_bytes();

        let mut token = String::with_capacity(TOKEN_LEN);
        token.push_str(&URL_SAFE_NO_PAD.encode(nonce));
        token.push(SEPARATOR as char);
        token.push_str(&URL_SAFE_NO_PAD.encode(mac));
        Ok(token)
    }

    /// Check `token` against `secret`. Never panics on hostile input.
    pub fn check(&self, secret: &Secret, token: &str) -> Verification {
        // Shape first, so garbage never reaches the MAC.
        let bytes = token.as_bytes();
        if bytes.len() != TOKEN_LEN || bytes[NONCE_ENCODED_LEN] != SEPARATOR {
            return Verification::Malformed;
        }
        let (nonce_part, mac_part) = (&bytes[..NONCE_ENCODED_LEN], &bytes[NONCE_ENCODED_LEN + 1..]);

        // Strict decoding rejects non-canonical trailing bits, so every
        // character of the token is significant.
        let mut nonce = [0u8; NONCE_LEN];
        let mut mac = [0u8; MAC_LEN];
        match (
            URL_SAFE_NO_PAD.decode_slice(nonce_part, &mut nonce),
            URL_SAFE_NO_PAD.decode_slice(mac_part, &mut mac),
        ) {
            (Ok(NONCE_LEN), Ok(MAC_LEN)) => {}
            _ => return Verification::Malformed,
        }

        // `verify_slice` compares in constant time.
        match Self::mac(secret, &nonce).verify_slice(&mac) {
            Ok(()) => Verification::Valid,
            Err(_) => Verification::Mismatch,
        }
    }

    /// Whether `token` was issued for `secret`
    pub fn verify(&self, secret: &Secret, token: &str) -> bool {
        self.check(secret, token) == Verification::Valid
    }

    fn mac(secret: &Secret, nonce: &[u8]) -> HmacSha256 {
        let mut mac =
            HmacSha256::new_from_slice(secret.key_bytes()).expect("HMAC can take key of any size");
        mac.update(nonce);
        mac
    }
}
