//! Invitation bearer-token generation.
//!
//! Tokens gate account creation, so they are drawn from the operating
//! system's CSPRNG rather than a seeded thread-local generator. 32
//! characters over a 64-symbol alphabet gives 192 bits of entropy.

use rand::Rng;

/// URL-safe alphabet (base64url symbols) for invitation tokens.
const TOKEN_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Length of generated invitation tokens.
pub const TOKEN_LENGTH: usize = 32;

/// Generates a new invitation token.
///
/// The token is URL-safe and suitable for embedding in a query parameter
/// without percent-encoding.
pub fn generate_invitation_token() -> String {
    let mut rng = rand::rngs::OsRng;
    (0..TOKEN_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..TOKEN_CHARSET.len());
            TOKEN_CHARSET[idx] as char
        })
        .collect()
}

/// Checks whether a string is shaped like an invitation token.
///
/// Used to short-circuit verification of obviously malformed input before
/// any storage lookup happens.
pub fn is_token_shaped(candidate: &str) -> bool {
    candidate.len() == TOKEN_LENGTH
        && candidate
            .bytes()
            .all(|b| TOKEN_CHARSET.contains(&b))
}
