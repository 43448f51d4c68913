//! PKCE (Proof Key for Code Exchange) implementation for OAuth 2.0
//!
//! Implements RFC 7636 with the `S256` method. Verifiers are 64 characters
//! drawn uniformly from `[A-Za-z0-9]`; random bytes are mapped onto the
//! alphabet by rejection sampling so no character is favoured.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use listify_domain::constants::{CODE_CHALLENGE_METHOD, CODE_VERIFIER_LENGTH};
use sha2::{Digest, Sha256};
use url::Url;

use super::types::OAuthConfig;
use crate::crypto::RandomBytesSource;
use crate::error::{CommonError, CommonResult};

const VERIFIER_ALPHABET: &[u8; 62] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Largest multiple of the alphabet size that fits in a byte; bytes at or
/// above it are discarded.
const REJECTION_BOUND: u8 = 248;

/// Buffers drawn before giving up on a source that keeps yielding rejected
/// bytes. A uniform source exhausts this with probability (8/256)^1024.
const MAX_FILLS: usize = 16;

/// Generate a code verifier of [`CODE_VERIFIER_LENGTH`] alphanumeric chars
///
/// # Errors
/// Returns `CommonError::Crypto` if the random source fails or yields only
/// rejected bytes for [`MAX_FILLS`] buffers in a row
pub fn generate_code_verifier(rng: &dyn RandomBytesSource) -> CommonResult<String> {
    let mut verifier = String::with_capacity(CODE_VERIFIER_LENGTH);
    let mut buffer = [0u8; CODE_VERIFIER_LENGTH];
    let mut fills = 0;

    while verifier.len() < CODE_VERIFIER_LENGTH {
        if fills == MAX_FILLS {
            return Err(CommonError::crypto(
                "random source produced too few usable bytes for a code verifier",
            ));
        }
        fills += 1;
        rng.fill_bytes(&mut buffer)?;
        for byte in buffer {
            if byte >= REJECTION_BOUND {
                continue;
            }
            let index = usize::from(byte) % VERIFIER_ALPHABET.len();
            verifier.push(char::from(VERIFIER_ALPHABET[index]));
            if verifier.len() == CODE_VERIFIER_LENGTH {
                break;
            }
        }
    }

    Ok(verifier)
}

/// Generate code challenge from verifier using SHA256
///
/// Per RFC 7636, the challenge is BASE64URL(SHA256(ASCII(code_verifier)))
#[must_use]
pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Build the browser authorization URL for `code_challenge`
///
/// # Errors
/// Returns error if the configured authorization URL does not parse
pub fn authorization_url(config: &OAuthConfig, code_challenge: &str) -> CommonResult<Url> {
    let mut url = Url::parse(&config.authorization_url).map_err(|e| {
        CommonError::config_field("spotify.auth_url", format!("invalid authorization URL: {e}"))
    })?;

    url.query_pairs_mut()
        .append_pair("client_id", &config.client_id)
        .append_pair("redirect_uri", &config.redirect_uri)
        .append_pair("scope", &config.scope_string())
        .append_pair("response_type", "code")
        .append_pair("code_challenge_method", CODE_CHALLENGE_METHOD)
        .append_pair("code_challenge", code_challenge);

    Ok(url)
}

/// PKCE verifier and its derived challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceChallenge {
    /// Kept secret until token exchange
    pub code_verifier: String,

    /// Sent in the authorization request
    pub code_challenge: String,
}

impl PkceChallenge {
    /// Generate a fresh verifier/challenge pair
    ///
    /// # Examples
    /// ```
    /// use listify_common::auth::pkce::PkceChallenge;
    /// use listify_common::crypto::OsRandom;
    ///
    /// let challenge = PkceChallenge::generate(&OsRandom)?;
    /// assert_eq!(challenge.code_verifier.len(), 64);
    /// # Ok::<(), listify_common::error::CommonError>(())
    /// ```
    ///
    /// # Errors
    /// Returns error if the random source fails
    pub fn generate(rng: &dyn RandomBytesSource) -> CommonResult<Self> {
        let code_verifier = generate_code_verifier(rng)?;
        let code_challenge = generate_code_challenge(&code_verifier);
        Ok(Self { code_verifier, code_challenge })
    }

    /// Get the challenge method (always "S256" for SHA256)
    #[must_use]
    pub fn challenge_method(&self) -> &str {
        CODE_CHALLENGE_METHOD
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::pkce.
    use std::collections::HashSet;

    use super::*;
    use crate::crypto::OsRandom;
    use crate::testing::FixedRandom;

    fn config() -> OAuthConfig {
        OAuthConfig {
            client_id: "test_client_id".to_string(),
            redirect_uri: "http://localhost:5173/callback".to_string(),
            scopes: vec!["user-read-private".to_string(), "playlist-modify-public".to_string()],
            authorization_url: "https://accounts.spotify.com/authorize".to_string(),
            token_url: "https://accounts.spotify.com/api/token".to_string(),
        }
    }

    /// Validates `PkceChallenge::generate` behavior for the verifier shape
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms the verifier is exactly 64 characters.
    /// - Ensures every character is ASCII alphanumeric.
    /// - Ensures the challenge uses only the base64url alphabet, unpadded.
    #[test]
    fn test_generate_pkce_challenge() {
        let challenge = PkceChallenge::generate(&OsRandom).unwrap();

        assert_eq!(challenge.code_verifier.len(), 64);
        assert!(challenge.code_verifier.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(challenge.code_challenge.len(), 43);
        assert!(challenge
            .code_challenge
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    /// Validates `PkceChallenge::generate` behavior for the unique challenges
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms 1000 generated verifiers contain no duplicates.
    #[test]
    fn test_unique_challenges() {
        let verifiers: HashSet<String> = (0..1000)
            .map(|_| PkceChallenge::generate(&OsRandom).unwrap().code_verifier)
            .collect();

        assert_eq!(verifiers.len(), 1000);
    }

    /// Validates `generate_code_challenge` against the RFC 7636 appendix B
    /// vector.
    ///
    /// Assertions:
    /// - Confirms the known verifier maps to the known challenge.
    #[test]
    fn test_code_challenge_known_vector() {
        let challenge = generate_code_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk");
        assert_eq!(challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbJZ3cZqJ1xs");
    }

    /// Validates that the challenge is a pure function of the verifier.
    #[test]
    fn test_code_challenge_deterministic() {
        let challenge = PkceChallenge::generate(&OsRandom).unwrap();
        assert_eq!(challenge.code_challenge, generate_code_challenge(&challenge.code_verifier));
        assert_eq!(challenge.challenge_method(), "S256");
    }

    /// Validates rejection sampling with a fixed byte stream.
    ///
    /// Assertions:
    /// - Confirms bytes at or above 248 are skipped.
    /// - Confirms accepted bytes map through `byte % 62`.
    #[test]
    fn test_rejection_sampling_skips_biased_bytes() {
        // 255 and 248 are rejected; 0 -> 'A', 61 -> '9', 62 -> 'A', 247 -> '9'
        let rng = FixedRandom::new(vec![255, 0, 248, 61, 62, 247]);
        let verifier = generate_code_verifier(&rng).unwrap();

        assert_eq!(verifier.len(), 64);
        assert!(verifier.starts_with("A9A9"));
    }

    /// Validates `authorization_url` query construction.
    ///
    /// Assertions:
    /// - Confirms the base URL and every required query parameter.
    /// - Confirms scopes are space-joined.
    #[test]
    fn test_degenerate_random_source_is_an_error() {
        let rng = FixedRandom::new(vec![248, 255]);

        let result = generate_code_verifier(&rng);

        assert!(matches!(result, Err(CommonError::Crypto { .. })));
    }

    #[test]
    fn test_authorization_url() {
        let url = authorization_url(&config(), "challenge123").unwrap();
        let pairs: Vec<(String, String)> =
            url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect();

        assert_eq!(url.origin().ascii_serialization(), "https://accounts.spotify.com");
        assert_eq!(url.path(), "/authorize");
        assert_eq!(
            pairs,
            vec![
                ("client_id".to_string(), "test_client_id".to_string()),
                ("redirect_uri".to_string(), "http://localhost:5173/callback".to_string()),
                ("scope".to_string(), "user-read-private playlist-modify-public".to_string()),
                ("response_type".to_string(), "code".to_string()),
                ("code_challenge_method".to_string(), "S256".to_string()),
                ("code_challenge".to_string(), "challenge123".to_string()),
            ]
        );
    }

    /// Validates that an unparsable authorization URL is reported.
    #[test]
    fn test_authorization_url_rejects_bad_base() {
        let mut config = config();
        config.authorization_url = "not a url".to_string();

        assert!(matches!(
            authorization_url(&config, "c"),
            Err(CommonError::Config { .. })
        ));
    }
}
