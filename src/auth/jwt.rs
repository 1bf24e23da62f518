/// Signed token issuance and verification
///
/// Compact JWS (`header.claims.signature`) signed with HMAC-SHA256 over a single
/// process-wide secret. The accepted algorithm is pinned here and never taken
/// from the token header.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::claims::{Claims, Expiring, RefreshClaims};
use crate::configuration::JwtSettings;
use crate::domain::{TokenPair, User};
use crate::error::{AppError, AuthError};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Issues and verifies access/refresh tokens.
///
/// Built once at startup from `JwtSettings` and cloned into every worker;
/// holds no mutable state.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenCodec {
    pub fn new(config: &JwtSettings) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            access_ttl: Duration::seconds(config.access_token_expiry),
            refresh_ttl: Duration::seconds(config.refresh_token_expiry),
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Serialize and sign a claim set
    ///
    /// # Errors
    /// Returns `AppError::Internal` if the claims cannot be serialized
    pub fn issue<C: Serialize>(&self, claims: &C) -> Result<String, AppError> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Issue the access + refresh pair for a login or signup
    pub fn issue_token_pair(&self, user: &User) -> Result<TokenPair, AppError> {
        self.issue_token_pair_at(user, Utc::now().timestamp())
    }

    pub fn issue_token_pair_at(&self, user: &User, now: i64) -> Result<TokenPair, AppError> {
        let access_token = self.issue(&Claims::for_user(user, self.access_ttl, now))?;
        let refresh_token = self.issue(&RefreshClaims::new(self.refresh_ttl, now))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Verify an access token and return its claims unchanged
    ///
    /// # Errors
    /// - `TokenMalformed`: bad encoding, wrong algorithm, missing identity claims
    /// - `SignatureInvalid`: MAC mismatch
    /// - `TokenExpired`: current time is at or past `exp`
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        self.decode_at(token, now)
    }

    /// Verify a refresh token; access tokens are rejected as malformed
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, AuthError> {
        self.decode_at(token, Utc::now().timestamp())
    }

    fn decode_at<C>(&self, token: &str, now: i64) -> Result<C, AuthError>
    where
        C: DeserializeOwned + Expiring,
    {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry is compared below against the caller's clock: expired when now >= exp.
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<C>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token decode error: {}", e);
                match e.kind() {
                    ErrorKind::InvalidSignature => AuthError::SignatureInvalid,
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => AuthError::TokenMalformed,
                }
            })?;

        if now >= claims.expires_at() {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    fn get_test_config() -> JwtSettings {
        JwtSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 3600,
            refresh_token_expiry: 360000,
        }
    }

    fn test_user(role: Role) -> User {
        User::new(
            "Test Person".to_string(),
            "tester".to_string(),
            "test@example.com".to_string(),
            "$2b$04$hash".to_string(),
            role,
        )
    }

    /// Change the first character of the signature segment. Every bit of that
    /// character is signature data, unlike the last one which carries padding.
    fn flip_signature_char(token: &str) -> String {
        let at = token.rfind('.').unwrap() + 1;
        let mut chars: Vec<char> = token.chars().collect();
        chars[at] = if chars[at] == 'A' { 'B' } else { 'A' };
        chars.into_iter().collect()
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let codec = TokenCodec::new(&get_test_config());
        let user = test_user(Role::User);
        let now = Utc::now().timestamp();

        let pair = codec.issue_token_pair_at(&user, now).expect("Failed to issue tokens");
        let claims = codec.verify(&pair.access_token).expect("Failed to verify token");

        assert_eq!(claims, Claims::for_user(&user, Duration::seconds(3600), now));
    }

    #[test]
    fn test_token_has_three_segments_and_pinned_header() {
        let codec = TokenCodec::new(&get_test_config());
        let pair = codec.issue_token_pair(&test_user(Role::User)).unwrap();

        assert_eq!(pair.access_token.split('.').count(), 3);
        let header = jsonwebtoken::decode_header(&pair.access_token).unwrap();
        assert_eq!(header.alg, Algorithm::HS256);
    }

    #[test]
    fn test_accepted_until_expiry_then_rejected() {
        let codec = TokenCodec::new(&get_test_config());
        let issued_at = 1_700_000_000;
        let pair = codec.issue_token_pair_at(&test_user(Role::User), issued_at).unwrap();
        let exp = issued_at + 3600;

        assert!(codec.verify_at(&pair.access_token, exp - 1).is_ok());
        assert_eq!(
            codec.verify_at(&pair.access_token, exp),
            Err(AuthError::TokenExpired)
        );
        assert_eq!(
            codec.verify_at(&pair.access_token, exp + 1),
            Err(AuthError::TokenExpired)
        );
    }

    #[test]
    fn test_expired_token_with_real_clock() {
        let codec = TokenCodec::new(&get_test_config());
        let two_hours_ago = Utc::now().timestamp() - 7200;
        let pair = codec.issue_token_pair_at(&test_user(Role::User), two_hours_ago).unwrap();

        assert_eq!(codec.verify(&pair.access_token), Err(AuthError::TokenExpired));
    }

    #[test]
    fn test_altered_signature_is_rejected() {
        let codec = TokenCodec::new(&get_test_config());
        let pair = codec.issue_token_pair(&test_user(Role::User)).unwrap();

        let tampered = flip_signature_char(&pair.access_token);
        assert_eq!(codec.verify(&tampered), Err(AuthError::SignatureInvalid));
    }

    #[test]
    fn test_altered_claims_are_rejected() {
        let codec = TokenCodec::new(&get_test_config());
        let pair = codec.issue_token_pair(&test_user(Role::User)).unwrap();

        // Re-sign nothing: promote the role in the payload and keep the old signature
        let parts: Vec<&str> = pair.access_token.split('.').collect();
        let forged_claims = {
            use base64::Engine;
            let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
            let raw = engine.decode(parts[1]).unwrap();
            let mut value: serde_json::Value = serde_json::from_slice(&raw).unwrap();
            value["user_type"] = serde_json::json!("ADMIN");
            engine.encode(serde_json::to_vec(&value).unwrap())
        };
        let forged = format!("{}.{}.{}", parts[0], forged_claims, parts[2]);

        assert_eq!(codec.verify(&forged), Err(AuthError::SignatureInvalid));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let codec = TokenCodec::new(&get_test_config());
        let mut other = get_test_config();
        other.secret = "another-secret-key-that-is-also-long".to_string();
        let other_codec = TokenCodec::new(&other);

        let pair = other_codec.issue_token_pair(&test_user(Role::Admin)).unwrap();
        assert_eq!(codec.verify(&pair.access_token), Err(AuthError::SignatureInvalid));
    }

    #[test]
    fn test_other_algorithm_is_rejected_as_malformed() {
        let config = get_test_config();
        let codec = TokenCodec::new(&config);
        let claims = Claims::for_user(&test_user(Role::Admin), Duration::hours(1), Utc::now().timestamp());

        let hs512 = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert_eq!(codec.verify(&hs512), Err(AuthError::TokenMalformed));
    }

    #[test]
    fn test_unsigned_token_is_rejected_as_malformed() {
        use base64::Engine;
        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        let codec = TokenCodec::new(&get_test_config());
        let claims = Claims::for_user(&test_user(Role::Admin), Duration::hours(1), Utc::now().timestamp());

        let header = engine.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = engine.encode(serde_json::to_vec(&claims).unwrap());
        let unsigned = format!("{}.{}.", header, payload);

        assert_eq!(codec.verify(&unsigned), Err(AuthError::TokenMalformed));
    }

    #[test]
    fn test_garbage_is_rejected_as_malformed() {
        let codec = TokenCodec::new(&get_test_config());
        for token in ["", "invalid.token.here", "a.b", "not-a-token"] {
            assert_eq!(codec.verify(token), Err(AuthError::TokenMalformed), "{}", token);
        }
    }

    #[test]
    fn test_refresh_token_cannot_authorize() {
        let codec = TokenCodec::new(&get_test_config());
        let pair = codec.issue_token_pair(&test_user(Role::Admin)).unwrap();

        assert_eq!(codec.verify(&pair.refresh_token), Err(AuthError::TokenMalformed));
        assert!(codec.verify_refresh(&pair.refresh_token).is_ok());
        assert_eq!(
            codec.verify_refresh(&pair.access_token),
            Err(AuthError::TokenMalformed)
        );
    }
}
