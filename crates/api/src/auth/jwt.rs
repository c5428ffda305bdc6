//! Bearer tokens identifying form owners.
//!
//! Accounts are managed elsewhere; this service trusts any HS256 token
//! signed with the shared secret and issued by [`TOKEN_ISSUER`]. The
//! subject is the owner's `users.id`.

use formkit_core::types::DbId;
use jsonwebtoken::errors::Error as JwtError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Value of the `iss` claim on every accepted token.
pub const TOKEN_ISSUER: &str = "formkit";

const DEFAULT_EXPIRY_MINS: i64 = 15;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Owner id.
    pub sub: DbId,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    /// Random token id, useful for log correlation.
    pub jti: String,
}

/// Signing secret and token lifetime.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
}

impl JwtConfig {
    /// Read `JWT_SECRET` (required, non-empty) and `JWT_ACCESS_EXPIRY_MINS`
    /// (default 15).
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins = match std::env::var("JWT_ACCESS_EXPIRY_MINS") {
            Ok(raw) => raw
                .parse()
                .expect("JWT_ACCESS_EXPIRY_MINS must be a whole number of minutes"),
            Err(_) => DEFAULT_EXPIRY_MINS,
        };

        Self {
            secret,
            access_token_expiry_mins,
        }
    }

    /// Mint a token for `owner_id` that expires after the configured lifetime.
    pub fn issue(&self, owner_id: DbId) -> Result<String, JwtError> {
        let iat = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: owner_id,
            iss: TOKEN_ISSUER.to_string(),
            iat,
            exp: iat + self.access_token_expiry_mins * 60,
            jti: uuid::Uuid::new_v4().to_string(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    /// Check signature, expiry and issuer, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[TOKEN_ISSUER]);
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            access_token_expiry_mins: 15,
        }
    }

    fn sign(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn issued_token_verifies() {
        let config = config("owner-token-secret");
        let token = config.issue(42).unwrap();

        let claims = config.verify(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.iss, TOKEN_ISSUER);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = chrono::Utc::now().timestamp();
        // Past the default 60 second leeway.
        let claims = Claims {
            sub: 1,
            iss: TOKEN_ISSUER.to_string(),
            iat: now - 600,
            exp: now - 300,
            jti: "old".to_string(),
        };
        let token = sign(&claims, "owner-token-secret");
        assert!(config("owner-token-secret").verify(&token).is_err());
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            iss: "someone-else".to_string(),
            iat: now,
            exp: now + 60,
            jti: "x".to_string(),
        };
        let token = sign(&claims, "owner-token-secret");
        assert!(config("owner-token-secret").verify(&token).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = config("secret-alpha").issue(1).unwrap();
        assert!(config("secret-bravo").verify(&token).is_err());
    }
}
