pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::database::models::account::{Account, Role};

/// Request header carrying the signed authentication token, on both the login
/// response and subsequent requests. Must stay in the CORS expose list or
/// browsers will not see it.
pub const TOKEN_HEADER: &str = "x-authentication-token";

/// The authenticated caller, as embedded in a verified token. Trusted at face
/// value once the signature checks out; role changes only take effect at the
/// next login.
#[derive(Debug, Clone)]
pub struct Identity {
    pub account_id: i32,
    pub email: String,
    pub role: Role,
}

impl From<&Account> for Identity {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.account_id,
            email: account.email.clone(),
            role: account.role.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: i32,
    pub email: String,
    pub roleid: i32,
    pub rolename: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("empty signing secret")]
    EmptySecret,

    #[error("token generation failed: {0}")]
    Generation(String),

    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Issues and parses signed bearer tokens. Holds the symmetric keys built
/// from the configured secret; constructed once at startup and shared through
/// application state.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry_hours: u64,
}

impl TokenCodec {
    pub fn new(secret: &str, expiry_hours: u64) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry_hours,
        })
    }

    /// Serialize an identity into a signed token with an expiry claim
    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: identity.account_id,
            email: identity.email.clone(),
            roleid: identity.role.role_id,
            rolename: identity.role.role_name.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.expiry_hours as i64)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Verify the signature and expiry, returning the embedded identity.
    /// No store lookup happens here.
    pub fn parse(&self, token: &str) -> Result<Identity, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|e| TokenError::Invalid(e.to_string()))?;

        Ok(Identity {
            account_id: data.claims.sub,
            email: data.claims.email,
            role: Role {
                role_id: data.claims.roleid,
                role_name: data.claims.rolename,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new("unit-test-secret", 24).unwrap()
    }

    fn identity() -> Identity {
        Identity {
            account_id: 7,
            email: "admin@example.com".to_string(),
            role: Role {
                role_id: 1,
                role_name: Some("admin".to_string()),
            },
        }
    }

    #[test]
    fn refuses_empty_secret() {
        assert!(matches!(TokenCodec::new("", 24), Err(TokenError::EmptySecret)));
    }

    #[test]
    fn issued_token_round_trips_identity() {
        let codec = codec();
        let token = codec.issue(&identity()).unwrap();
        let parsed = codec.parse(&token).unwrap();
        assert_eq!(parsed.account_id, 7);
        assert_eq!(parsed.email, "admin@example.com");
        assert_eq!(parsed.role.role_id, 1);
        assert_eq!(parsed.role.role_name.as_deref(), Some("admin"));
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let token = codec().issue(&identity()).unwrap();
        let other = TokenCodec::new("different-secret", 24).unwrap();
        assert!(matches!(other.parse(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn rejects_garbage_token() {
        assert!(codec().parse("not-a-token").is_err());
    }
}
