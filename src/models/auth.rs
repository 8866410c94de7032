//! Access token claims issued by the external auth service

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims of a signed-in user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User id
    pub sub: Uuid,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

impl AccessClaims {
    /// Verify an HS256 token. `audience`, when set, must match the `aud` claim.
    pub fn from_token(
        token: &str,
        secret: &str,
        audience: Option<&str>,
    ) -> Result<Self, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        let token_data = decode::<Self>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn token(claims: &AccessClaims, secret: &str) -> String {
        encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    fn claims(aud: Option<&str>, exp_offset: i64) -> AccessClaims {
        AccessClaims {
            sub: Uuid::new_v4(),
            exp: chrono::Utc::now().timestamp() + exp_offset,
            email: Some("staff@example.com".to_string()),
            aud: aud.map(str::to_string),
        }
    }

    #[test]
    fn test_valid_token() {
        let c = claims(Some("authenticated"), 3600);
        let parsed = AccessClaims::from_token(&token(&c, SECRET), SECRET, Some("authenticated")).unwrap();
        assert_eq!(parsed.sub, c.sub);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let c = claims(None, 3600);
        assert!(AccessClaims::from_token(&token(&c, "other"), SECRET, None).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let c = claims(None, -3600);
        assert!(AccessClaims::from_token(&token(&c, SECRET), SECRET, None).is_err());
    }

    #[test]
    fn test_audience_mismatch_rejected() {
        let c = claims(Some("anon"), 3600);
        assert!(AccessClaims::from_token(&token(&c, SECRET), SECRET, Some("authenticated")).is_err());
        // Not checked when no audience is configured
        assert!(AccessClaims::from_token(&token(&c, SECRET), SECRET, None).is_ok());
    }
}
