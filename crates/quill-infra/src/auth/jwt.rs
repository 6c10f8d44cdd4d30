//! HS256 bearer tokens shared with the sign-in service.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
use uuid::Uuid;

use quill_core::ports::{AuthError, TokenClaims, TokenService};

/// Shared secret and issuer agreed with the sign-in service.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            issuer: "quill".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    username: String,
    #[serde(default)]
    roles: Vec<String>,
    exp: i64,
}

pub struct JwtTokenService {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::default();
        validation.set_issuer(&[&config.issuer]);

        Self {
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }
}

impl TokenService for JwtTokenService {
    fn validate_token(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        let user_id = Uuid::parse_str(&data.claims.sub)
            .map_err(|e| AuthError::InvalidToken(format!("subject is not a user id: {e}")))?;

        Ok(TokenClaims {
            user_id,
            username: data.claims.username,
            roles: data.claims.roles,
            exp: data.claims.exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    use super::*;

    const SECRET: &str = "test-secret-key";

    fn service() -> JwtTokenService {
        JwtTokenService::new(JwtConfig {
            secret: SECRET.to_string(),
            issuer: "quill".to_string(),
        })
    }

    /// Token as the sign-in service would issue it.
    fn signed(sub: &str, issuer: &str, roles: &[&str], expires_in: TimeDelta) -> String {
        let now = Utc::now();
        let claims = json!({
            "sub": sub,
            "username": "jane",
            "roles": roles,
            "exp": (now + expires_in).timestamp(),
            "iat": now.timestamp(),
            "iss": issuer,
        });
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_yields_the_principal() {
        let user_id = Uuid::new_v4();
        let token = signed(&user_id.to_string(), "quill", &["admin"], TimeDelta::hours(1));

        let claims = service().validate_token(&token).unwrap();

        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.username, "jane");
        assert_eq!(claims.roles, vec!["admin".to_string()]);
    }

    #[test]
    fn garbage_is_rejected() {
        let result = service().validate_token("not-a-token");
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let token = signed(
            &Uuid::new_v4().to_string(),
            "someone-else",
            &[],
            TimeDelta::hours(1),
        );
        assert!(service().validate_token(&token).is_err());
    }

    #[test]
    fn subject_must_be_a_user_id() {
        let token = signed("jane", "quill", &[], TimeDelta::hours(1));
        assert!(matches!(
            service().validate_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let token = signed(&Uuid::new_v4().to_string(), "quill", &[], TimeDelta::hours(-2));

        assert!(matches!(
            service().validate_token(&token),
            Err(AuthError::TokenExpired)
        ));
    }
}
