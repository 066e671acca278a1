use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::{Claims, TokenType};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

/// Identity snapshot baked into a token pair. Access-level changes made
/// after issuance only take effect once the token is re-issued.
#[derive(Debug, Clone)]
pub struct TokenIdentity {
    pub user_id: u64,
    pub username: String,
    pub is_staff: bool,
    pub employee_id: Option<String>,
    pub access_level: Option<String>,
}

pub fn generate_access_token(identity: &TokenIdentity, secret: &str, ttl: usize) -> String {
    let claims = build_claims(identity, TokenType::Access, ttl);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

pub fn generate_refresh_token(
    identity: &TokenIdentity,
    secret: &str,
    ttl: usize,
) -> (String, Claims) {
    let claims = build_claims(identity, TokenType::Refresh, ttl);

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap();

    (token, claims)
}

fn build_claims(identity: &TokenIdentity, token_type: TokenType, ttl: usize) -> Claims {
    Claims {
        user_id: identity.user_id,
        sub: identity.username.clone(),
        is_staff: identity.is_staff,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type,
        employee_id: identity.employee_id.clone(),
        access_level: identity.access_level.clone(),
    }
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> TokenIdentity {
        TokenIdentity {
            user_id: 42,
            username: "jdoe".into(),
            is_staff: false,
            employee_id: Some("4F2A9C01BD37".into()),
            access_level: Some("Employee".into()),
        }
    }

    #[test]
    fn access_token_round_trips() {
        let token = generate_access_token(&identity(), "secret", 3600);
        let claims = verify_token(&token, "secret").unwrap();

        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.sub, "jdoe");
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.employee_id.as_deref(), Some("4F2A9C01BD37"));
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let token = generate_access_token(&identity(), "secret", 3600);
        assert!(verify_token(&token, "other").is_err());
    }

    #[test]
    fn refresh_token_carries_refresh_type() {
        let (token, claims) = generate_refresh_token(&identity(), "secret", 3600);
        assert_eq!(claims.token_type, TokenType::Refresh);

        let decoded = verify_token(&token, "secret").unwrap();
        assert_eq!(decoded.jti, claims.jti);
    }
}
