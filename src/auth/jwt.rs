use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SESSION_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    /// Account `credential_version` at issue time.
    pub ver: i32,
    pub exp: i64,
}

impl Claims {
    pub fn new(account_id: Uuid, username: String, version: i32) -> Self {
        Self {
            sub: account_id,
            username,
            ver: version,
            exp: (Utc::now() + Duration::days(SESSION_DAYS)).timestamp(),
        }
    }
}

pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| format!("JWT encode failed: {e}"))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("JWT decode failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_with_same_secret_only() {
        let claims = Claims::new(Uuid::now_v7(), "alice@example.com".to_string(), 3);
        let token = encode_token(&claims, "secret-one").unwrap();

        let decoded = decode_token(&token, "secret-one").unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.username, "alice@example.com");
        assert_eq!(decoded.ver, 3);

        assert!(decode_token(&token, "secret-two").is_err());
    }
}
