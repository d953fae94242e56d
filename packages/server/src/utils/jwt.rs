use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// JWT claims carried by admin bearer tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Email
    pub uid: i32,    // User ID
    pub role: String,
    pub permissions: Vec<String>,
    pub exp: usize, // Expiration timestamp
}

/// Sign a new token for a user. Valid for 7 days.
pub fn sign(
    user_id: i32,
    email: &str,
    role: &str,
    permissions: Vec<String>,
    secret: &str,
) -> Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::days(7))
        .context("token expiry overflow")?
        .timestamp();

    let claims = Claims {
        sub: email.to_owned(),
        uid: user_id,
        role: role.to_owned(),
        permissions,
        exp: expiration as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify and decode a token.
pub fn verify(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_round_trip() {
        let token = sign(
            7,
            "admin@vitrin.example",
            "superadmin",
            vec!["user:manage".into()],
            "test-secret",
        )
        .unwrap();

        let claims = verify(&token, "test-secret").unwrap();
        assert_eq!(claims.uid, 7);
        assert_eq!(claims.sub, "admin@vitrin.example");
        assert_eq!(claims.role, "superadmin");
        assert_eq!(claims.permissions, vec!["user:manage".to_string()]);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign(1, "a@b.example", "editor", vec![], "secret-a").unwrap();
        assert!(verify(&token, "secret-b").is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(verify("not.a.token", "secret").is_err());
    }
}
