use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::model::employee::Role;
use crate::models::{Claims, TokenType};

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

fn build_claims(
    emp_id: &str,
    name: &str,
    role: Role,
    processes: &[String],
    ttl: usize,
    token_type: TokenType,
) -> Claims {
    Claims {
        sub: emp_id.to_string(),
        name: name.to_string(),
        role: role.to_string(),
        process: processes.to_vec(),
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type,
    }
}

pub fn generate_access_token(
    emp_id: &str,
    name: &str,
    role: Role,
    processes: &[String],
    secret: &str,
    ttl: usize,
) -> String {
    let claims = build_claims(emp_id, name, role, processes, ttl, TokenType::Access);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

pub fn generate_refresh_token(
    emp_id: &str,
    name: &str,
    role: Role,
    processes: &[String],
    secret: &str,
    ttl: usize,
) -> (String, Claims) {
    let claims = build_claims(emp_id, name, role, processes, ttl, TokenType::Refresh);
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap();
    (token, claims)
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
