// server/src/services/token_service.rs

//! Bearer tokens: HS256 JWTs carrying the user id and role.

use crate::errors::AppError;
use crate::models::User;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tiffin_core::Role;
use tracing::{debug, instrument};
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IssuedClaims {
  user_id: String,
  role: Role,
  iat: i64,
  exp: i64,
}

#[derive(Debug, Deserialize)]
struct NestedUser {
  id: Option<String>,
}

/// What we accept on the way in. Older clients put the subject under
/// different keys; the first one present wins.
#[derive(Debug, Deserialize)]
struct IncomingClaims {
  #[serde(rename = "userId")]
  user_id: Option<String>,
  id: Option<String>,
  #[serde(rename = "_id")]
  underscore_id: Option<String>,
  user: Option<NestedUser>,
  sub: Option<String>,
}

impl IncomingClaims {
  fn subject(self) -> Option<String> {
    self
      .user_id
      .or(self.id)
      .or(self.underscore_id)
      .or(self.user.and_then(|u| u.id))
      .or(self.sub)
  }
}

pub struct TokenService {
  encoding_key: EncodingKey,
  decoding_key: DecodingKey,
  ttl: Duration,
}

impl TokenService {
  pub fn new(secret: &str, ttl_hours: i64) -> Self {
    Self {
      encoding_key: EncodingKey::from_secret(secret.as_bytes()),
      decoding_key: DecodingKey::from_secret(secret.as_bytes()),
      ttl: Duration::hours(ttl_hours),
    }
  }

  #[instrument(name = "token_service::issue", skip_all, fields(user_id = %user.id))]
  pub fn issue(&self, user: &User) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = IssuedClaims {
      user_id: user.id.to_string(),
      role: user.role,
      iat: now.timestamp(),
      exp: (now + self.ttl).timestamp(),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
      .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
  }

  /// Checks signature and expiry and returns the user id the token names.
  pub fn verify(&self, token: &str) -> Result<Uuid, AppError> {
    let data = decode::<IncomingClaims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256)).map_err(
      |e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::Unauthorized("Token has expired.".to_string()),
        _ => {
          debug!(error = %e, "Rejected bearer token.");
          AppError::Unauthorized("Invalid token.".to_string())
        }
      },
    )?;

    let subject = data
      .claims
      .subject()
      .ok_or_else(|| AppError::Unauthorized("Token does not name a user.".to_string()))?;
    Uuid::parse_str(&subject).map_err(|_| AppError::Unauthorized("Invalid token.".to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  const SECRET: &str = "test-secret-0123456789";

  fn user(role: Role) -> User {
    User {
      id: Uuid::new_v4(),
      name: "Ana".to_string(),
      email: "ana@example.com".to_string(),
      password_hash: String::new(),
      phone: None,
      address: None,
      role,
      is_approved: true,
      is_active: true,
      license_url: None,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  fn sign(claims: serde_json::Value) -> String {
    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
  }

  #[test]
  fn issued_tokens_verify() {
    let service = TokenService::new(SECRET, 1);
    let user = user(Role::Customer);
    let token = service.issue(&user).unwrap();
    assert_eq!(service.verify(&token).unwrap(), user.id);
  }

  #[test]
  fn subject_is_read_from_legacy_keys() {
    let service = TokenService::new(SECRET, 1);
    let id = Uuid::new_v4();
    let exp = (Utc::now() + Duration::hours(1)).timestamp();

    for claims in [
      json!({ "id": id.to_string(), "exp": exp }),
      json!({ "_id": id.to_string(), "exp": exp }),
      json!({ "user": { "id": id.to_string() }, "exp": exp }),
      json!({ "sub": id.to_string(), "exp": exp }),
    ] {
      assert_eq!(service.verify(&sign(claims)).unwrap(), id);
    }
  }

  #[test]
  fn expired_and_foreign_tokens_are_unauthorized() {
    let service = TokenService::new(SECRET, 1);
    let expired = sign(json!({ "userId": Uuid::new_v4().to_string(), "exp": Utc::now().timestamp() - 3600 }));
    assert!(matches!(service.verify(&expired), Err(AppError::Unauthorized(m)) if m.contains("expired")));

    let other = TokenService::new("another-secret-0123456789", 1);
    let token = other.issue(&user(Role::Rider)).unwrap();
    assert!(matches!(service.verify(&token), Err(AppError::Unauthorized(_))));
  }
}
