use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use crate::error::PublishError;
use crate::github::models::Claims;

/// Backdating absorbs clock drift between us and GitHub.
const CLOCK_SKEW_SECS: i64 = 60;
/// GitHub refuses app JWTs that live longer than ten minutes.
const MAX_LIFETIME_SECS: i64 = 600;

/// Signs a short-lived RS256 JWT asserting the GitHub App identity.
pub fn sign_app_jwt(app_id: &str, private_key_pem: &str) -> Result<String, PublishError> {
    let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
        .map_err(|e| PublishError::InvalidKeyFormat(e.to_string()))?;

    let iat = Utc::now().timestamp() - CLOCK_SKEW_SECS;
    let claims = Claims {
        iat,
        exp: iat + MAX_LIFETIME_SECS,
        iss: app_id.to_string(),
    };

    // The PEM envelope is only checked above; the RSA structure inside it is
    // parsed when signing.
    encode(&Header::new(Algorithm::RS256), &claims, &key).map_err(|e| match e.kind() {
        ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidKeyFormat => {
            PublishError::InvalidKeyFormat(e.to_string())
        }
        _ => PublishError::Signing(e.to_string()),
    })
}
