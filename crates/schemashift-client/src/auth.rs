//! App-token exchange.
//!
//! Turns an app's RSA private key into a short-lived bearer token for the
//! management API: a signed JWT assertion is posted to the app-installation
//! token endpoint, which answers with the token to use for all further
//! calls.

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Lifetime of the signed assertion, in seconds.
const ASSERTION_TTL_SECS: i64 = 600;

/// Inputs for an app-token exchange, scoped to one app installation.
#[derive(Debug, Clone)]
pub struct AppTokenRequest {
    /// App identity whose installation grants the token.
    pub app_id: String,
    /// Space the installation lives in.
    pub space_id: String,
    /// Environment within the space.
    pub environment_id: String,
    /// PEM-encoded RSA private key for the app.
    pub private_key_pem: String,
}

/// Claims carried by the signed assertion.
#[derive(Debug, Serialize)]
struct AssertionClaims {
    /// Issuer: the app identity.
    iss: String,
    /// Issued-at timestamp (Unix seconds).
    iat: i64,
    /// Expiration timestamp (Unix seconds).
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// Exchange an app private key for a bearer token.
///
/// The returned credential is valid for the (space, environment) pair in
/// the request and is not cached here; callers resolve it once per run.
pub async fn exchange_app_token(base_url: &str, request: &AppTokenRequest) -> Result<String, Error> {
    let key = EncodingKey::from_rsa_pem(request.private_key_pem.as_bytes())
        .map_err(|e| Error::TokenExchange(format!("invalid private key: {e}")))?;

    let now = Utc::now().timestamp();
    let claims = AssertionClaims {
        iss: request.app_id.clone(),
        iat: now,
        exp: now + ASSERTION_TTL_SECS,
    };
    let assertion = encode(&Header::new(Algorithm::RS256), &claims, &key)
        .map_err(|e| Error::TokenExchange(format!("failed to sign assertion: {e}")))?;

    let url = format!(
        "{}/spaces/{}/environments/{}/app_installations/{}/access_tokens",
        base_url.trim_end_matches('/'),
        request.space_id,
        request.environment_id,
        request.app_id
    );

    let response = reqwest::Client::new()
        .post(url)
        .bearer_auth(assertion)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(Error::TokenExchange(format!("status {status}: {message}")));
    }

    let body = response.json::<TokenResponse>().await?;
    Ok(body.token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_garbage_private_key() {
        let request = AppTokenRequest {
            app_id: "app1".to_string(),
            space_id: "s1".to_string(),
            environment_id: "master".to_string(),
            private_key_pem: "not a pem".to_string(),
        };
        let err = exchange_app_token("http://127.0.0.1:1", &request)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TokenExchange(_)));
    }
}
