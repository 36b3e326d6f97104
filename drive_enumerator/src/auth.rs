//! Service account authentication for Google APIs.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::{DriveError, Result};
use crate::models::{ApiErrorResponse, ServiceAccountInfo, TokenResponse};

/// Default Google OAuth2 token endpoint.
pub const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Full read/write Drive scope.
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// Read-only Drive scope.
pub const DRIVE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

/// Environment variable holding the whole key payload as inline JSON.
pub const SERVICE_ACCOUNT_INFO_ENV: &str = "SERVICE_ACCOUNT_INFO";

/// Token lifetime requested in the JWT assertion.
const ASSERTION_LIFETIME_SECS: u64 = 3600;

/// Refresh this long before the cached token expires.
const EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// JWT claims for service account authentication.
#[derive(Debug, Serialize)]
struct Claims {
    iss: String,   // Issuer (service account email)
    scope: String, // Space separated OAuth scopes
    aud: String,   // Audience (token endpoint)
    exp: u64,      // Expiration time
    iat: u64,      // Issued at
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<String>, // Impersonated user (domain-wide delegation)
}

/// Cached access token with expiration.
#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: SystemTime,
}

impl ServiceAccountInfo {
    /// Load a service account key file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a key payload from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read the inline payload from `SERVICE_ACCOUNT_INFO`.
    pub fn from_env() -> Result<Self> {
        let json = std::env::var(SERVICE_ACCOUNT_INFO_ENV)
            .map_err(|_| DriveError::MissingEnvVar(SERVICE_ACCOUNT_INFO_ENV.to_string()))?;
        Self::from_json(&json)
    }

    /// Render the payload as a single `.env` line.
    pub fn to_env_line(&self) -> Result<String> {
        let compact = serde_json::to_string(self)?;
        Ok(format!("{}={}", SERVICE_ACCOUNT_INFO_ENV, compact))
    }
}

/// Authenticator for Google APIs using service account credentials.
#[derive(Clone)]
pub struct Authenticator {
    client_email: String,
    key: Arc<EncodingKey>,
    token_uri: String,
    scopes: Vec<String>,
    subject: Option<String>,
    client: Client,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .field("scopes", &self.scopes)
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    /// Build an authenticator from a key payload and the scopes to request.
    ///
    /// Fails when the payload has no `client_email`, no `private_key`, a key
    /// that is not RSA PEM, or when `scopes` is empty. Scopes are only
    /// checked by Google on the first token exchange.
    pub fn new<S: AsRef<str>>(info: &ServiceAccountInfo, scopes: &[S]) -> Result<Self> {
        let client_email = info
            .client_email()
            .ok_or_else(|| {
                DriveError::AuthenticationError("credentials have no client_email".to_string())
            })?
            .to_string();

        let private_key = info
            .private_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                DriveError::AuthenticationError("credentials have no private_key".to_string())
            })?;

        let scopes: Vec<String> = scopes
            .iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if scopes.is_empty() {
            return Err(DriveError::AuthenticationError(
                "at least one OAuth scope is required".to_string(),
            ));
        }

        let key = EncodingKey::from_rsa_pem(private_key.as_bytes()).map_err(|e| {
            DriveError::AuthenticationError(format!("invalid private_key: {}", e))
        })?;

        Ok(Self {
            client_email,
            key: Arc::new(key),
            token_uri: info.token_uri.clone().unwrap_or_else(|| TOKEN_URI.to_string()),
            scopes,
            subject: None,
            client: Client::new(),
            cached_token: Arc::new(RwLock::new(None)),
        })
    }

    /// Impersonate `subject` through domain-wide delegation.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self.cached_token = Arc::new(RwLock::new(None));
        self
    }

    /// The service account email tokens are issued for.
    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Get a valid access token, refreshing if necessary.
    pub async fn get_access_token(&self) -> Result<String> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if token.expires_at > SystemTime::now() + EXPIRY_BUFFER {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let new_token = self.refresh_token().await?;

        {
            let mut cached = self.cached_token.write().await;
            *cached = Some(new_token.clone());
        }

        Ok(new_token.access_token)
    }

    fn build_assertion(&self, now: u64) -> Result<String> {
        let claims = Claims {
            iss: self.client_email.clone(),
            scope: self.scopes.join(" "),
            aud: self.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
            sub: self.subject.clone(),
        };

        let header = Header::new(Algorithm::RS256);
        Ok(encode(&header, &claims, &self.key)?)
    }

    /// Exchange a signed JWT assertion for an access token.
    async fn refresh_token(&self) -> Result<CachedToken> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| DriveError::AuthenticationError(format!("system clock: {}", e)))?
            .as_secs();

        let jwt = self.build_assertion(now)?;
        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", &jwt),
        ];

        tracing::debug!(
            client_email = %self.client_email,
            token_uri = %self.token_uri,
            "requesting access token"
        );

        let response = self
            .client
            .post(&self.token_uri)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            // Only a rejected grant means the credentials or scopes are bad.
            if is_grant_rejection(status) {
                return Err(DriveError::TokenRefreshError(format!(
                    "Status {}: {}",
                    status, message
                )));
            }
            return Err(DriveError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let token_response: TokenResponse = response.json().await?;

        let expires_at = SystemTime::now() + Duration::from_secs(token_response.expires_in);

        Ok(CachedToken {
            access_token: token_response.access_token,
            expires_at,
        })
    }
}

fn is_grant_rejection(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
    )
}
