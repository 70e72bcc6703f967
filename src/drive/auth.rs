//! Credential acquisition for Drive calls.
//!
//! [`Authorizer`] is the capability every remote call goes through. The bundled
//! [`TokenFileAuthorizer`] keeps an OAuth token on disk, refreshes it when it is about to
//! expire and falls back to interactive consent when no usable token exists.

use crate::drive::constants::{DEFAULT_REDIRECT_URI, DEFAULT_USER_ID, TOKEN_REFRESH_MARGIN_SECS};
use crate::error::{Error, OAuthSnafu, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Short-lived bearer credential attached to a single remote call.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    access_token: String,
    expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn new(access_token: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Supplies credentials on demand.
///
/// Implementations own their token state and must tolerate concurrent callers.
/// Any retry for credential acquisition happens here, never in the caller.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self) -> Result<Credential>;
}

/// Settings consumed by [`TokenFileAuthorizer`].
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub scopes: Vec<String>,
    pub token_dir: PathBuf,
    pub token_file: String,
    pub client_secret_file: PathBuf,
    pub user_id: String,
}

/// Token layout on disk, compatible with files written by the googleapis Node client.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredToken {
    access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token_type: Option<String>,
    /// Expiry in epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expiry_date: Option<i64>,
}

impl StoredToken {
    fn from_response(response: TokenResponse, previous_refresh_token: Option<String>) -> Self {
        let expiry_date = response
            .expires_in
            .map(|secs| (Utc::now() + TimeDelta::seconds(secs)).timestamp_millis());
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(previous_refresh_token),
            scope: response.scope,
            token_type: response.token_type,
            expiry_date,
        }
    }

    fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expiry_date.and_then(DateTime::from_timestamp_millis)
    }

    /// Usable for at least the refresh margin. Tokens without an expiry never go stale.
    fn is_fresh(&self) -> bool {
        match self.expires_at() {
            Some(at) => Utc::now() + TimeDelta::seconds(TOKEN_REFRESH_MARGIN_SECS) < at,
            None => true,
        }
    }

    fn credential(&self) -> Credential {
        Credential::new(self.access_token.clone(), self.expires_at())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

#[derive(Debug, Deserialize)]
struct ClientSecret {
    client_id: String,
    client_secret: String,
    #[serde(default = "default_auth_uri")]
    auth_uri: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ClientSecret {
    fn redirect_uri(&self) -> &str {
        self.redirect_uris
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_REDIRECT_URI)
    }
}

/// OAuth authorizer backed by a token file and an application client secret.
pub struct TokenFileAuthorizer {
    scope: String,
    token_dir: PathBuf,
    token_path: PathBuf,
    client_secret_file: PathBuf,
    login_hint: Option<String>,
    http: reqwest::Client,
    token: Mutex<Option<StoredToken>>,
}

impl TokenFileAuthorizer {
    pub fn new(settings: AuthSettings, http: reqwest::Client) -> Self {
        let login_hint = (settings.user_id != DEFAULT_USER_ID).then_some(settings.user_id);
        Self {
            scope: settings.scopes.join(" "),
            token_path: settings.token_dir.join(&settings.token_file),
            token_dir: settings.token_dir,
            client_secret_file: settings.client_secret_file,
            login_hint,
            http,
            token: Mutex::new(None),
        }
    }

    pub fn token_path(&self) -> &PathBuf {
        &self.token_path
    }

    async fn load_token(&self) -> Result<Option<StoredToken>> {
        let bytes = match fs::read(&self.token_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice(&bytes) {
            Ok(token) => Ok(Some(token)),
            Err(e) => {
                log::warn!(
                    "ignoring unreadable token file {}: {e}",
                    self.token_path.display()
                );
                Ok(None)
            }
        }
    }

    async fn store_token(&self, token: &StoredToken) -> Result<()> {
        fs::create_dir_all(&self.token_dir).await?;
        fs::write(&self.token_path, serde_json::to_vec_pretty(token)?).await?;
        log::info!("Token stored to {}", self.token_path.display());
        Ok(())
    }

    async fn load_client_secret(&self) -> Result<ClientSecret> {
        let bytes = fs::read(&self.client_secret_file).await?;
        let file: ClientSecretFile = serde_json::from_slice(&bytes)?;
        file.installed.or(file.web).ok_or_else(|| Error::OAuth {
            reason: format!(
                "client secret file {} has neither an 'installed' nor a 'web' section",
                self.client_secret_file.display()
            ),
        })
    }

    async fn refresh(&self, secret: &ClientSecret, refresh_token: String) -> Result<StoredToken> {
        log::info!("Refreshing access token");
        let response = self
            .token_request(
                secret,
                &[
                    ("client_id", secret.client_id.as_str()),
                    ("client_secret", secret.client_secret.as_str()),
                    ("refresh_token", refresh_token.as_str()),
                    ("grant_type", "refresh_token"),
                ],
            )
            .await?;
        Ok(StoredToken::from_response(response, Some(refresh_token)))
    }

    /// Ask the user to visit the consent page and paste back the authorization code.
    async fn request_consent(&self, secret: &ClientSecret) -> Result<StoredToken> {
        let mut params = vec![
            ("client_id", secret.client_id.as_str()),
            ("redirect_uri", secret.redirect_uri()),
            ("response_type", "code"),
            ("scope", self.scope.as_str()),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ];
        if let Some(hint) = &self.login_hint {
            params.push(("login_hint", hint.as_str()));
        }
        let url = reqwest::Url::parse_with_params(&secret.auth_uri, &params).map_err(|e| {
            Error::OAuth {
                reason: format!("invalid auth_uri '{}': {e}", secret.auth_uri),
            }
        })?;

        eprintln!("Authorize this app by visiting this url: {url}");
        eprint!("Enter the code from that page here: ");

        let mut code = String::new();
        BufReader::new(tokio::io::stdin()).read_line(&mut code).await?;
        let code = code.trim();
        if code.is_empty() {
            return OAuthSnafu {
                reason: "no authorization code entered",
            }
            .fail();
        }

        let response = self
            .token_request(
                secret,
                &[
                    ("client_id", secret.client_id.as_str()),
                    ("client_secret", secret.client_secret.as_str()),
                    ("code", code),
                    ("redirect_uri", secret.redirect_uri()),
                    ("grant_type", "authorization_code"),
                ],
            )
            .await?;
        Ok(StoredToken::from_response(response, None))
    }

    async fn token_request(
        &self,
        secret: &ClientSecret,
        params: &[(&str, &str)],
    ) -> Result<TokenResponse> {
        let response = self
            .http
            .post(secret.token_uri.as_str())
            .form(params)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return OAuthSnafu {
                reason: format!("token endpoint returned HTTP {}: {body}", status.as_u16()),
            }
            .fail();
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl Authorizer for TokenFileAuthorizer {
    async fn authorize(&self) -> Result<Credential> {
        // Held across refresh so concurrent callers wait for a single token exchange.
        let mut cached = self.token.lock().await;
        if cached.is_none() {
            *cached = self.load_token().await?;
        }
        if let Some(token) = cached.as_ref().filter(|token| token.is_fresh()) {
            return Ok(token.credential());
        }

        let secret = self.load_client_secret().await?;
        let renewed = match cached.as_ref().and_then(|token| token.refresh_token.clone()) {
            Some(refresh_token) => self.refresh(&secret, refresh_token).await?,
            None => self.request_consent(&secret).await?,
        };
        self.store_token(&renewed).await?;

        let credential = renewed.credential();
        *cached = Some(renewed);
        Ok(credential)
    }
}
