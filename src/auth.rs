//! Authentication boundary.
//!
//! Email+password sign-in/sign-up/sign-out against the remote provider's
//! identity service, plus a session query and an on-change subscription.
//! Session presence gates the application behind the login screen; the
//! session object is passed down explicitly rather than living in an
//! ambient singleton.

use crate::config::RemoteConfig;
use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::sync::watch;
use tracing::{info, instrument};

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub email: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    user: Option<TokenUser>,
}

#[derive(Deserialize)]
struct TokenUser {
    #[serde(default)]
    email: Option<String>,
}

pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    state: watch::Sender<Option<Session>>,
}

impl AuthClient {
    #[must_use]
    pub fn new(config: &RemoteConfig) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            http: reqwest::Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.anon_key.clone(),
            state,
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    async fn token_request(&self, url: String, email: &str, password: &str) -> Result<Session> {
        let response = self
            .http
            .post(url)
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!("{status}: {body}")));
        }
        let token: TokenResponse = response.json().await?;
        let session = Session {
            access_token: token.access_token,
            email: token.user.and_then(|user| user.email),
            expires_at: token
                .expires_in
                .map(|seconds| Utc::now() + chrono::Duration::seconds(seconds)),
        };
        self.state.send_replace(Some(session.clone()));
        Ok(session)
    }

    /// Signs an existing user in with email and password.
    ///
    /// # Errors
    /// Returns [`Error::Auth`] when the provider rejects the credentials,
    /// or a transport error when it cannot be reached.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let url = format!("{}?grant_type=password", self.auth_url("token"));
        let session = self.token_request(url, email, password).await?;
        info!(email, "signed in");
        Ok(session)
    }

    /// Registers a new user and signs them in.
    ///
    /// # Errors
    /// Returns [`Error::Auth`] when the provider rejects the request.
    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session> {
        let session = self.token_request(self.auth_url("signup"), email, password).await?;
        info!(email, "signed up");
        Ok(session)
    }

    /// Ends the current session. Signing out without a session is a no-op.
    ///
    /// # Errors
    /// Returns a transport error when the provider cannot be reached; the
    /// local session is cleared regardless.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<()> {
        let Some(session) = self.session() else {
            return Ok(());
        };
        self.state.send_replace(None);
        let response = self
            .http
            .post(self.auth_url("logout"))
            .header("apikey", &self.api_key)
            .bearer_auth(session.access_token)
            .send()
            .await?;
        if !response.status().is_success() {
            info!(status = %response.status(), "remote sign-out rejected, session cleared locally");
        }
        Ok(())
    }

    /// The current session, if any.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.state.borrow().clone()
    }

    /// Subscription to session changes; receivers observe sign-in and
    /// sign-out transitions.
    #[must_use]
    pub fn on_auth_change(&self) -> watch::Receiver<Option<Session>> {
        self.state.subscribe()
    }
}
