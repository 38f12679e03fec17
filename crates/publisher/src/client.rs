//! Instagram Graph API client.

use std::time::Duration;

use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use postcraft_common::config::InstagramConfig;
use postcraft_post_model::schedule::{PublishRequest, ScheduleRequest, ScheduledPost};
use postcraft_store::{CredentialStore, Credentials, ScheduleLedger, SharedStore};

use crate::error::{PublishError, PublishResult};

/// Permissions requested during authorization.
pub const OAUTH_SCOPE: &str =
    "user_profile,user_media,instagram_basic,instagram_content_publish";

/// Account details returned by the Graph API. Fields the token cannot see
/// are absent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserInfo {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
    #[serde(default)]
    pub followers_count: Option<u64>,
    #[serde(default)]
    pub media_count: Option<u64>,
}

#[derive(Deserialize)]
struct ShortLivedToken {
    access_token: String,
    user_id: UserId,
}

/// The token endpoint returns the user id as a number; accept either form.
#[derive(Deserialize)]
#[serde(untagged)]
enum UserId {
    Number(u64),
    Text(String),
}

impl UserId {
    fn into_string(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

#[derive(Deserialize)]
struct LongLivedToken {
    access_token: String,
}

#[derive(Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

pub struct InstagramClient {
    http: reqwest::Client,
    config: InstagramConfig,
    credentials: CredentialStore,
    ledger: ScheduleLedger,
    session: Option<Credentials>,
}

impl InstagramClient {
    /// Build a client and pick up any stored credentials.
    pub fn new(config: InstagramConfig, store: SharedStore) -> PublishResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let credentials = CredentialStore::new(store.clone());
        let session = credentials.load()?;
        if let Some(s) = &session {
            tracing::debug!(user_id = %s.user_id, "Loaded stored Instagram credentials");
        }

        Ok(Self {
            http,
            config,
            credentials,
            ledger: ScheduleLedger::new(store),
            session,
        })
    }

    fn client_id(&self) -> PublishResult<&str> {
        self.config
            .client_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(PublishError::NotConfigured {
                field: "client id",
                env: "CLIENT_ID",
            })
    }

    fn client_secret(&self) -> PublishResult<&str> {
        self.config
            .client_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(PublishError::NotConfigured {
                field: "client secret",
                env: "CLIENT_SECRET",
            })
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.auth_base_url.trim_end_matches('/'))
    }

    fn graph_url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.graph_base_url.trim_end_matches('/'))
    }

    fn session(&self) -> PublishResult<&Credentials> {
        self.session.as_ref().ok_or(PublishError::NotAuthenticated)
    }

    /// URL the user opens to grant access.
    pub fn authorize_url(&self) -> PublishResult<String> {
        let url = Url::parse_with_params(
            &self.auth_url("oauth/authorize"),
            &[
                ("client_id", self.client_id()?),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", OAUTH_SCOPE),
                ("response_type", "code"),
            ],
        )
        .map_err(|e| PublishError::InvalidConfig {
            field: "auth_base_url",
            value: self.config.auth_base_url.clone(),
            reason: e.to_string(),
        })?;
        Ok(url.into())
    }

    /// Extract the authorization code from the redirect URL.
    pub fn parse_callback(url: &str) -> PublishResult<String> {
        let url = Url::parse(url).map_err(|e| PublishError::InvalidCallback(e.to_string()))?;
        let mut code = None;
        let mut error = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => code = Some(value.into_owned()),
                "error_description" => error = Some(value.into_owned()),
                "error" if error.is_none() => error = Some(value.into_owned()),
                _ => {}
            }
        }
        if let Some(reason) = error {
            return Err(PublishError::AuthorizationDenied(reason));
        }
        code.filter(|c| !c.is_empty())
            .ok_or_else(|| PublishError::InvalidCallback("no code parameter".to_string()))
    }

    /// Exchange an authorization code for a long-lived token and store it.
    pub async fn complete_authorization(&mut self, code: &str) -> PublishResult<()> {
        let client_id = self.client_id()?.to_string();
        let client_secret = self.client_secret()?.to_string();

        let response = self
            .http
            .post(self.auth_url("oauth/access_token"))
            .form(&[
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
                ("grant_type", "authorization_code"),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("code", code),
            ])
            .send()
            .await?;
        let short: ShortLivedToken =
            read_json(response, "Failed to exchange code for token").await?;

        let response = self
            .http
            .get(self.graph_url("access_token"))
            .query(&[
                ("grant_type", "ig_exchange_token"),
                ("client_secret", client_secret.as_str()),
                ("access_token", short.access_token.as_str()),
            ])
            .send()
            .await?;
        let long: LongLivedToken = read_json(response, "Failed to get long-lived token").await?;

        let credentials = Credentials {
            access_token: long.access_token,
            user_id: short.user_id.into_string(),
        };
        self.credentials.save(&credentials)?;
        tracing::info!(user_id = %credentials.user_id, "Authenticated with Instagram");
        self.session = Some(credentials);
        Ok(())
    }

    pub async fn user_info(&self) -> PublishResult<UserInfo> {
        let session = self.session()?;
        let response = self
            .http
            .get(self.graph_url(&session.user_id))
            .query(&[
                (
                    "fields",
                    "id,username,name,profile_picture_url,followers_count,media_count",
                ),
                ("access_token", session.access_token.as_str()),
            ])
            .send()
            .await?;
        read_json(response, "Failed to fetch user info").await
    }

    /// Probe the stored token. A rejected or unreachable probe logs out.
    pub async fn is_connected(&mut self) -> PublishResult<bool> {
        let Ok(session) = self.session() else {
            return Ok(false);
        };
        let probe = self
            .http
            .get(self.graph_url(&session.user_id))
            .query(&[("fields", "id"), ("access_token", session.access_token.as_str())])
            .send()
            .await;

        match probe {
            Ok(r) if r.status().is_success() => Ok(true),
            Ok(r) => {
                tracing::warn!(status = r.status().as_u16(), "Stored Instagram token rejected");
                self.disconnect()?;
                Ok(false)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Instagram token probe failed");
                self.disconnect()?;
                Ok(false)
            }
        }
    }

    pub fn disconnect(&mut self) -> PublishResult<()> {
        self.credentials.clear()?;
        self.session = None;
        tracing::info!("Disconnected from Instagram");
        Ok(())
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.access_token.as_str())
    }

    async fn create_container(&self, image_url: &str, caption: &str) -> PublishResult<String> {
        let session = self.session()?;
        let response = self
            .http
            .post(self.graph_url(&format!("{}/media", session.user_id)))
            .json(&serde_json::json!({
                "image_url": image_url,
                "caption": caption,
                "access_token": session.access_token,
            }))
            .send()
            .await?;
        let created: IdResponse =
            read_json(response, "Failed to create media container").await?;
        tracing::debug!(container_id = %created.id, "Created media container");
        Ok(created.id)
    }

    /// Publish now. Returns the id of the published media.
    pub async fn publish_post(&self, request: &PublishRequest) -> PublishResult<String> {
        let session = self.session()?;
        let container = self
            .create_container(&request.image_url, &request.full_caption())
            .await?;

        let response = self
            .http
            .post(self.graph_url(&format!("{}/media_publish", session.user_id)))
            .json(&serde_json::json!({
                "creation_id": container,
                "access_token": session.access_token,
            }))
            .send()
            .await?;
        let published: IdResponse = read_json(response, "Failed to publish post").await?;

        tracing::info!(post_id = %request.post_id, media_id = %published.id, "Published post");
        Ok(published.id)
    }

    /// Create the container now and record the intent locally. Returns the
    /// scheduled entry id, which is the container id.
    pub async fn schedule_post(&self, request: &ScheduleRequest) -> PublishResult<String> {
        self.session()?;
        let container = self
            .create_container(&request.image_url, &request.full_caption())
            .await?;

        let entry = ScheduledPost::new(&request.post_id, &container, request.scheduled_time);
        self.ledger.record(entry)?;

        tracing::info!(
            post_id = %request.post_id,
            scheduled_id = %container,
            at = %request.scheduled_time,
            "Scheduled post"
        );
        Ok(container)
    }

    pub fn scheduled_posts(&self) -> PublishResult<Vec<ScheduledPost>> {
        Ok(self.ledger.scheduled()?)
    }

    pub fn cancel_scheduled_post(&self, scheduled_id: &str) -> PublishResult<bool> {
        let removed = self.ledger.cancel(scheduled_id)?;
        tracing::info!(scheduled_id, removed, "Cancelled scheduled post");
        Ok(removed)
    }
}

/// Decode a success body, or turn the Graph error body into
/// [`PublishError::Api`], falling back to `fallback` when it has no message.
async fn read_json<T: DeserializeOwned>(response: Response, fallback: &str) -> PublishResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| fallback.to_string());
    Err(PublishError::Api {
        status: status.as_u16(),
        message,
    })
}
