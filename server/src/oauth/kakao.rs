//! Kakao login: `POST /oauth/token` on the auth host, `GET /v2/user/me` on
//! the API host.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::{IdentityProvider, OAuthError, OAuthTokens, Profile};

/// Prefix that marks member ids minted from Kakao accounts.
pub const MEMBER_ID_PREFIX: &str = "K";

pub const DEFAULT_AUTH_BASE_URL: &str = "https://kauth.kakao.com";
pub const DEFAULT_API_BASE_URL: &str = "https://kapi.kakao.com";

#[derive(Debug, Clone)]
pub struct KakaoConfig {
    pub client_id: String,
    pub redirect_uri: String,
    pub auth_base_url: String,
    pub api_base_url: String,
}

pub struct KakaoProvider {
    client: Client,
    config: KakaoConfig,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: String,
}

impl KakaoProvider {
    pub fn new(config: KakaoConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}{}", self.config.auth_base_url.trim_end_matches('/'), path)
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url.trim_end_matches('/'), path)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, OAuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(OAuthError::Rejected {
        status: status.as_u16(),
        body,
    })
}

/// Maps a `/v2/user/me` body onto a [`Profile`].
///
/// The email is only taken when the account does not still need the
/// user's agreement to share it.
pub fn profile_from_user_info(body: &Value) -> Result<Profile, OAuthError> {
    let id = match &body["id"] {
        Value::Number(n) => n.to_string(),
        Value::String(s) if !s.is_empty() => s.clone(),
        _ => return Err(OAuthError::InvalidResponse("missing user id".into())),
    };

    let name = body["properties"]["nickname"]
        .as_str()
        .ok_or_else(|| OAuthError::InvalidResponse("missing nickname".into()))?
        .to_string();

    let account = &body["kakao_account"];
    let needs_agreement = account["email_needs_agreement"].as_bool().unwrap_or(true);
    let email = if needs_agreement {
        None
    } else {
        account["email"].as_str().map(str::to_string)
    };

    Ok(Profile {
        member_id: format!("{}{}", MEMBER_ID_PREFIX, id),
        name,
        email,
    })
}

#[async_trait]
impl IdentityProvider for KakaoProvider {
    async fn exchange_code(&self, code: &str) -> Result<OAuthTokens, OAuthError> {
        let response = self
            .client
            .post(self.auth_url("/oauth/token"))
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("code", code),
            ])
            .send()
            .await?;

        let tokens: TokenResponse = check_status(response).await?.json().await?;
        tracing::debug!("Exchanged authorization code with Kakao");

        Ok(OAuthTokens {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        })
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<Profile, OAuthError> {
        let response = self
            .client
            .get(self.api_url("/v2/user/me"))
            .bearer_auth(access_token)
            .send()
            .await?;

        let body: Value = check_status(response).await?.json().await?;
        profile_from_user_info(&body)
    }
}
