//! External identity provider boundary.
//!
//! Login hands an authorization code to an [`IdentityProvider`], which
//! trades it for tokens and then reads the caller's profile. Nothing else in
//! the crate depends on a particular provider's transport.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod kakao;

pub use kakao::{KakaoConfig, KakaoProvider};

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("request to identity provider failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("identity provider returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("unexpected identity provider response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Profile as reported by the provider, already mapped to local ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Provider-prefixed member id.
    pub member_id: String,
    pub name: String,
    pub email: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn exchange_code(&self, code: &str) -> Result<OAuthTokens, OAuthError>;

    async fn fetch_profile(&self, access_token: &str) -> Result<Profile, OAuthError>;
}
