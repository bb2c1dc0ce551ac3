#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use invitation_server::auth::{issue_token, JwtConfig};
use invitation_server::config::{Config, StoreBackend};
use invitation_server::models::Member;
use invitation_server::oauth::{IdentityProvider, KakaoConfig, OAuthError, OAuthTokens, Profile};
use invitation_server::routes::create_routes;
use invitation_server::state::AppState;
use invitation_server::store::{MemberStore, MemoryStore};

pub const FUTURE: &str = "2099-05-01T18:00:00.000";
pub const PAST: &str = "2001-05-01T18:00:00.000";

/// Hands out a fixed profile for code `"valid"`, rejects anything else.
pub struct FakeProvider;

#[async_trait]
impl IdentityProvider for FakeProvider {
    async fn exchange_code(&self, code: &str) -> Result<OAuthTokens, OAuthError> {
        if code != "valid" {
            return Err(OAuthError::Rejected {
                status: 401,
                body: "invalid_grant".into(),
            });
        }
        Ok(OAuthTokens {
            access_token: "access".into(),
            refresh_token: "refresh".into(),
        })
    }

    async fn fetch_profile(&self, _access_token: &str) -> Result<Profile, OAuthError> {
        Ok(Profile {
            member_id: "K1000".into(),
            name: "tester".into(),
            email: Some("tester@example.com".into()),
        })
    }
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret".into(),
        expiry_mins: 30,
    }
}

pub fn test_config() -> Config {
    Config {
        store: StoreBackend::Memory,
        host: "127.0.0.1".into(),
        port: 0,
        jwt: jwt_config(),
        kakao: KakaoConfig {
            client_id: "test".into(),
            redirect_uri: "http://localhost/cb".into(),
            auth_base_url: "http://localhost".into(),
            api_base_url: "http://localhost".into(),
        },
        cors_allowed_origins: vec!["http://localhost:5173".into()],
        production: false,
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    /// Registers members `A`, `B` and `C`.
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        for id in ["A", "B", "C"] {
            store
                .insert_member(&Member {
                    member_id: id.into(),
                    name: id.to_lowercase(),
                    email: None,
                })
                .await
                .unwrap();
        }
        let state = AppState::new(test_config(), store.clone(), Arc::new(FakeProvider));
        Self {
            router: create_routes(state),
            store,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        member: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(member_id) = member {
            let token = issue_token(member_id, &jwt_config()).unwrap();
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, member: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(member), None).await
    }

    /// Creates an event as `member` and returns its id.
    pub async fn create_event(&self, member: &str, datetime: &str) -> String {
        let (status, json) = self
            .request(
                Method::POST,
                "/api/events",
                Some(member),
                Some(event_body(datetime)),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create failed: {}", json);
        json["data"]["event_id"].as_str().unwrap().to_string()
    }
}

pub fn event_body(datetime: &str) -> Value {
    serde_json::json!({
        "type": "wedding",
        "datetime": datetime,
        "location": "Seoul",
        "host": {"groom": "Kim", "bride": "Lee"}
    })
}
