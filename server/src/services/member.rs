//! Member accounts and provider login.

use std::sync::Arc;

use serde::Serialize;

use crate::auth::jwt::{issue_token, JwtConfig};
use crate::models::{Member, MemberUpdate};
use crate::oauth::IdentityProvider;
use crate::store::{Store, StoreResult};
use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize)]
pub struct LoginSession {
    pub token: String,
    pub member: Member,
    /// First login for this provider account.
    pub created: bool,
}

#[derive(Clone)]
pub struct MemberService {
    store: Arc<dyn Store>,
    identity: Arc<dyn IdentityProvider>,
    jwt: JwtConfig,
}

impl MemberService {
    pub fn new(store: Arc<dyn Store>, identity: Arc<dyn IdentityProvider>, jwt: JwtConfig) -> Self {
        Self {
            store,
            identity,
            jwt,
        }
    }

    /// Trades an authorization code for a session. Known members get their
    /// name and email refreshed from the provider profile.
    pub async fn login(&self, code: &str) -> AppResult<LoginSession> {
        let tokens = self.identity.exchange_code(code).await?;
        let profile = self.identity.fetch_profile(&tokens.access_token).await?;

        let member = Member {
            member_id: profile.member_id,
            name: profile.name,
            email: profile.email,
        };

        let created = match self.store.find_member(&member.member_id).await? {
            Some(existing) if existing == member => false,
            Some(_) => {
                self.store.update_member(&member).await?;
                false
            }
            None => {
                self.store.insert_member(&member).await?;
                tracing::info!(member_id = %member.member_id, "Member registered");
                true
            }
        };

        let token = issue_token(&member.member_id, &self.jwt)
            .map_err(|e| AppError::InternalServerError(format!("failed to issue token: {}", e)))?;

        tracing::info!(member_id = %member.member_id, "Member logged in");
        Ok(LoginSession {
            token,
            member,
            created,
        })
    }

    pub async fn get_member(&self, member_id: &str) -> StoreResult<Option<Member>> {
        self.store.find_member(member_id).await
    }

    pub async fn list_members(&self) -> StoreResult<Vec<Member>> {
        self.store.list_members().await
    }

    pub async fn update_member(&self, member_id: &str, update: MemberUpdate) -> StoreResult<Option<Member>> {
        let member = Member {
            member_id: member_id.to_string(),
            name: update.name,
            email: update.email,
        };
        if !self.store.update_member(&member).await? {
            return Ok(None);
        }
        tracing::info!(member_id, "Member updated");
        Ok(Some(member))
    }

    /// Removes the account and any event it was the last manager of.
    pub async fn delete_member(&self, member_id: &str) -> StoreResult<Option<Vec<String>>> {
        let deleted = self.store.delete_member(member_id).await?;
        if let Some(events) = &deleted {
            tracing::info!(member_id, cascaded_events = events.len(), "Member deleted");
        }
        Ok(deleted)
    }
}
