//! Event authorization: who may read, change, or delete an event, and how
//! authority changes cascade into the event's lifecycle.
//!
//! Every gated operation first obtains an [`EventCapability`] through
//! [`EventAuthorizationService::authorize`]. Lack of authority is an
//! ordinary [`Access::Denied`] result, never an error.

use std::sync::Arc;

use crate::models::{Event, EventInput, Timeline};
use crate::store::{Revocation, Store, StoreResult};
use crate::utils::datetime;

/// Proof that a member was in an event's authority set when checked.
/// Only [`EventAuthorizationService::authorize`] can create one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCapability {
    event_id: String,
    member_id: String,
}

impl EventCapability {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn member_id(&self) -> &str {
        &self.member_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access<T> {
    Granted(T),
    Denied,
}

impl<T> Access<T> {
    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted(_))
    }

    pub fn granted(self) -> Option<T> {
        match self {
            Access::Granted(value) => Some(value),
            Access::Denied => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantOutcome {
    Inserted,
    AlreadyManager,
    UnknownMember,
}

#[derive(Clone)]
pub struct EventAuthorizationService {
    store: Arc<dyn Store>,
}

impl EventAuthorizationService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Membership test against the authority set as persisted right now.
    pub async fn authorize(
        &self,
        event_id: &str,
        member_id: &str,
    ) -> StoreResult<Option<EventCapability>> {
        let managers = self.store.list_managers(event_id).await?;
        if managers.iter().any(|m| m == member_id) {
            Ok(Some(EventCapability {
                event_id: event_id.to_string(),
                member_id: member_id.to_string(),
            }))
        } else {
            tracing::info!(event_id, member_id, "Authorization denied");
            Ok(None)
        }
    }

    pub async fn is_authorized(&self, event_id: &str, member_id: &str) -> StoreResult<bool> {
        Ok(self.authorize(event_id, member_id).await?.is_some())
    }

    /// `Granted(None)` means the caller is authorized but the event is gone.
    pub async fn get_event(
        &self,
        member_id: &str,
        event_id: &str,
    ) -> StoreResult<Access<Option<Event>>> {
        let Some(cap) = self.authorize(event_id, member_id).await? else {
            return Ok(Access::Denied);
        };
        Ok(Access::Granted(self.store.find_event(cap.event_id()).await?))
    }

    /// Persists a new event with `member_id` as its first manager.
    pub async fn create_event(&self, member_id: &str, input: EventInput) -> StoreResult<Event> {
        let event = Event::create(input);
        self.store
            .create_event_with_manager(&event, member_id)
            .await?;
        tracing::info!(event_id = %event.event_id, member_id, "Event created");
        Ok(event)
    }

    /// Adds `target_member` to the authority set. The acting member must
    /// already hold authority; the target must be a registered member.
    pub async fn grant_authority(
        &self,
        acting_member: &str,
        event_id: &str,
        target_member: &str,
    ) -> StoreResult<Access<GrantOutcome>> {
        let Some(cap) = self.authorize(event_id, acting_member).await? else {
            return Ok(Access::Denied);
        };
        if self.store.find_member(target_member).await?.is_none() {
            return Ok(Access::Granted(GrantOutcome::UnknownMember));
        }
        let outcome = if self
            .store
            .insert_manager(target_member, cap.event_id())
            .await?
        {
            GrantOutcome::Inserted
        } else {
            GrantOutcome::AlreadyManager
        };
        tracing::info!(
            event_id,
            acting_member,
            target_member,
            outcome = ?outcome,
            "Authority granted"
        );
        Ok(Access::Granted(outcome))
    }

    /// Full replace of the mutable fields. `Granted(None)` if the event is gone.
    pub async fn update_event(
        &self,
        acting_member: &str,
        event_id: &str,
        input: EventInput,
    ) -> StoreResult<Access<Option<Event>>> {
        let Some(cap) = self.authorize(event_id, acting_member).await? else {
            return Ok(Access::Denied);
        };
        let event = Event::with_id(cap.event_id().to_string(), input);
        if !self.store.update_event(&event).await? {
            return Ok(Access::Granted(None));
        }
        tracing::info!(event_id, acting_member, "Event updated");
        Ok(Access::Granted(Some(event)))
    }

    /// Deletes the event and every authority record pointing at it.
    pub async fn delete_event(&self, acting_member: &str, event_id: &str) -> StoreResult<Access<bool>> {
        let Some(cap) = self.authorize(event_id, acting_member).await? else {
            return Ok(Access::Denied);
        };
        let deleted = self.store.delete_event(cap.event_id()).await?;
        tracing::info!(event_id, acting_member, deleted, "Event deleted");
        Ok(Access::Granted(deleted))
    }

    /// Drops the caller's own authority record. Needs no capability: a
    /// member may always give up their own authority.
    pub async fn revoke_own_authority(
        &self,
        member_id: &str,
        event_id: &str,
    ) -> StoreResult<Revocation> {
        let outcome = self.store.revoke_manager(member_id, event_id).await?;
        tracing::info!(
            event_id,
            member_id,
            revoked = outcome.revoked,
            event_deleted = outcome.event_deleted,
            "Authority revoked"
        );
        Ok(outcome)
    }

    pub async fn list_progressing(&self, member_id: &str) -> StoreResult<Vec<Event>> {
        self.store
            .list_managed_events(member_id, Timeline::Progressing, datetime::now())
            .await
    }

    pub async fn list_done(&self, member_id: &str) -> StoreResult<Vec<Event>> {
        self.store
            .list_managed_events(member_id, Timeline::Done, datetime::now())
            .await
    }
}
