//! Persistence for events, authority records and members.
//!
//! The three leaf traits map one-to-one onto tables. [`Store`] adds the
//! units of work that touch more than one table; implementations must run
//! each of them atomically so that an event is never visible without at
//! least one manager.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use thiserror::Error;

use crate::models::{Event, Member, Timeline};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("conflict: {0}")]
    Conflict(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of removing one authority record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Revocation {
    /// A `(member_id, event_id)` record existed and was removed.
    pub revoked: bool,
    /// The event lost its last manager and was deleted with it.
    pub event_deleted: bool,
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn find_event(&self, event_id: &str) -> StoreResult<Option<Event>>;

    /// Events `member_id` manages on one side of `now`, earliest first.
    async fn list_managed_events(
        &self,
        member_id: &str,
        timeline: Timeline,
        now: NaiveDateTime,
    ) -> StoreResult<Vec<Event>>;

    /// Replaces the mutable fields. Returns `false` if the event is gone.
    async fn update_event(&self, event: &Event) -> StoreResult<bool>;
}

#[async_trait]
pub trait AuthorityStore: Send + Sync {
    async fn list_managers(&self, event_id: &str) -> StoreResult<Vec<String>>;

    /// Inserts the pair unless it already exists. Returns `true` on insert.
    async fn insert_manager(&self, member_id: &str, event_id: &str) -> StoreResult<bool>;
}

#[async_trait]
pub trait MemberStore: Send + Sync {
    async fn find_member(&self, member_id: &str) -> StoreResult<Option<Member>>;

    async fn list_members(&self) -> StoreResult<Vec<Member>>;

    async fn insert_member(&self, member: &Member) -> StoreResult<()>;

    /// Returns `false` if no such member exists.
    async fn update_member(&self, member: &Member) -> StoreResult<bool>;
}

#[async_trait]
pub trait Store: EventStore + AuthorityStore + MemberStore {
    /// Persists `event` and binds `member_id` as its first manager.
    async fn create_event_with_manager(&self, event: &Event, member_id: &str) -> StoreResult<()>;

    /// Deletes the event together with all of its authority records.
    async fn delete_event(&self, event_id: &str) -> StoreResult<bool>;

    /// Removes one authority record and deletes the event if that left it
    /// without managers.
    async fn revoke_manager(&self, member_id: &str, event_id: &str) -> StoreResult<Revocation>;

    /// Deletes the member, their authority records, and every event that
    /// no longer has a manager afterwards. Returns the deleted event ids,
    /// or `None` if the member did not exist.
    async fn delete_member(&self, member_id: &str) -> StoreResult<Option<Vec<String>>>;
}
