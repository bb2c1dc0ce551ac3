//! Process-local store used for development runs and tests.
//!
//! All tables sit behind one lock, so every compound operation observes and
//! mutates a consistent snapshot.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::RwLock;

use super::{AuthorityStore, EventStore, MemberStore, Revocation, Store, StoreError, StoreResult};
use crate::models::{Event, Manage, Member, Timeline};

#[derive(Default)]
struct Tables {
    events: BTreeMap<String, Event>,
    manages: BTreeSet<Manage>,
    members: BTreeMap<String, Member>,
}

impl Tables {
    fn has_managers(&self, event_id: &str) -> bool {
        self.manages.iter().any(|m| m.event_id == event_id)
    }

    fn require_member(&self, member_id: &str) -> StoreResult<()> {
        if self.members.contains_key(member_id) {
            Ok(())
        } else {
            Err(StoreError::Conflict(format!(
                "member '{}' does not exist",
                member_id
            )))
        }
    }

    fn drop_event(&mut self, event_id: &str) -> bool {
        self.manages.retain(|m| m.event_id != event_id);
        self.events.remove(event_id).is_some()
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn find_event(&self, event_id: &str) -> StoreResult<Option<Event>> {
        Ok(self.tables.read().await.events.get(event_id).cloned())
    }

    async fn list_managed_events(
        &self,
        member_id: &str,
        timeline: Timeline,
        now: NaiveDateTime,
    ) -> StoreResult<Vec<Event>> {
        let tables = self.tables.read().await;
        let mut events: Vec<Event> = tables
            .manages
            .iter()
            .filter(|m| m.member_id == member_id)
            .filter_map(|m| tables.events.get(&m.event_id))
            .filter(|e| timeline.admits(e, now))
            .cloned()
            .collect();
        events.sort_by(|a, b| a.date_time.cmp(&b.date_time));
        Ok(events)
    }

    async fn update_event(&self, event: &Event) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.events.get_mut(&event.event_id) {
            Some(stored) => {
                *stored = event.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl AuthorityStore for MemoryStore {
    async fn list_managers(&self, event_id: &str) -> StoreResult<Vec<String>> {
        let tables = self.tables.read().await;
        Ok(tables
            .manages
            .iter()
            .filter(|m| m.event_id == event_id)
            .map(|m| m.member_id.clone())
            .collect())
    }

    async fn insert_manager(&self, member_id: &str, event_id: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.events.contains_key(event_id) {
            return Err(StoreError::Conflict(format!(
                "event '{}' does not exist",
                event_id
            )));
        }
        tables.require_member(member_id)?;
        Ok(tables.manages.insert(Manage::new(member_id, event_id)))
    }
}

#[async_trait]
impl MemberStore for MemoryStore {
    async fn find_member(&self, member_id: &str) -> StoreResult<Option<Member>> {
        Ok(self.tables.read().await.members.get(member_id).cloned())
    }

    async fn list_members(&self) -> StoreResult<Vec<Member>> {
        Ok(self.tables.read().await.members.values().cloned().collect())
    }

    async fn insert_member(&self, member: &Member) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.members.contains_key(&member.member_id) {
            return Err(StoreError::Conflict(format!(
                "member '{}' already exists",
                member.member_id
            )));
        }
        tables
            .members
            .insert(member.member_id.clone(), member.clone());
        Ok(())
    }

    async fn update_member(&self, member: &Member) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.members.get_mut(&member.member_id) {
            Some(stored) => {
                *stored = member.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_event_with_manager(&self, event: &Event, member_id: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.events.contains_key(&event.event_id) {
            return Err(StoreError::Conflict(format!(
                "event '{}' already exists",
                event.event_id
            )));
        }
        tables.require_member(member_id)?;
        tables.events.insert(event.event_id.clone(), event.clone());
        tables
            .manages
            .insert(Manage::new(member_id, event.event_id.clone()));
        Ok(())
    }

    async fn delete_event(&self, event_id: &str) -> StoreResult<bool> {
        Ok(self.tables.write().await.drop_event(event_id))
    }

    async fn revoke_manager(&self, member_id: &str, event_id: &str) -> StoreResult<Revocation> {
        let mut tables = self.tables.write().await;
        let revoked = tables.manages.remove(&Manage::new(member_id, event_id));
        let event_deleted = !tables.has_managers(event_id) && tables.drop_event(event_id);
        Ok(Revocation {
            revoked,
            event_deleted,
        })
    }

    async fn delete_member(&self, member_id: &str) -> StoreResult<Option<Vec<String>>> {
        let mut tables = self.tables.write().await;
        if tables.members.remove(member_id).is_none() {
            return Ok(None);
        }

        let managed: Vec<String> = tables
            .manages
            .iter()
            .filter(|m| m.member_id == member_id)
            .map(|m| m.event_id.clone())
            .collect();
        tables.manages.retain(|m| m.member_id != member_id);

        let mut deleted = Vec::new();
        for event_id in managed {
            if !tables.has_managers(&event_id) && tables.drop_event(&event_id) {
                deleted.push(event_id);
            }
        }
        Ok(Some(deleted))
    }
}
