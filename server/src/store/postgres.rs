//! Postgres-backed store. Schema lives in `migrations/`.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};

use super::{
    AuthorityStore, EventStore, MemberStore, Revocation, Store, StoreError, StoreResult,
};
use crate::models::{Event, Member, Timeline};

/// Column list for events queries.
const EVENT_COLUMNS: &str = "e.event_id, e.event_type, e.date_time, e.location, e.host";

const MEMBER_COLUMNS: &str = "member_id, name, email";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects, then applies pending migrations.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        tracing::info!("Successfully connected to database");

        sqlx::migrate!()
            .run(&pool)
            .await
            .map_err(sqlx::Error::from)?;
        tracing::info!("Migrations run successfully");

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Reports a dangling member or event reference as a conflict, matching
/// the in-memory store.
fn map_reference_error(err: sqlx::Error, what: impl FnOnce() -> String) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) {
            return StoreError::Conflict(what());
        }
    }
    StoreError::Database(err)
}

/// Locks the event row so concurrent grants and revocations on the same
/// event serialize behind this transaction.
async fn lock_event(tx: &mut Transaction<'_, Postgres>, event_id: &str) -> StoreResult<bool> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT event_id FROM events WHERE event_id = $1 FOR UPDATE")
            .bind(event_id)
            .fetch_optional(&mut **tx)
            .await?;
    Ok(row.is_some())
}

/// Deletes the event if no authority record references it any more.
async fn delete_if_unmanaged(
    tx: &mut Transaction<'_, Postgres>,
    event_id: &str,
) -> StoreResult<bool> {
    let result = sqlx::query(
        "DELETE FROM events e
         WHERE e.event_id = $1
           AND NOT EXISTS (SELECT 1 FROM manages m WHERE m.event_id = e.event_id)",
    )
    .bind(event_id)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected() > 0)
}

#[async_trait]
impl EventStore for PgStore {
    async fn find_event(&self, event_id: &str) -> StoreResult<Option<Event>> {
        let query = format!("SELECT {EVENT_COLUMNS} FROM events e WHERE e.event_id = $1");
        let event = sqlx::query_as::<_, Event>(&query)
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    async fn list_managed_events(
        &self,
        member_id: &str,
        timeline: Timeline,
        now: NaiveDateTime,
    ) -> StoreResult<Vec<Event>> {
        let comparison = match timeline {
            Timeline::Progressing => ">=",
            Timeline::Done => "<",
        };
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM events e
             JOIN manages m ON m.event_id = e.event_id
             WHERE m.member_id = $1 AND e.date_time {comparison} $2
             ORDER BY e.date_time ASC"
        );
        let events = sqlx::query_as::<_, Event>(&query)
            .bind(member_id)
            .bind(now)
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    async fn update_event(&self, event: &Event) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE events
             SET event_type = $1, date_time = $2, location = $3, host = $4, updated_at = now()
             WHERE event_id = $5",
        )
        .bind(&event.event_type)
        .bind(event.date_time)
        .bind(&event.location)
        .bind(&event.host)
        .bind(&event.event_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AuthorityStore for PgStore {
    async fn list_managers(&self, event_id: &str) -> StoreResult<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT member_id FROM manages WHERE event_id = $1")
                .bind(event_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(member_id,)| member_id).collect())
    }

    async fn insert_manager(&self, member_id: &str, event_id: &str) -> StoreResult<bool> {
        let result = sqlx::query(
            "INSERT INTO manages (member_id, event_id) VALUES ($1, $2)
             ON CONFLICT (member_id, event_id) DO NOTHING",
        )
        .bind(member_id)
        .bind(event_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_reference_error(e, || {
                format!("member '{}' or event '{}' does not exist", member_id, event_id)
            })
        })?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl MemberStore for PgStore {
    async fn find_member(&self, member_id: &str) -> StoreResult<Option<Member>> {
        let query = format!("SELECT {MEMBER_COLUMNS} FROM members WHERE member_id = $1");
        let member = sqlx::query_as::<_, Member>(&query)
            .bind(member_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(member)
    }

    async fn list_members(&self) -> StoreResult<Vec<Member>> {
        let query = format!("SELECT {MEMBER_COLUMNS} FROM members ORDER BY member_id");
        let members = sqlx::query_as::<_, Member>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(members)
    }

    async fn insert_member(&self, member: &Member) -> StoreResult<()> {
        sqlx::query("INSERT INTO members (member_id, name, email) VALUES ($1, $2, $3)")
            .bind(&member.member_id)
            .bind(&member.name)
            .bind(&member.email)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_member(&self, member: &Member) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE members SET name = $1, email = $2, updated_at = now() WHERE member_id = $3",
        )
        .bind(&member.name)
        .bind(&member.email)
        .bind(&member.member_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_event_with_manager(&self, event: &Event, member_id: &str) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO events (event_id, event_type, date_time, location, host)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&event.event_id)
        .bind(&event.event_type)
        .bind(event.date_time)
        .bind(&event.location)
        .bind(&event.host)
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO manages (member_id, event_id) VALUES ($1, $2)")
            .bind(member_id)
            .bind(&event.event_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                map_reference_error(e, || format!("member '{}' does not exist", member_id))
            })?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_event(&self, event_id: &str) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM manages WHERE event_id = $1")
            .bind(event_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM events WHERE event_id = $1")
            .bind(event_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn revoke_manager(&self, member_id: &str, event_id: &str) -> StoreResult<Revocation> {
        let mut tx = self.pool.begin().await?;

        if !lock_event(&mut tx, event_id).await? {
            tx.commit().await?;
            return Ok(Revocation::default());
        }

        let result = sqlx::query("DELETE FROM manages WHERE member_id = $1 AND event_id = $2")
            .bind(member_id)
            .bind(event_id)
            .execute(&mut *tx)
            .await?;
        let event_deleted = delete_if_unmanaged(&mut tx, event_id).await?;

        tx.commit().await?;
        Ok(Revocation {
            revoked: result.rows_affected() > 0,
            event_deleted,
        })
    }

    async fn delete_member(&self, member_id: &str) -> StoreResult<Option<Vec<String>>> {
        let mut tx = self.pool.begin().await?;

        let managed: Vec<(String,)> = sqlx::query_as(
            "SELECT e.event_id FROM events e
             JOIN manages m ON m.event_id = e.event_id
             WHERE m.member_id = $1
             ORDER BY e.event_id
             FOR UPDATE OF e",
        )
        .bind(member_id)
        .fetch_all(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM manages WHERE member_id = $1")
            .bind(member_id)
            .execute(&mut *tx)
            .await?;

        let removed = sqlx::query("DELETE FROM members WHERE member_id = $1")
            .bind(member_id)
            .execute(&mut *tx)
            .await?;
        if removed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let mut deleted = Vec::new();
        for (event_id,) in managed {
            if delete_if_unmanaged(&mut tx, &event_id).await? {
                deleted.push(event_id);
            }
        }

        tx.commit().await?;
        Ok(Some(deleted))
    }
}
