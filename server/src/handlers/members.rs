use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::AuthMember;
use crate::models::MemberUpdate;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::response::success;

#[derive(Deserialize)]
pub struct LoginQuery {
    pub code: String,
}

#[derive(Serialize)]
struct DeletedMemberPayload {
    member_id: String,
    deleted_events: Vec<String>,
}

fn member_not_found(member_id: &str) -> AppError {
    AppError::NotFound(format!("Member with id '{}' was not found", member_id))
}

/// Provider redirect target: `GET /api/members/kakao?code=...`.
pub async fn kakao_login(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> AppResult<Response> {
    if query.code.trim().is_empty() {
        return Err(AppError::ValidationError("code must not be empty".into()));
    }
    let session = state.members.login(&query.code).await?;
    Ok(success(session, "Login successful"))
}

pub async fn list_members(State(state): State<AppState>, _member: AuthMember) -> AppResult<Response> {
    let members = state.members.list_members().await?;
    Ok(success(members, "Members"))
}

pub async fn get_me(State(state): State<AppState>, member: AuthMember) -> AppResult<Response> {
    let found = state
        .members
        .get_member(&member.member_id)
        .await?
        .ok_or_else(|| member_not_found(&member.member_id))?;
    Ok(success(found, "Member found"))
}

pub async fn get_member(
    State(state): State<AppState>,
    _member: AuthMember,
    Path(member_id): Path<String>,
) -> AppResult<Response> {
    let found = state
        .members
        .get_member(&member_id)
        .await?
        .ok_or_else(|| member_not_found(&member_id))?;
    Ok(success(found, "Member found"))
}

pub async fn update_me(
    State(state): State<AppState>,
    member: AuthMember,
    Json(update): Json<MemberUpdate>,
) -> AppResult<Response> {
    if update.name.trim().is_empty() {
        return Err(AppError::ValidationError("name must not be empty".into()));
    }
    let updated = state
        .members
        .update_member(&member.member_id, update)
        .await?
        .ok_or_else(|| member_not_found(&member.member_id))?;
    Ok(success(updated, "Member updated"))
}

pub async fn delete_me(State(state): State<AppState>, member: AuthMember) -> AppResult<Response> {
    let deleted_events = state
        .members
        .delete_member(&member.member_id)
        .await?
        .ok_or_else(|| member_not_found(&member.member_id))?;
    Ok(success(
        DeletedMemberPayload {
            member_id: member.member_id,
            deleted_events,
        },
        "Member deleted",
    ))
}
