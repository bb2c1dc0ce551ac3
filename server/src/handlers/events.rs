use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::auth::AuthMember;
use crate::models::{EventInput, GrantRequest};
use crate::services::{Access, GrantOutcome};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::response::{denied, success};

const NOT_AUTHORIZED: &str = "Not authorized for this event";

#[derive(Serialize)]
struct GrantPayload {
    event_id: String,
    member_id: String,
    already_manager: bool,
}

#[derive(Serialize)]
struct RevokePayload {
    event_id: String,
    revoked: bool,
    event_deleted: bool,
}

fn event_not_found(event_id: &str) -> AppError {
    AppError::NotFound(format!("Event with id '{}' was not found", event_id))
}

pub async fn list_progressing(
    State(state): State<AppState>,
    member: AuthMember,
) -> AppResult<Response> {
    let events = state.events.list_progressing(&member.member_id).await?;
    Ok(success(events, "Progressing events"))
}

pub async fn list_done(State(state): State<AppState>, member: AuthMember) -> AppResult<Response> {
    let events = state.events.list_done(&member.member_id).await?;
    Ok(success(events, "Done events"))
}

pub async fn get_event(
    State(state): State<AppState>,
    member: AuthMember,
    Path(event_id): Path<String>,
) -> AppResult<Response> {
    match state.events.get_event(&member.member_id, &event_id).await? {
        Access::Granted(Some(event)) => Ok(success(event, "Event found")),
        Access::Granted(None) => Err(event_not_found(&event_id)),
        Access::Denied => Ok(denied(NOT_AUTHORIZED)),
    }
}

pub async fn create_event(
    State(state): State<AppState>,
    member: AuthMember,
    Json(input): Json<EventInput>,
) -> AppResult<Response> {
    let event = state.events.create_event(&member.member_id, input).await?;
    Ok(success(event, "Event created"))
}

pub async fn grant_authority(
    State(state): State<AppState>,
    member: AuthMember,
    Path(event_id): Path<String>,
    Json(request): Json<GrantRequest>,
) -> AppResult<Response> {
    match state
        .events
        .grant_authority(&member.member_id, &event_id, &request.uid)
        .await?
    {
        Access::Granted(GrantOutcome::UnknownMember) => Err(AppError::NotFound(format!(
            "Member with id '{}' was not found",
            request.uid
        ))),
        Access::Granted(outcome) => Ok(success(
            GrantPayload {
                event_id,
                member_id: request.uid,
                already_manager: outcome == GrantOutcome::AlreadyManager,
            },
            "Authority granted",
        )),
        Access::Denied => Ok(denied("Authority grant failed: not authorized for this event")),
    }
}

pub async fn update_event(
    State(state): State<AppState>,
    member: AuthMember,
    Path(event_id): Path<String>,
    Json(input): Json<EventInput>,
) -> AppResult<Response> {
    match state
        .events
        .update_event(&member.member_id, &event_id, input)
        .await?
    {
        Access::Granted(Some(event)) => Ok(success(event.event_id, "Event updated")),
        Access::Granted(None) => Err(event_not_found(&event_id)),
        Access::Denied => Ok(denied(NOT_AUTHORIZED)),
    }
}

pub async fn delete_event(
    State(state): State<AppState>,
    member: AuthMember,
    Path(event_id): Path<String>,
) -> AppResult<Response> {
    match state.events.delete_event(&member.member_id, &event_id).await? {
        Access::Granted(_) => Ok(success(event_id, "Event deleted")),
        Access::Denied => Ok(denied(NOT_AUTHORIZED)),
    }
}

pub async fn revoke_authority(
    State(state): State<AppState>,
    member: AuthMember,
    Path(event_id): Path<String>,
) -> AppResult<Response> {
    let outcome = state
        .events
        .revoke_own_authority(&member.member_id, &event_id)
        .await?;
    let message = if outcome.event_deleted {
        "Authority revoked; event deleted as it has no managers left"
    } else {
        "Authority revoked"
    };
    Ok(success(
        RevokePayload {
            event_id,
            revoked: outcome.revoked,
            event_deleted: outcome.event_deleted,
        },
        message,
    ))
}
