use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, SecurityHeaders};
use crate::handlers::{events, health_check, members};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let event_routes = Router::new()
        .route("/", post(events::create_event))
        .route("/progressing", get(events::list_progressing))
        .route("/done", get(events::list_done))
        .route(
            "/auth/:event_id",
            post(events::grant_authority).delete(events::revoke_authority),
        )
        .route(
            "/:event_id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        );

    let member_routes = Router::new()
        .route("/", get(members::list_members))
        .route("/kakao", get(members::kakao_login))
        .route(
            "/me",
            get(members::get_me)
                .put(members::update_me)
                .delete(members::delete_me),
        )
        .route("/:member_id", get(members::get_member));

    let security = SecurityHeaders::new(state.config.production);
    let cors = create_cors_layer(&state.config.cors_allowed_origins);

    let router = Router::new()
        .route("/health", get(health_check))
        .nest("/api/events", event_routes)
        .nest("/api/members", member_routes)
        .with_state(state);

    security
        .apply(router)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
