use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer, Config};
use crate::handlers::{admin, checkin, health_check, registration};
use crate::state::AppState;

/// Builds the router for every flow present in `state`.
pub fn create_routes(state: AppState, config: &Config) -> Router {
    let mut router = Router::new().route("/health", get(health_check));

    if let Some(flow) = state.registration {
        router = router.nest(
            "/api/registration",
            Router::new()
                .route("/", get(registration::options).post(registration::register))
                .route("/payment", get(registration::payment))
                .with_state(flow),
        );
    }

    if let Some(console) = state.admin {
        router = router.nest(
            "/api/admin",
            Router::new()
                .route("/lots", get(admin::list_lots).post(admin::add_lot))
                .route("/lots/:index", put(admin::edit_lot).delete(admin::delete_lot))
                .route("/participants", get(admin::list_participants))
                .route(
                    "/participants/:id",
                    put(admin::edit_participant).delete(admin::delete_participant),
                )
                .route("/participants/:id/check-in", post(admin::check_in))
                .route("/reload", post(admin::reload))
                .with_state(console),
        );
    }

    if let Some(kiosk) = state.checkin {
        router = router.nest(
            "/api/checkin",
            Router::new()
                .route("/", get(checkin::open))
                .route("/search", get(checkin::search))
                .route("/reload", post(checkin::reload))
                .route("/:id", post(checkin::check_in))
                .with_state(kiosk),
        );
    }

    router
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(create_security_headers_layer(config.production))
        .layer(create_cors_layer())
}
