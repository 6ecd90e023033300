use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::web::{AppState, auth, feed};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(feed::show_entries))
        .route("/add", post(feed::add_entry))
        .route("/login", get(auth::login_page).post(auth::process_login))
        .route("/logout", get(auth::logout))
        .route(
            "/register",
            get(auth::register_page).post(auth::process_register),
        )
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}
