use axum::{
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::accounts::AccountsError;

/// Failures that end a request without rendering a page.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not logged in")]
    Unauthorized,

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error(transparent)]
    Accounts(#[from] AccountsError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Html("<h1>Unauthorized</h1><p>You must be logged in to do that.</p>"),
            )
                .into_response(),
            err => {
                error!(?err, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html("<h1>Internal Server Error</h1><p>Please try again later.</p>"),
                )
                    .into_response()
            }
        }
    }
}

/// `302 Found` redirect, the status browsers follow with a plain GET after a form post.
pub struct Found(pub &'static str);

impl IntoResponse for Found {
    fn into_response(self) -> Response {
        (StatusCode::FOUND, [(header::LOCATION, self.0)]).into_response()
    }
}
