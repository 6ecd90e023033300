pub mod auth;
pub mod db;
pub mod feed;
pub mod responses;
pub mod router;
pub mod session;
pub mod state;
pub mod templates;

pub use responses::{AppError, Found};
pub use state::AppState;
