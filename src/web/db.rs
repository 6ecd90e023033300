use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use sqlx::{Connection, SqliteConnection, migrate::Migrator, sqlite::SqliteConnectOptions};
use std::path::Path;

use crate::web::{AppError, AppState};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub fn connect_options(database: &Path) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(database)
        .create_if_missing(true)
}

/// A store connection owned by a single request.
///
/// The connection is opened while extracting, before the handler body runs,
/// and is closed when the value drops at the end of the request, whichever
/// way the handler exits.
pub struct DbConn(pub SqliteConnection);

#[async_trait]
impl FromRequestParts<AppState> for DbConn {
    type Rejection = AppError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let conn = SqliteConnection::connect_with(state.connect_options()).await?;
        Ok(Self(conn))
    }
}

#[cfg(test)]
pub(crate) async fn open_test_connection() -> (tempfile::TempDir, SqliteConnection) {
    let dir = tempfile::tempdir().unwrap();
    let options = connect_options(&dir.path().join("guestbook.db"));
    let mut conn = SqliteConnection::connect_with(&options).await.unwrap();
    MIGRATOR.run(&mut conn).await.unwrap();
    (dir, conn)
}
