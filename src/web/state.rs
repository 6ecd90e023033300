use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sqlx::{Connection, SqliteConnection, sqlite::SqliteConnectOptions};
use tracing::info;

use crate::{
    config::AppConfig,
    web::db::{MIGRATOR, connect_options},
};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<StateInner>,
}

struct StateInner {
    connect_options: SqliteConnectOptions,
    cookie_key: Key,
    session_ttl_days: i64,
}

impl AppState {
    /// Prepares the store (creating the file and applying migrations) and
    /// derives the cookie signing key. No connection is kept open afterwards.
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let options = connect_options(&config.database);

        let mut conn = SqliteConnection::connect_with(&options)
            .await
            .with_context(|| format!("failed to open {}", config.database.display()))?;
        MIGRATOR
            .run(&mut conn)
            .await
            .context("failed to run database migrations")?;
        conn.close()
            .await
            .context("failed to close migration connection")?;
        info!(database = %config.database.display(), "database schema ready");

        Ok(Self {
            inner: Arc::new(StateInner {
                connect_options: options,
                cookie_key: Key::derive_from(config.secret_key.as_bytes()),
                session_ttl_days: config.session_ttl_days,
            }),
        })
    }

    pub fn connect_options(&self) -> &SqliteConnectOptions {
        &self.inner.connect_options
    }

    pub fn session_ttl_days(&self) -> i64 {
        self.inner.session_ttl_days
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.inner.cookie_key.clone()
    }
}
