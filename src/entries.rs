use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};

#[derive(Clone, Debug, FromRow)]
pub struct Entry {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub time: DateTime<Utc>,
    pub submitter: String,
}

pub struct NewEntry<'a> {
    pub title: &'a str,
    pub text: &'a str,
    pub submitter: &'a str,
}

/// Newest first; entries posted within the same clock tick fall back to id order.
pub async fn list_entries(conn: &mut SqliteConnection) -> sqlx::Result<Vec<Entry>> {
    sqlx::query_as::<_, Entry>(
        "SELECT id, title, text, time, submitter FROM entries ORDER BY time DESC, id DESC",
    )
    .fetch_all(conn)
    .await
}

pub async fn insert_entry(conn: &mut SqliteConnection, entry: &NewEntry<'_>) -> sqlx::Result<i64> {
    let result =
        sqlx::query("INSERT INTO entries (title, text, time, submitter) VALUES (?, ?, ?, ?)")
            .bind(entry.title)
            .bind(entry.text)
            .bind(Utc::now())
            .bind(entry.submitter)
            .execute(conn)
            .await?;

    Ok(result.last_insert_rowid())
}
