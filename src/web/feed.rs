use axum::{extract::Form, response::Html};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Deserialize;
use tracing::info;

use crate::{
    entries::{self, NewEntry},
    web::{
        AppError, Found,
        db::DbConn,
        session::{AuthenticatedUser, Notices, Session},
        templates::render_feed_page,
    },
};

pub const ENTRY_POSTED: &str = "New entry was successfully posted.";

#[derive(Deserialize)]
pub struct EntryForm {
    pub title: String,
    pub text: String,
}

pub async fn show_entries(
    DbConn(mut conn): DbConn,
    jar: SignedCookieJar,
) -> Result<(SignedCookieJar, Html<String>), AppError> {
    let entries = entries::list_entries(&mut conn).await?;

    let session = Session::from_jar(&jar);
    let (jar, notices) = Notices::take(jar);
    Ok((jar, Html(render_feed_page(&session, &notices, &entries))))
}

pub async fn add_entry(
    AuthenticatedUser(submitter): AuthenticatedUser,
    DbConn(mut conn): DbConn,
    jar: SignedCookieJar,
    Form(form): Form<EntryForm>,
) -> Result<(SignedCookieJar, Found), AppError> {
    let id = entries::insert_entry(
        &mut conn,
        &NewEntry {
            title: &form.title,
            text: &form.text,
            submitter: &submitter,
        },
    )
    .await?;
    info!(id, %submitter, "entry posted");

    let jar = Notices::push(jar, ENTRY_POSTED);
    Ok((jar, Found("/")))
}
