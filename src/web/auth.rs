use std::sync::LazyLock;

use axum::{
    extract::{Form, State},
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::SignedCookieJar;
use regex::Regex;
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    accounts::{self, AccountsError, LoginVerdict},
    web::{
        AppError, AppState, Found,
        db::DbConn,
        session::{Notices, Session},
        templates::{render_login_page, render_register_page},
    },
};

pub const LOGIN_SUCCESSFUL: &str = "Login successful!";
pub const LOGGED_OUT: &str = "You were logged out.";
pub const REGISTRATION_SUCCESSFUL: &str = "Registration successful!";
pub const USERNAME_INVALID: &str = "Username must be alphanumeric and at least 2 characters";
pub const PASSWORD_LENGTH_INVALID: &str = "Password must be 4 to 32 characters long";
pub const PASSWORDS_DIFFER: &str = "Passwords do not match";
pub const USERNAME_TAKEN: &str = "That username already exists.";

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w{2,}$").expect("valid username regex"));
static PASSWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.{4,32}$").expect("valid password regex"));

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

pub async fn login_page(jar: SignedCookieJar) -> (SignedCookieJar, Html<String>) {
    let session = Session::from_jar(&jar);
    let (jar, notices) = Notices::take(jar);
    (jar, Html(render_login_page(&session, &notices, None)))
}

pub async fn process_login(
    State(state): State<AppState>,
    DbConn(mut conn): DbConn,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let verdict = accounts::verify_login(&mut conn, &form.username, &form.password).await?;

    match verdict {
        LoginVerdict::Accepted => {
            let mut session = Session::from_jar(&jar);
            session.log_in(form.username.as_str());
            info!(username = %form.username, "login succeeded");

            let jar = session.store(jar, state.session_ttl_days());
            let jar = Notices::push(jar, LOGIN_SUCCESSFUL);
            Ok((jar, Found("/")).into_response())
        }
        LoginVerdict::Rejected { message } => {
            warn!(username = %form.username, reason = message, "login rejected");
            let session = Session::from_jar(&jar);
            let (jar, notices) = Notices::take(jar);
            let page = render_login_page(&session, &notices, Some(message));
            Ok((jar, Html(page)).into_response())
        }
    }
}

/// Plain GET; leaves `username` in the session and only drops the flag.
pub async fn logout(State(state): State<AppState>, jar: SignedCookieJar) -> (SignedCookieJar, Found) {
    let mut session = Session::from_jar(&jar);
    session.log_out();

    let jar = session.store(jar, state.session_ttl_days());
    let jar = Notices::push(jar, LOGGED_OUT);
    (jar, Found("/"))
}

pub async fn register_page(jar: SignedCookieJar) -> (SignedCookieJar, Html<String>) {
    let session = Session::from_jar(&jar);
    let (jar, notices) = Notices::take(jar);
    (jar, Html(render_register_page(&session, &notices)))
}

pub async fn process_register(
    DbConn(mut conn): DbConn,
    jar: SignedCookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let problems = validate_registration(&form);
    if !problems.is_empty() {
        return Ok(redisplay_register(jar, &problems));
    }

    match accounts::add_account(&mut conn, &form.username, &form.password).await {
        Ok(()) => {
            info!(username = %form.username, "account registered");
            let jar = Notices::push(jar, REGISTRATION_SUCCESSFUL);
            Ok((jar, Found("/")).into_response())
        }
        Err(AccountsError::DuplicateUsername) => {
            info!(username = %form.username, "registration rejected, username taken");
            Ok(redisplay_register(jar, &[USERNAME_TAKEN]))
        }
        Err(err) => Err(err.into()),
    }
}

/// One message per violated rule, in a fixed order.
pub fn validate_registration(form: &RegisterForm) -> Vec<&'static str> {
    let mut problems = Vec::new();
    if !USERNAME_RE.is_match(&form.username) {
        problems.push(USERNAME_INVALID);
    }
    if !PASSWORD_RE.is_match(&form.password) {
        problems.push(PASSWORD_LENGTH_INVALID);
    }
    if form.password != form.confirm_password {
        problems.push(PASSWORDS_DIFFER);
    }
    problems
}

fn redisplay_register(jar: SignedCookieJar, problems: &[&str]) -> Response {
    let session = Session::from_jar(&jar);
    let (jar, mut notices) = Notices::take(jar);
    notices.extend(problems.iter().map(|problem| problem.to_string()));
    (jar, Html(render_register_page(&session, &notices))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(username: &str, password: &str, confirm: &str) -> RegisterForm {
        RegisterForm {
            username: username.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[test]
    fn valid_registration_has_no_problems() {
        assert!(validate_registration(&form("ab", "pass", "pass")).is_empty());
        assert!(validate_registration(&form("user_01", &"x".repeat(32), &"x".repeat(32))).is_empty());
    }

    #[test]
    fn short_username_is_reported() {
        assert_eq!(
            validate_registration(&form("a", "pass", "pass")),
            [USERNAME_INVALID]
        );
    }

    #[test]
    fn non_word_username_is_reported() {
        assert_eq!(
            validate_registration(&form("a b", "pass", "pass")),
            [USERNAME_INVALID]
        );
        assert_eq!(
            validate_registration(&form("ab!", "pass", "pass")),
            [USERNAME_INVALID]
        );
    }

    #[test]
    fn password_bounds_are_inclusive() {
        assert_eq!(
            validate_registration(&form("ab", "abc", "abc")),
            [PASSWORD_LENGTH_INVALID]
        );
        let long = "x".repeat(33);
        assert_eq!(
            validate_registration(&form("ab", &long, &long)),
            [PASSWORD_LENGTH_INVALID]
        );
        assert!(validate_registration(&form("ab", "abcd", "abcd")).is_empty());
    }

    #[test]
    fn every_violation_is_collected_in_order() {
        assert_eq!(
            validate_registration(&form("a", "abc", "abd")),
            [USERNAME_INVALID, PASSWORD_LENGTH_INVALID, PASSWORDS_DIFFER]
        );
    }
}
