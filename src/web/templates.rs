use chrono::{Datelike, Utc};

use crate::{entries::Entry, web::session::Session};

const BASE_STYLES: &str = r#"
        :root { color-scheme: light; }
        body { font-family: "Helvetica Neue", Arial, sans-serif; margin: 0; background: #f8fafc; color: #0f172a; }
        header { background: #ffffff; padding: 1.5rem; border-bottom: 1px solid #e2e8f0; display: flex; justify-content: space-between; align-items: center; flex-wrap: wrap; gap: 1rem; }
        header h1 { margin: 0; font-size: 1.6rem; }
        header h1 a { color: inherit; text-decoration: none; }
        nav { display: flex; gap: 0.75rem; align-items: center; }
        nav a { color: #1d4ed8; text-decoration: none; font-weight: 600; background: #e0f2fe; padding: 0.45rem 0.9rem; border-radius: 999px; border: 1px solid #bfdbfe; }
        nav a:hover { background: #bfdbfe; }
        nav span { color: #475569; font-size: 0.95rem; }
        main { padding: 2rem 1.5rem; max-width: 760px; margin: 0 auto; box-sizing: border-box; }
        .flash { padding: 0.85rem 1.1rem; border-radius: 10px; margin-bottom: 0.75rem; font-weight: 600; background: #ecfdf3; border: 1px solid #bbf7d0; color: #166534; }
        .error { padding: 0.85rem 1.1rem; border-radius: 10px; margin-bottom: 1rem; font-weight: 600; background: #fef2f2; border: 1px solid #fecaca; color: #b91c1c; }
        .panel { background: #ffffff; border-radius: 12px; border: 1px solid #e2e8f0; padding: 1.5rem; margin-bottom: 1.5rem; box-shadow: 0 18px 40px rgba(15, 23, 42, 0.08); }
        label { display: block; margin-top: 1rem; font-weight: 600; }
        input, textarea { width: 100%; padding: 0.75rem; margin-top: 0.5rem; border-radius: 8px; border: 1px solid #cbd5f5; background: #f8fafc; color: #0f172a; font-size: 1rem; box-sizing: border-box; }
        textarea { min-height: 6rem; resize: vertical; }
        button { margin-top: 1.25rem; padding: 0.8rem 1.2rem; border: none; border-radius: 8px; background: #2563eb; color: #ffffff; font-weight: 600; cursor: pointer; }
        button:hover { background: #1d4ed8; }
        ul.entries { list-style: none; padding: 0; margin: 0; }
        ul.entries li { background: #ffffff; border: 1px solid #e2e8f0; border-radius: 12px; padding: 1.25rem; margin-bottom: 1rem; }
        ul.entries h2 { margin: 0 0 0.5rem; font-size: 1.15rem; }
        ul.entries .meta { color: #64748b; font-size: 0.85rem; margin-bottom: 0.5rem; }
        ul.entries .body { white-space: pre-wrap; line-height: 1.6; }
        .empty { color: #64748b; font-style: italic; }
        .app-footer { margin-top: 3rem; text-align: center; font-size: 0.85rem; color: #94a3b8; }
"#;

struct Page<'a> {
    title: &'a str,
    session: &'a Session,
    notices: &'a [String],
    body_html: String,
}

fn render_page(page: Page<'_>) -> String {
    let Page {
        title,
        session,
        notices,
        body_html,
    } = page;

    let nav = match session.authenticated_user() {
        Some(username) => format!(
            r#"<span>Logged in as <strong>{username}</strong></span><a href="/logout">log out</a>"#,
            username = escape_html(username),
        ),
        None => r#"<a href="/login">log in</a><a href="/register">register</a>"#.to_string(),
    };

    let flashes = notices
        .iter()
        .map(|notice| format!(r#"<div class="flash">{}</div>"#, escape_html(notice)))
        .collect::<String>();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title} | Guestbook</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>
{styles}
    </style>
</head>
<body>
    <header>
        <h1><a href="/">Guestbook</a></h1>
        <nav>{nav}</nav>
    </header>
    <main>
        {flashes}
        {body_html}
        {footer}
    </main>
</body>
</html>"#,
        title = escape_html(title),
        styles = BASE_STYLES,
        nav = nav,
        flashes = flashes,
        body_html = body_html,
        footer = render_footer(),
    )
}

pub fn render_feed_page(session: &Session, notices: &[String], entries: &[Entry]) -> String {
    let add_form = if session.logged_in {
        r#"<section class="panel">
            <form method="post" action="/add">
                <label for="title">Title</label>
                <input id="title" name="title" required>
                <label for="text">Text</label>
                <textarea id="text" name="text" required></textarea>
                <button type="submit">Share</button>
            </form>
        </section>"#
    } else {
        ""
    };

    let items = if entries.is_empty() {
        r#"<li class="empty">Unbelievable. No entries here so far.</li>"#.to_string()
    } else {
        entries
            .iter()
            .map(|entry| {
                format!(
                    r#"<li id="entry-{id}"><h2>{title}</h2><div class="meta">by {submitter} at {time}</div><div class="body">{text}</div></li>"#,
                    id = entry.id,
                    title = escape_html(&entry.title),
                    submitter = escape_html(&entry.submitter),
                    time = entry.time.format("%Y-%m-%d %H:%M:%S UTC"),
                    text = escape_html(&entry.text),
                )
            })
            .collect::<String>()
    };

    render_page(Page {
        title: "Entries",
        session,
        notices,
        body_html: format!(r#"{add_form}<ul class="entries">{items}</ul>"#),
    })
}

pub fn render_login_page(session: &Session, notices: &[String], error: Option<&str>) -> String {
    let error_html = error
        .map(|message| {
            format!(
                r#"<p class="error"><strong>Error:</strong> {}</p>"#,
                escape_html(message)
            )
        })
        .unwrap_or_default();

    render_page(Page {
        title: "Login",
        session,
        notices,
        body_html: format!(
            r#"<section class="panel">
            <h2>Login</h2>
            {error_html}
            <form method="post" action="/login">
                <label for="username">Username</label>
                <input id="username" name="username" required>
                <label for="password">Password</label>
                <input id="password" type="password" name="password" required>
                <button type="submit">Login</button>
            </form>
        </section>"#
        ),
    })
}

pub fn render_register_page(session: &Session, notices: &[String]) -> String {
    render_page(Page {
        title: "Register",
        session,
        notices,
        body_html: r#"<section class="panel">
            <h2>Register</h2>
            <form method="post" action="/register">
                <label for="username">Username</label>
                <input id="username" name="username" required>
                <label for="password">Password</label>
                <input id="password" type="password" name="password" required>
                <label for="confirm_password">Confirm password</label>
                <input id="confirm_password" type="password" name="confirm_password" required>
                <button type="submit">Register</button>
            </form>
        </section>"#
            .to_string(),
    })
}

pub fn render_footer() -> String {
    let current_year = Utc::now().year();
    format!(r#"<footer class="app-footer">© {current_year} Guestbook</footer>"#)
}

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
