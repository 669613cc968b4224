//! Server-rendered pages. Every dynamic value goes through [`escape`].

use std::fmt::Write;

use axum::response::Html;

use crate::projects::repo_types::Project;
use crate::session::Flash;
use crate::words::repo_types::Word;

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, username: Option<&str>, flashes: &[Flash], content: &str) -> Html<String> {
    let nav = match username {
        Some(name) => format!(
            r#"<span>Logged in as {}</span> <a href="/dashboard">Dashboard</a> <a href="/words">Words</a> <a href="/logout">Log Out</a>"#,
            escape(name)
        ),
        None => r#"<a href="/login">Log In</a> <a href="/register">Register</a>"#.to_string(),
    };

    let mut messages = String::new();
    for flash in flashes {
        let _ = write!(
            messages,
            r#"<div class="flash flash-{}">{}</div>"#,
            flash.kind.as_str(),
            escape(&flash.message)
        );
    }

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} - Vocabulary List</title>
<link rel="stylesheet" href="/static/css/style.css">
</head>
<body>
<nav>{nav}</nav>
<main>
{messages}
{content}
</main>
</body>
</html>"#,
        title = escape(title),
    ))
}

pub fn register_page(flashes: &[Flash]) -> Html<String> {
    layout(
        "Register",
        None,
        flashes,
        r#"<h2>Register</h2>
<form method="post" action="/register">
<label>Username <input type="text" name="username" maxlength="50" required></label>
<label>Email <input type="email" name="email" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Register</button>
</form>
<p>Already have an account? <a href="/login">Log In</a></p>"#,
    )
}

pub fn login_page(flashes: &[Flash]) -> Html<String> {
    layout(
        "Log In",
        None,
        flashes,
        r#"<h2>Log In</h2>
<form method="post" action="/login">
<label>Username <input type="text" name="username" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Log In</button>
</form>
<p>New here? <a href="/register">Register</a></p>"#,
    )
}

pub fn dashboard_page(
    username: &str,
    projects: &[Project],
    current_project_name: &str,
    flashes: &[Flash],
) -> Html<String> {
    let mut content = format!(
        "<h2>Welcome to your Dashboard, {}!</h2>\n<p>Current project: <strong>{}</strong></p>\n",
        escape(username),
        escape(current_project_name)
    );

    if projects.is_empty() {
        content.push_str("<p>You have no projects yet.</p>");
    } else {
        content.push_str("<h3>Your Projects</h3>\n<ul>");
        for project in projects {
            let _ = write!(content, "<li>{}</li>", escape(&project.name));
        }
        content.push_str("</ul>\n<p><a href=\"/words\">Manage words</a></p>");
    }

    layout("Dashboard", Some(username), flashes, &content)
}

pub fn words_page(
    username: &str,
    project_name: &str,
    words: &[Word],
    flashes: &[Flash],
) -> Html<String> {
    let mut content = format!(
        r#"<h2>Words in {}</h2>
<form method="post" action="/words">
<label>New Language Word <input type="text" name="new_language_word" maxlength="100"></label>
<label>English Translation <input type="text" name="english_translation" maxlength="100"></label>
<button type="submit">Add Word</button>
</form>
"#,
        escape(project_name)
    );

    if words.is_empty() {
        content.push_str("<p>No words yet. Add your first one above.</p>");
    } else {
        content.push_str(
            "<table>\n<thead><tr><th>New Language Word</th><th>English Translation</th><th></th></tr></thead>\n<tbody>",
        );
        for word in words {
            let _ = write!(
                content,
                r#"<tr><td>{}</td><td>{}</td><td><form method="post" action="/words/delete/{}"><button type="submit">Delete</button></form></td></tr>"#,
                escape(&word.new_language_word),
                escape(&word.english_translation),
                word.id
            );
        }
        content.push_str("</tbody>\n</table>");
    }

    layout("Words", Some(username), flashes, &content)
}
