use std::net::SocketAddr;
use axum::{Router, routing::get};
use tokio::signal;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, warn};
use uuid::Uuid;
use crate::state::AppState;
use crate::{auth, projects, words};

pub fn build_app(state: AppState) -> Router {
    let static_dir = ServeDir::new(&state.config.static_dir);

    Router::new()
        .merge(auth::router())
        .merge(projects::router())
        .merge(words::router())
        .route("/health", get(|| async { "ok" }))
        .nest_service("/static", static_dir)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    let request_id = Uuid::new_v4();
                    tracing::info_span!("http_request", %method, uri = %uri, %request_id, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
        .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => warn!("received Ctrl+C, shutting down"),
        _ = terminate => warn!("received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use tower::ServiceExt;
    use axum::extract::FromRef;
    use crate::session::SessionKeys;

    /// Minimal browser: remembers the session cookie between requests.
    struct Client {
        app: Router,
        cookie: Option<String>,
    }

    impl Client {
        async fn new() -> Self {
            let state = AppState::fake().await.unwrap();
            Self {
                app: build_app(state),
                cookie: None,
            }
        }

        async fn send(&mut self, req: axum::http::request::Builder, body: Body) -> Response {
            let req = match &self.cookie {
                Some(c) => req.header(header::COOKIE, c.as_str()),
                None => req,
            };
            let resp = self
                .app
                .clone()
                .oneshot(req.body(body).unwrap())
                .await
                .unwrap();
            if let Some(set) = resp.headers().get(header::SET_COOKIE) {
                let pair = set.to_str().unwrap().split(';').next().unwrap();
                self.cookie = Some(pair.to_string());
            }
            resp
        }

        async fn get(&mut self, uri: &str) -> Response {
            self.send(Request::builder().uri(uri), Body::empty()).await
        }

        async fn post_form(&mut self, uri: &str, form: &str) -> Response {
            self.send(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded"),
                Body::from(form.to_string()),
            )
            .await
        }

        async fn page(&mut self, uri: &str) -> String {
            let resp = self.get(uri).await;
            assert_eq!(resp.status(), StatusCode::OK, "GET {uri}");
            let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
            String::from_utf8(bytes.to_vec()).unwrap()
        }

        async fn register_and_login(&mut self, username: &str) {
            let form = format!("username={username}&email={username}%40example.com&password=secret");
            self.post_form("/register", &form).await;
            let resp = self
                .post_form("/login", &format!("username={username}&password=secret"))
                .await;
            assert_eq!(location(&resp), "/dashboard");
        }
    }

    fn location(resp: &Response) -> &str {
        resp.headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let mut client = Client::new().await;
        let resp = client.get("/health").await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn anonymous_user_is_sent_to_login() {
        let mut client = Client::new().await;

        let resp = client.get("/").await;
        assert_eq!(location(&resp), "/login");

        for uri in ["/dashboard", "/words", "/logout"] {
            let resp = client.get(uri).await;
            assert_eq!(resp.status(), StatusCode::SEE_OTHER, "GET {uri}");
            assert_eq!(location(&resp), "/login");
        }

        let page = client.page("/login").await;
        assert!(page.contains("Please log in to access this page."));
    }

    #[tokio::test]
    async fn register_login_and_dashboard() {
        let mut client = Client::new().await;

        let resp = client
            .post_form("/register", "username=alice&email=alice%40example.com&password=pw")
            .await;
        assert_eq!(location(&resp), "/login");
        assert!(client
            .page("/login")
            .await
            .contains("Registration successful! Please log in."));

        let resp = client.post_form("/login", "username=alice&password=pw").await;
        assert_eq!(location(&resp), "/dashboard");

        let page = client.page("/dashboard").await;
        assert!(page.contains("Welcome to your Dashboard, alice!"));
        assert!(page.contains("My First Project"));
        assert!(page.contains("Logged in successfully!"));
    }

    #[tokio::test]
    async fn registration_rejects_duplicates_and_blanks() {
        let mut client = Client::new().await;
        client
            .post_form("/register", "username=alice&email=alice%40example.com&password=pw")
            .await;

        let resp = client
            .post_form("/register", "username=alice&email=new%40example.com&password=pw")
            .await;
        assert_eq!(location(&resp), "/register");
        assert!(client
            .page("/register")
            .await
            .contains("User alice or email new@example.com is already registered."));

        client
            .post_form("/register", "username=bob&email=alice%40example.com&password=pw")
            .await;
        assert!(client.page("/register").await.contains("is already registered."));

        client.post_form("/register", "username=&email=&password=").await;
        assert!(client.page("/register").await.contains("Username is required."));
    }

    #[tokio::test]
    async fn login_reports_unknown_user_and_wrong_password() {
        let mut client = Client::new().await;
        client
            .post_form("/register", "username=alice&email=alice%40example.com&password=pw")
            .await;

        let resp = client.post_form("/login", "username=ghost&password=pw").await;
        assert_eq!(location(&resp), "/login");
        assert!(client.page("/login").await.contains("Incorrect username."));

        let resp = client.post_form("/login", "username=alice&password=nope").await;
        assert_eq!(location(&resp), "/login");
        assert!(client.page("/login").await.contains("Incorrect password."));

        assert_eq!(location(&client.get("/dashboard").await), "/login");
    }

    #[tokio::test]
    async fn words_require_a_selected_project() {
        let mut client = Client::new().await;
        client.register_and_login("alice").await;

        // Login alone does not select a project; the dashboard does.
        let resp = client.get("/words").await;
        assert_eq!(location(&resp), "/dashboard");
        assert!(client
            .page("/dashboard")
            .await
            .contains("Please select a project from the dashboard to manage words."));

        let page = client.page("/words").await;
        assert!(page.contains("Words in My First Project"));
    }

    #[tokio::test]
    async fn add_validate_and_list_words() {
        let mut client = Client::new().await;
        client.register_and_login("alice").await;
        client.page("/dashboard").await;

        let resp = client
            .post_form("/words", "new_language_word=&english_translation=Error+Test")
            .await;
        assert_eq!(location(&resp), "/words");
        assert!(client.page("/words").await.contains("New language word is required."));

        client
            .post_form("/words", "new_language_word=perro1&english_translation=dog")
            .await;
        assert!(client
            .page("/words")
            .await
            .contains("New language word may only contain letters and spaces."));

        client
            .post_form("/words", "new_language_word=buenos+dias&english_translation=good+morning")
            .await;
        let page = client.page("/words").await;
        assert!(page.contains("Word &quot;buenos dias&quot; added successfully!"));
        assert!(page.contains("<td>buenos dias</td><td>good morning</td>"));
    }

    #[tokio::test]
    async fn users_cannot_delete_each_others_words() {
        let mut alice = Client::new().await;
        alice.register_and_login("alice").await;
        alice.page("/dashboard").await;
        alice
            .post_form("/words", "new_language_word=perro&english_translation=dog")
            .await;
        alice.page("/words").await;

        // Both users share one database through the same router.
        let mut bob = Client {
            app: alice.app.clone(),
            cookie: None,
        };
        bob.register_and_login("bob").await;
        bob.page("/dashboard").await;

        // Alice's word is the first row of a fresh database.
        let word_id = 1;
        let resp = bob.post_form(&format!("/words/delete/{word_id}"), "").await;
        assert_eq!(location(&resp), "/words");
        assert!(bob
            .page("/words")
            .await
            .contains("You do not have permission to delete this word."));
        assert!(alice.page("/words").await.contains("<td>perro</td>"));

        alice.post_form(&format!("/words/delete/{word_id}"), "").await;
        let page = alice.page("/words").await;
        assert!(page.contains("Word deleted successfully!"));
        assert!(!page.contains("<td>perro</td>"));

        alice.post_form("/words/delete/999", "").await;
        assert!(alice
            .page("/words")
            .await
            .contains("You do not have permission to delete this word."));
    }

    #[tokio::test]
    async fn duplicate_message_echoes_submitted_email() {
        let mut client = Client::new().await;
        client
            .post_form("/register", "username=alice&email=alice%40example.com&password=pw")
            .await;

        client
            .post_form("/register", "username=bob&email=Alice%40Example.COM&password=pw")
            .await;
        assert!(client
            .page("/register")
            .await
            .contains("User bob or email Alice@Example.COM is already registered."));
    }

    #[tokio::test]
    async fn delete_with_non_numeric_id_is_not_found() {
        let mut client = Client::new().await;
        client.register_and_login("alice").await;

        let resp = client.post_form("/words/delete/abc", "").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn dashboard_keeps_current_project_when_listing_fails() {
        let state = AppState::fake().await.unwrap();
        let mut client = Client {
            app: build_app(state.clone()),
            cookie: None,
        };
        client.register_and_login("alice").await;
        client.page("/dashboard").await;

        sqlx::query("DROP TABLE words").execute(&state.db).await.unwrap();
        sqlx::query("DROP TABLE projects").execute(&state.db).await.unwrap();

        let page = client.page("/dashboard").await;
        assert!(page.contains("An unexpected error occurred. Please try again."));
        assert!(page.contains("My First Project"));

        let cookie = client.cookie.clone().unwrap();
        let token = cookie
            .strip_prefix(&format!("{}=", crate::session::services::COOKIE_NAME))
            .unwrap();
        let session = SessionKeys::from_ref(&state).verify(token).unwrap();
        assert!(session.current_project_id().is_some());
        assert_eq!(session.current_project_name(), Some("My First Project"));
    }

    #[tokio::test]
    async fn logout_clears_session() {
        let mut client = Client::new().await;
        client.register_and_login("alice").await;

        let resp = client.get("/logout").await;
        assert_eq!(location(&resp), "/login");
        assert!(client.page("/login").await.contains("You have been logged out."));
        assert_eq!(location(&client.get("/dashboard").await), "/login");
    }

    #[tokio::test]
    async fn tampered_cookie_is_anonymous() {
        let mut client = Client::new().await;
        client.register_and_login("alice").await;
        let cookie = client.cookie.clone().unwrap();
        client.cookie = Some(format!("{cookie}x"));

        assert_eq!(location(&client.get("/dashboard").await), "/login");
    }
}
