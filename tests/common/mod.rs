#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use deptsite::accounts::{AccountStore, MemoryAccountStore, PgAccountStore};
use deptsite::config::{Config, RegistrationMode};
use deptsite::email::Notifier;
use deptsite::state::{AppState, SharedState};

/// Captures outgoing mail instead of talking to an SMTP relay.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMail>>,
    pub fail: AtomicBool,
}

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail_from_now(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// Token from the most recent reset link.
    pub fn last_token(&self) -> String {
        let sent = self.sent();
        let mail = sent.last().expect("no email sent");
        let start = mail.body.find("/reset/").expect("no reset link") + "/reset/".len();
        mail.body[start..start + 40].to_string()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), String> {
        if self.fail.load(Ordering::SeqCst) {
            return Err("relay unavailable".to_string());
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// A running test server instance.
pub struct TestApp {
    pub addr: SocketAddr,
    pub state: SharedState,
    pub notifier: Arc<RecordingNotifier>,
    pub client: Client,
    pub upload_dir: PathBuf,
    pub db_name: Option<String>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn register(
        &self,
        name: &str,
        username: &str,
        password: &str,
    ) -> (Value, StatusCode, Option<String>) {
        let resp = self
            .client
            .post(self.url("/api/register"))
            .form(&[("name", name), ("username", username), ("password", password)])
            .send()
            .await
            .expect("register request failed");
        json_with_cookie(resp).await
    }

    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> (Value, StatusCode, Option<String>) {
        let resp = self
            .client
            .post(self.url("/api/login"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .expect("login request failed");
        json_with_cookie(resp).await
    }

    /// Register a user and return their session cookie value.
    pub async fn bootstrap(&self) -> String {
        let (body, status, cookie) = self
            .register("Alice", "alice@example.com", "password123")
            .await;
        assert_eq!(status, StatusCode::OK, "bootstrap register failed: {body}");
        cookie.expect("register set no session cookie")
    }

    pub async fn request_reset(&self, username: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/reset-password"))
            .form(&[("username", username)])
            .send()
            .await
            .expect("reset request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn get_text(&self, path: &str) -> (String, StatusCode) {
        let resp = self.client.get(self.url(path)).send().await.expect("get request failed");
        let status = resp.status();
        (resp.text().await.unwrap_or_default(), status)
    }

    /// Submit the reset form; returns (html, status, session cookie).
    pub async fn submit_new_password(
        &self,
        token: &str,
        password: &str,
    ) -> (String, StatusCode, Option<String>) {
        let resp = self
            .client
            .post(self.url(&format!("/reset/{token}")))
            .form(&[("password", password)])
            .send()
            .await
            .expect("reset submit failed");
        let status = resp.status();
        let cookie = session_cookie(&resp);
        (resp.text().await.unwrap_or_default(), status, cookie)
    }

    pub async fn get_json(&self, path: &str, session: Option<&str>) -> (Value, StatusCode) {
        let mut req = self.client.get(self.url(path));
        if let Some(session) = session {
            req = req.header("cookie", format!("session={session}"));
        }
        let resp = req.send().await.expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

pub fn session_cookie(resp: &Response) -> Option<String> {
    resp.headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.strip_prefix("session="))
        .map(|v| v.split(';').next().unwrap_or("").to_string())
        .find(|v| !v.is_empty())
}

async fn json_with_cookie(resp: Response) -> (Value, StatusCode, Option<String>) {
    let status = resp.status();
    let cookie = session_cookie(&resp);
    let body: Value = resp.json().await.unwrap_or(json!(null));
    (body, status, cookie)
}

pub fn test_config(database_url: &str, upload_dir: PathBuf) -> Config {
    Config {
        database_url: database_url.to_string(),
        session_secret: "test-session-secret-that-is-long-enough".to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        base_url: "http://localhost:5000".to_string(),
        site_name: "Test Department".to_string(),
        registration: RegistrationMode::Open,
        max_body_size: 10 * 1024 * 1024,
        upload_dir,
        reset_token_ttl: Duration::from_secs(600),
        mail_timeout: Duration::from_secs(2),
        log_level: "warn".to_string(),
        smtp: None,
    }
}

fn temp_upload_dir() -> PathBuf {
    std::env::temp_dir().join(format!("deptsite-test-{}", Uuid::now_v7()))
}

async fn serve(
    pool: PgPool,
    config: Config,
    accounts: Arc<dyn AccountStore>,
    db_name: Option<String>,
) -> TestApp {
    let notifier = Arc::new(RecordingNotifier::default());
    let upload_dir = config.upload_dir.clone();
    let state: SharedState = Arc::new(AppState::new(pool, config, accounts, notifier.clone()));
    let app = deptsite::router(state.clone());

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        state,
        notifier,
        client,
        upload_dir,
        db_name,
    }
}

/// Spawn a test app whose accounts live in memory. The Postgres pool is lazy and never
/// connects, so only account and reset routes succeed; content queries fail fast.
pub async fn spawn_app() -> TestApp {
    let url = "postgres://deptsite@127.0.0.1:1/unused";
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(2))
        .connect_lazy(url)
        .expect("lazy pool should accept a well-formed URL");

    serve(
        pool,
        test_config(url, temp_upload_dir()),
        Arc::new(MemoryAccountStore::new()),
        None,
    )
    .await
}

/// Spawn a test app backed by a fresh temporary Postgres database.
pub async fn spawn_db_app() -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let db_name = format!("deptsite_test_{}", Uuid::now_v7().to_string().replace('-', ""));

    // Connect to default postgres DB to create test DB
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let accounts = Arc::new(PgAccountStore::new(pool.clone()));
    serve(
        pool,
        test_config(&test_url, temp_upload_dir()),
        accounts,
        Some(db_name),
    )
    .await
}

/// Drop the test database and upload directory.
pub async fn cleanup(app: TestApp) {
    let _ = tokio::fs::remove_dir_all(&app.upload_dir).await;

    let Some(db_name) = app.db_name.clone() else {
        return;
    };
    app.state.pool.close().await;

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
