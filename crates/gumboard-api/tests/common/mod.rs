#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::Utc;
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::Value;
use tower::ServiceExt;

use gumboard_api::notify::{MemoryDebounceStore, Messenger, Notifier};
use gumboard_api::{AppStateInner, router};
use gumboard_db::Database;
use gumboard_db::queries::{boards, users};
use gumboard_types::api::SessionClaims;
use gumboard_types::models::{Board, MemberRole};

pub const SECRET: &str = "integration-test-secret";
pub const CHANNEL: &str = "C-TEAM";

/// Captures every message instead of posting it.
#[derive(Default)]
pub struct RecordingMessenger {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMessenger {
    pub fn messages(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_message(&self, channel: &str, text: &str) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push((channel.into(), text.into()));
        Ok(())
    }
}

/// Seeded organization:
/// - `alice`, `bob`: members of `org`
/// - `admin`: ADMIN of `org`
/// - `mallory`: member of `other-org`
/// - `drifter`: user without an organization
/// - board `b1` (by alice, Slack updates on), board `b-other` in `other-org`
pub struct TestApp {
    pub app: Router,
    pub messenger: Arc<RecordingMessenger>,
}

impl TestApp {
    pub fn new() -> Self {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();
        db.with_conn(|conn| {
            users::create_organization(conn, "org", "Acme", Some(CHANNEL))?;
            users::create_organization(conn, "other-org", "Globex", None)?;
            for (id, name, org, role) in [
                ("alice", "Alice", "org", MemberRole::Member),
                ("bob", "Bob", "org", MemberRole::Member),
                ("admin", "Ada Admin", "org", MemberRole::Admin),
                ("mallory", "Mallory", "other-org", MemberRole::Member),
            ] {
                users::create_user(conn, id, name, &format!("{}@example.test", id), Some(org), false)?;
                users::add_membership(conn, org, id, role)?;
            }
            users::create_user(conn, "drifter", "Drifter", "drifter@example.test", None, false)?;

            for (id, org, author) in [("b1", "org", "alice"), ("b-other", "other-org", "mallory")] {
                boards::insert_board(
                    conn,
                    &Board {
                        id: id.into(),
                        name: format!("Board {}", id),
                        description: None,
                        organization_id: org.into(),
                        created_by: author.into(),
                        is_public: false,
                        send_slack_updates: true,
                        archived_at: None,
                        created_at: now,
                        updated_at: now,
                    },
                )?;
            }
            Ok(())
        })
        .unwrap();

        let messenger = Arc::new(RecordingMessenger::default());
        let notifier = Notifier::new(
            Arc::new(MemoryDebounceStore::new(100)),
            messenger.clone(),
            Duration::from_secs(60),
        );
        let state = Arc::new(AppStateInner {
            db,
            session_secret: SECRET.to_string(),
            notifier: Arc::new(notifier),
        });

        Self {
            app: router(state),
            messenger,
        }
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token_for(user)));
        }
        let req = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let resp = self.app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, user: &str) -> (StatusCode, Value) {
        self.send("GET", uri, Some(user), None).await
    }

    pub async fn post(&self, uri: &str, user: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(user), Some(body)).await
    }

    pub async fn put(&self, uri: &str, user: &str, body: Value) -> (StatusCode, Value) {
        self.send("PUT", uri, Some(user), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, user: &str) -> (StatusCode, Value) {
        self.send("DELETE", uri, Some(user), None).await
    }

    /// Slack messages sent so far. Delivery runs on spawned tasks, so give
    /// them a moment to finish first.
    pub async fn messages(&self) -> Vec<(String, String)> {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.messenger.messages()
    }

    /// Create a note on `b1` as `user` and return its id.
    pub async fn note(&self, user: &str, items: &[&str]) -> String {
        let (status, body) = self
            .post(
                "/boards/b1/notes",
                user,
                serde_json::json!({ "checklistItems": items }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_str().unwrap().to_string()
    }
}

pub fn token_for(user_id: &str) -> String {
    let claims = SessionClaims {
        sub: user_id.to_string(),
        email: format!("{}@example.test", user_id),
        name: user_id.to_string(),
        exp: (Utc::now().timestamp() + 3600) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn ids(items: &Value) -> Vec<String> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}

pub fn orders(items: &Value) -> Vec<i64> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["order"].as_i64().unwrap())
        .collect()
}
