//! Common test utilities for in-process API testing.
//!
//! The fixture wires the real router, SQLite stores and audit writer, with
//! only the outbound queue mocked.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use shareable_lists_core::{
    create_audit_system, create_authenticator, AuditErrorTracker, AuditFilter, AuditRecord,
    AuditStore, AuthConfig, Authenticator, AuthMethod, Config, DatabaseConfig, DeletionPipeline, ErrorTracker,
    ListItemStore, NewListItem, PipelineConfig, QueueClient, QueueConfig, ServerConfig,
    SqliteAuditStore, SqliteListItemStore,
    testing::MockQueueClient,
};
use shareable_lists_server::state::AppState;

/// Re-export fixtures for test convenience
pub use shareable_lists_core::testing::fixtures;

pub const TEST_API_KEY: &str = "test-api-key";

/// In-process server with a mock queue.
pub struct TestFixture {
    pub router: Router,
    pub queue: Arc<MockQueueClient>,
    pub list_items: Arc<SqliteListItemStore>,
    pub audit_store: Arc<SqliteAuditStore>,
    /// Keeps the database files alive
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub auth: AuthMethod,
    pub pipeline: PipelineConfig,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            auth: AuthMethod::None,
            pipeline: PipelineConfig::new(10, 5, 2),
        }
    }
}

impl TestConfig {
    pub fn with_api_key() -> Self {
        Self {
            auth: AuthMethod::ApiKey,
            ..Default::default()
        }
    }
}

impl TestFixture {
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let config = Config {
            auth: AuthConfig {
                method: test_config.auth,
                api_key: match test_config.auth {
                    AuthMethod::ApiKey => Some(TEST_API_KEY.to_string()),
                    AuthMethod::None => None,
                },
            },
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            queue: QueueConfig {
                url: "http://127.0.0.1:9/unused".to_string(),
                api_key: None,
                timeout_secs: 1,
            },
            pipeline: test_config.pipeline.clone(),
        };

        let authenticator: Arc<dyn Authenticator> =
            Arc::from(create_authenticator(&config.auth).expect("Failed to create authenticator"));
        let audit_store = Arc::new(
            SqliteAuditStore::new(&db_path).expect("Failed to create audit store"),
        );
        let list_items = Arc::new(
            SqliteListItemStore::new(&db_path).expect("Failed to create list item store"),
        );
        let queue = Arc::new(MockQueueClient::new());

        let (audit_handle, audit_writer) =
            create_audit_system(Arc::clone(&audit_store) as Arc<dyn AuditStore>, 100);
        tokio::spawn(audit_writer.run());

        let tracker: Arc<dyn ErrorTracker> =
            Arc::new(AuditErrorTracker::new(audit_handle.clone()));
        let pipeline = DeletionPipeline::new(
            test_config.pipeline,
            Arc::clone(&list_items) as Arc<dyn ListItemStore>,
            Arc::clone(&queue) as Arc<dyn QueueClient>,
            tracker,
        );

        let state = Arc::new(AppState::new(
            config,
            authenticator,
            audit_handle,
            Arc::clone(&audit_store) as Arc<dyn AuditStore>,
            Arc::clone(&list_items) as Arc<dyn ListItemStore>,
            pipeline,
        ));

        Self {
            router: shareable_lists_server::api::create_router(state),
            queue,
            list_items,
            audit_store,
            temp_dir,
        }
    }

    pub fn seed(&self, items: Vec<NewListItem>) {
        for item in items {
            self.list_items.insert(item).expect("Failed to seed list item");
        }
    }

    /// Poll the audit trail until `count` events of `event_type` are written.
    pub async fn wait_for_audit(&self, event_type: &str, count: usize) -> Vec<AuditRecord> {
        let filter = AuditFilter::new().with_event_type(event_type);
        for _ in 0..100 {
            let records = self.audit_store.query(&filter).expect("audit query");
            if records.len() >= count {
                return records;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("timed out waiting for {count} {event_type} audit events");
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, &[]).await
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body), &[]).await
    }

    pub async fn post_with_headers(
        &self,
        path: &str,
        body: Value,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        self.request("POST", path, Some(body), headers).await
    }

    pub async fn get_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        self.request("GET", path, None, headers).await
    }

    /// Raw text body, for `/metrics`.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = match body {
            Some(json) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(serde_json::to_vec(&json).unwrap())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
