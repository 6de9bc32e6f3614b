//! Send pipeline tests with mocked transport and classifier

use async_trait::async_trait;
use leadflow_common::db::{
    init_memory_database, LeadStatus, MessageStatus, UserMessagingSettings,
};
use leadflow_msg::db::settings;
use leadflow_msg::send::{send_message, SendError, SendRequest};
use leadflow_msg::{AppState, Classification, DeliveryOutcome, MessageClassifier, SmsTransport};
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

struct OkTransport;

#[async_trait]
impl SmsTransport for OkTransport {
    async fn send(
        &self,
        _settings: &UserMessagingSettings,
        _to: &str,
        _message: &str,
    ) -> anyhow::Result<DeliveryOutcome> {
        Ok(DeliveryOutcome {
            success: true,
            error: None,
        })
    }
}

struct RejectingTransport;

#[async_trait]
impl SmsTransport for RejectingTransport {
    async fn send(
        &self,
        _settings: &UserMessagingSettings,
        _to: &str,
        _message: &str,
    ) -> anyhow::Result<DeliveryOutcome> {
        Ok(DeliveryOutcome {
            success: false,
            error: Some("gateway rejected".to_string()),
        })
    }
}

/// Fixed classification plus a call counter
struct StaticClassifier {
    status: Option<LeadStatus>,
    confidence: f64,
    calls: Arc<AtomicUsize>,
}

impl StaticClassifier {
    fn new(status: Option<LeadStatus>, confidence: f64) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                status,
                confidence,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl MessageClassifier for StaticClassifier {
    async fn classify(&self, _text: &str) -> anyhow::Result<Classification> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Classification {
            status: self.status,
            confidence: self.confidence,
            reasoning: Some("test reasoning".to_string()),
        })
    }
}

struct FailingClassifier;

#[async_trait]
impl MessageClassifier for FailingClassifier {
    async fn classify(&self, _text: &str) -> anyhow::Result<Classification> {
        anyhow::bail!("classifier offline")
    }
}

struct TestFixture {
    pool: SqlitePool,
    workspace_id: Uuid,
    contact_id: Uuid,
    property_id: Uuid,
}

/// Seed a workspace with one contact, one property, and settings whose
/// window always contains the test run's wall clock
async fn fixture() -> TestFixture {
    let pool = init_memory_database().await.unwrap();
    let workspace_id = Uuid::new_v4();

    let contact_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO contacts (guid, workspace_id, first_name, last_name)
         VALUES (?, ?, 'Jane', 'Doe')",
    )
    .bind(contact_id.to_string())
    .bind(workspace_id.to_string())
    .execute(&pool)
    .await
    .unwrap();

    let property_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO properties (guid, workspace_id, address) VALUES (?, ?, '123 Main St')",
    )
    .bind(property_id.to_string())
    .bind(workspace_id.to_string())
    .execute(&pool)
    .await
    .unwrap();

    let mut user_settings = UserMessagingSettings::defaults("u1".into(), workspace_id);
    user_settings.message_window_start = "00:00".into();
    user_settings.message_window_end = "23:59".into();
    user_settings.gateway_api_key = Some("key".into());
    settings::upsert(&pool, &user_settings).await.unwrap();

    TestFixture {
        pool,
        workspace_id,
        contact_id,
        property_id,
    }
}

fn request(fixture: &TestFixture, property_id: Option<Uuid>) -> SendRequest {
    SendRequest {
        workspace_id: fixture.workspace_id,
        user_id: "u1".to_string(),
        contact_id: fixture.contact_id,
        to: "+15550001111".to_string(),
        content: "Are you still interested in selling?".to_string(),
        property_id,
    }
}

#[tokio::test]
async fn test_successful_send_stores_delivered_message() {
    let fixture = fixture().await;
    let (classifier, _) = StaticClassifier::new(None, 0.0);
    let state = AppState::new(
        fixture.pool.clone(),
        Arc::new(OkTransport),
        Arc::new(classifier),
    );

    let outcome = send_message(&state, request(&fixture, None)).await.unwrap();
    assert_eq!(outcome.status, MessageStatus::Delivered);

    let (status, sender): (String, String) =
        sqlx::query_as("SELECT status, sender_id FROM messages")
            .fetch_one(&fixture.pool)
            .await
            .unwrap();
    assert_eq!(status, "delivered");
    assert_eq!(sender, "u1");

    // Thread was created for the contact
    let threads: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM message_threads")
        .fetch_one(&fixture.pool)
        .await
        .unwrap();
    assert_eq!(threads, 1);
}

#[tokio::test]
async fn test_transport_failure_stores_failed_message() {
    let fixture = fixture().await;
    let (classifier, _) = StaticClassifier::new(None, 0.0);
    let state = AppState::new(
        fixture.pool.clone(),
        Arc::new(RejectingTransport),
        Arc::new(classifier),
    );

    let result = send_message(&state, request(&fixture, None)).await;
    assert!(matches!(result, Err(SendError::Transport(_))));

    let status: String = sqlx::query_scalar("SELECT status FROM messages")
        .fetch_one(&fixture.pool)
        .await
        .unwrap();
    assert_eq!(status, "failed");
}

#[tokio::test]
async fn test_gate_denial_stores_nothing() {
    let fixture = fixture().await;
    let mut user_settings = UserMessagingSettings::defaults("u1".into(), fixture.workspace_id);
    user_settings.message_window_start = "00:00".into();
    user_settings.message_window_end = "23:59".into();
    user_settings.daily_message_limit = 0;
    settings::upsert(&fixture.pool, &user_settings).await.unwrap();

    let (classifier, _) = StaticClassifier::new(None, 0.0);
    let state = AppState::new(
        fixture.pool.clone(),
        Arc::new(OkTransport),
        Arc::new(classifier),
    );

    let result = send_message(&state, request(&fixture, None)).await;
    match result {
        Err(SendError::Blocked { reason }) => assert_eq!(reason, "limit reached"),
        other => panic!("expected Blocked, got {:?}", other.map(|o| o.status)),
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages")
        .fetch_one(&fixture.pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_confident_classification_writes_back() {
    let fixture = fixture().await;
    let (classifier, _) = StaticClassifier::new(Some(LeadStatus::Interested), 0.9);
    let state = AppState::new(
        fixture.pool.clone(),
        Arc::new(OkTransport),
        Arc::new(classifier),
    );

    let outcome = send_message(&state, request(&fixture, Some(fixture.property_id)))
        .await
        .unwrap();
    assert!(outcome.classification.is_some());

    let property_status: String = sqlx::query_scalar("SELECT status FROM properties")
        .fetch_one(&fixture.pool)
        .await
        .unwrap();
    assert_eq!(property_status, "interested");

    let (source, confidence): (String, Option<f64>) =
        sqlx::query_as("SELECT source, confidence FROM property_status_history")
            .fetch_one(&fixture.pool)
            .await
            .unwrap();
    assert_eq!(source, "ai");
    assert_eq!(confidence, Some(0.9));

    let thread_status: String = sqlx::query_scalar("SELECT status FROM message_threads")
        .fetch_one(&fixture.pool)
        .await
        .unwrap();
    assert_eq!(thread_status, "interested");
}

#[tokio::test]
async fn test_threshold_confidence_does_not_write_back() {
    let fixture = fixture().await;
    // Exactly at the threshold: not strictly greater, so no write-back
    let (classifier, _) = StaticClassifier::new(Some(LeadStatus::Interested), 0.7);
    let state = AppState::new(
        fixture.pool.clone(),
        Arc::new(OkTransport),
        Arc::new(classifier),
    );

    let outcome = send_message(&state, request(&fixture, Some(fixture.property_id)))
        .await
        .unwrap();
    // The classification is still reported to the caller
    assert!(outcome.classification.is_some());

    let property_status: String = sqlx::query_scalar("SELECT status FROM properties")
        .fetch_one(&fixture.pool)
        .await
        .unwrap();
    assert_eq!(property_status, "none");

    let history: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM property_status_history")
        .fetch_one(&fixture.pool)
        .await
        .unwrap();
    assert_eq!(history, 0);
}

#[tokio::test]
async fn test_classifier_failure_does_not_fail_the_send() {
    let fixture = fixture().await;
    let state = AppState::new(
        fixture.pool.clone(),
        Arc::new(OkTransport),
        Arc::new(FailingClassifier),
    );

    let outcome = send_message(&state, request(&fixture, Some(fixture.property_id)))
        .await
        .unwrap();
    assert_eq!(outcome.status, MessageStatus::Delivered);
    assert!(outcome.classification.is_none());
}

#[tokio::test]
async fn test_classifier_not_consulted_without_property() {
    let fixture = fixture().await;
    let (classifier, calls) = StaticClassifier::new(Some(LeadStatus::Interested), 0.9);
    let state = AppState::new(
        fixture.pool.clone(),
        Arc::new(OkTransport),
        Arc::new(classifier),
    );

    let outcome = send_message(&state, request(&fixture, None)).await.unwrap();
    assert!(outcome.classification.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_delivered_sends_consume_the_daily_limit() {
    let fixture = fixture().await;
    let mut user_settings = UserMessagingSettings::defaults("u1".into(), fixture.workspace_id);
    user_settings.message_window_start = "00:00".into();
    user_settings.message_window_end = "23:59".into();
    user_settings.daily_message_limit = 2;
    settings::upsert(&fixture.pool, &user_settings).await.unwrap();

    let (classifier, _) = StaticClassifier::new(None, 0.0);
    let state = AppState::new(
        fixture.pool.clone(),
        Arc::new(OkTransport),
        Arc::new(classifier),
    );

    send_message(&state, request(&fixture, None)).await.unwrap();
    send_message(&state, request(&fixture, None)).await.unwrap();

    // Third attempt hits the limit
    let result = send_message(&state, request(&fixture, None)).await;
    assert!(matches!(result, Err(SendError::Blocked { .. })));
}
