use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use ed25519_dalek::{Signer, SigningKey};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

use sns_draft::ai::client::DraftGenerator;
use sns_draft::api::handler::{App, handle_webhook, route_request};
use sns_draft::core::access::{StaticFeatureGate, StaticUserSettings};
use sns_draft::core::aggregate::ChannelHistory;
use sns_draft::core::models::{ChannelScope, HistoryMessage, ThreadRef};
use sns_draft::core::snowflake::Snowflake;
use sns_draft::draft::DraftService;
use sns_draft::errors::DraftError;

const TIMESTAMP: &str = "1709254800";

fn signing_key() -> SigningKey {
    SigningKey::from_bytes(&[42u8; 32])
}

fn signed_headers(body: &str) -> Value {
    let sig = signing_key().sign(format!("{TIMESTAMP}{body}").as_bytes());
    json!({
        "x-signature-ed25519": hex::encode(sig.to_bytes()),
        "x-signature-timestamp": TIMESTAMP,
        "content-type": "application/json"
    })
}

fn now() -> DateTime<Utc> {
    // 2024-03-01 10:00 in Tokyo
    Utc.with_ymd_and_hms(2024, 3, 1, 1, 0, 0).unwrap()
}

struct FakeHistory {
    messages: Vec<HistoryMessage>,
    threads: Vec<ThreadRef>,
    thread_messages: Vec<HistoryMessage>,
}

#[async_trait]
impl ChannelHistory for FakeHistory {
    async fn fetch_messages(
        &self,
        channel_id: Snowflake,
        _after: u64,
        _before: u64,
        _limit: usize,
    ) -> Result<Vec<HistoryMessage>, DraftError> {
        if channel_id == Snowflake(900) {
            Ok(self.thread_messages.clone())
        } else {
            Ok(self.messages.clone())
        }
    }

    async fn active_threads(&self, _scope: &ChannelScope) -> Result<Vec<ThreadRef>, DraftError> {
        Ok(self.threads.clone())
    }

    async fn archived_threads(
        &self,
        _channel_id: Snowflake,
        _since: DateTime<Utc>,
    ) -> Result<Vec<ThreadRef>, DraftError> {
        Err(DraftError::AccessDenied("missing READ_MESSAGE_HISTORY".into()))
    }
}

#[derive(Default)]
struct FakeGenerator {
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl DraftGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, DraftError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok("Busy morning at the studio! #gamedev".to_string())
    }
}

fn message(id: u64, author: &str, minutes_ago: i64, bot: bool) -> HistoryMessage {
    HistoryMessage {
        message_id: Snowflake(id),
        author_name: author.to_string(),
        author_is_automated: bot,
        content: format!("note {id}"),
        posted_at: now() - Duration::minutes(minutes_ago),
        attachment_urls: Vec::new(),
    }
}

fn app_with(history: FakeHistory, generator: Arc<FakeGenerator>, features: Vec<String>) -> App {
    App::new(
        hex::encode(signing_key().verifying_key().to_bytes()),
        Arc::new(StaticFeatureGate::new(features)),
        Arc::new(StaticUserSettings::default()),
        DraftService::new(Arc::new(history), generator),
    )
}

fn default_app(generator: Arc<FakeGenerator>) -> App {
    let history = FakeHistory {
        messages: vec![
            message(1, "alice", 120, false),
            message(2, "deploy-bot", 90, true),
            message(3, "bob", 60, false),
        ],
        threads: vec![ThreadRef {
            id: Snowflake(900),
            name: "playtest".into(),
            archived: false,
            last_activity: None,
        }],
        thread_messages: vec![message(4, "carol", 100, false), message(5, "alice", 10, false)],
    };
    app_with(history, generator, vec!["sns-x".to_string()])
}

fn command_body(name: &str, options: &Value) -> String {
    json!({
        "type": 2,
        "channel_id": "100",
        "guild_id": "1",
        "member": {"user": {"id": "555", "username": "alice"}},
        "data": {"name": name, "options": options}
    })
    .to_string()
}

fn reply_content(response: &Value) -> String {
    assert_eq!(response["statusCode"], 200);
    let body: Value = serde_json::from_str(response["body"].as_str().unwrap()).unwrap();
    assert_eq!(body["type"], 4);
    body["data"]["content"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_signed_ping_gets_pong() {
    let app = default_app(Arc::new(FakeGenerator::default()));
    let body = r#"{"type":1}"#;

    let response = handle_webhook(&app, &signed_headers(body), body, now()).await;

    assert_eq!(response["statusCode"], 200);
    assert_eq!(response["body"], r#"{"type":1}"#);
}

#[tokio::test]
async fn test_bad_signature_is_rejected() {
    let app = default_app(Arc::new(FakeGenerator::default()));
    let headers = signed_headers(r#"{"type":1}"#);

    let response = handle_webhook(&app, &headers, r#"{"type":2}"#, now()).await;

    assert_eq!(response["statusCode"], 401);
}

#[tokio::test]
async fn test_today_command_produces_draft() {
    let generator = Arc::new(FakeGenerator::default());
    let app = default_app(generator.clone());
    let body = command_body("sns-x-today", &json!([]));

    let response = handle_webhook(&app, &signed_headers(&body), &body, now()).await;
    let content = reply_content(&response);

    assert!(content.starts_with("**X Post Draft (Today, ja)**\n"));
    assert!(content.contains("Time: 2024-03-01 00:00 - 2024-03-01 10:00 (Asia/Tokyo)"));
    assert!(content.contains("Messages: 4"));
    assert!(content.ends_with("Busy morning at the studio! #gamedev"));

    let prompts = generator.prompts.lock().unwrap();
    assert!(!prompts[0].contains("deploy-bot"));
    assert!(prompts[0].contains("carol (in Thread: playtest): note 4"));
}

#[tokio::test]
async fn test_language_option_overrides_setting() {
    let app = default_app(Arc::new(FakeGenerator::default()));
    let body = command_body(
        "sns-x",
        &json!([
            {"name": "from", "type": 3, "value": "2024-03-01"},
            {"name": "to", "type": 3, "value": "2024-03-01"},
            {"name": "language", "type": 3, "value": "en"}
        ]),
    );

    let response = handle_webhook(&app, &signed_headers(&body), &body, now()).await;
    let content = reply_content(&response);

    assert!(content.starts_with("**X Post Draft (en)**\n"));
    assert!(content.contains("Time: 2024-03-01 00:00 - 2024-03-01 23:59 (Asia/Tokyo)"));
}

#[tokio::test]
async fn test_invalid_date_is_a_soft_error() {
    let generator = Arc::new(FakeGenerator::default());
    let app = default_app(generator.clone());
    let body = command_body(
        "sns-x",
        &json!([
            {"name": "from", "type": 3, "value": "2024-13-40"},
            {"name": "to", "type": 3, "value": "2024-03-01"}
        ]),
    );

    let response = handle_webhook(&app, &signed_headers(&body), &body, now()).await;

    assert_eq!(
        reply_content(&response),
        "❌ Invalid date format. Please use YYYY-MM-DD."
    );
    assert!(generator.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_window_reports_no_messages() {
    let history = FakeHistory {
        messages: vec![message(2, "deploy-bot", 5, true)],
        threads: Vec::new(),
        thread_messages: Vec::new(),
    };
    let app = app_with(
        history,
        Arc::new(FakeGenerator::default()),
        vec!["sns-x".to_string()],
    );
    let body = command_body(
        "sns-x",
        &json!([
            {"name": "from", "type": 3, "value": "2024-03-01"},
            {"name": "to", "type": 3, "value": "2024-03-01"}
        ]),
    );

    let response = handle_webhook(&app, &signed_headers(&body), &body, now()).await;

    assert!(reply_content(&response).ends_with("No messages found in this period."));
}

#[tokio::test]
async fn test_unknown_command_and_disabled_feature() {
    let app = default_app(Arc::new(FakeGenerator::default()));
    let body = command_body("weather", &json!([]));
    let response = handle_webhook(&app, &signed_headers(&body), &body, now()).await;
    assert_eq!(reply_content(&response), "Command not found.");

    let locked = app_with(
        FakeHistory {
            messages: Vec::new(),
            threads: Vec::new(),
            thread_messages: Vec::new(),
        },
        Arc::new(FakeGenerator::default()),
        Vec::new(),
    );
    let body = command_body("sns-x-today", &json!([]));
    let response = handle_webhook(&locked, &signed_headers(&body), &body, now()).await;
    assert_eq!(
        reply_content(&response),
        "You do not have permission to use the `sns-x` feature."
    );
}

#[tokio::test]
async fn test_missing_channel_is_reported() {
    let app = default_app(Arc::new(FakeGenerator::default()));
    let body = json!({
        "type": 2,
        "user": {"id": "555"},
        "data": {"name": "sns-x-today"}
    })
    .to_string();

    let response = handle_webhook(&app, &signed_headers(&body), &body, now()).await;

    assert_eq!(reply_content(&response), "Could not determine channel ID.");
}

#[tokio::test]
async fn test_route_request_status_codes() {
    let body = r#"{"type":1}"#;

    let unsigned = json!({"headers": {}, "body": body});
    let response = route_request(&unsigned, || unreachable!(), now()).await;
    assert_eq!(response["statusCode"], 401);

    let signed = json!({"headers": signed_headers(body), "body": body});
    let response = route_request(
        &signed,
        || Err(DraftError::ConfigError("DISCORD_PUBLIC_KEY: environment variable not found".into())),
        now(),
    )
    .await;
    assert_eq!(response["statusCode"], 500);
}

#[tokio::test]
async fn test_oversized_language_option_is_capped() {
    let generator = Arc::new(FakeGenerator::default());
    let app = default_app(generator.clone());
    let language = format!("en\n{}", "e".repeat(1990));
    let body = command_body(
        "sns-x-today",
        &json!([{"name": "language", "type": 3, "value": language}]),
    );

    let response = handle_webhook(&app, &signed_headers(&body), &body, now()).await;
    let content = reply_content(&response);

    let capped = format!("en{}", "e".repeat(30));
    assert!(content.chars().count() <= 2000);
    assert!(content.starts_with(&format!("**X Post Draft (Today, {capped})**\n")));
    assert!(content.ends_with("Busy morning at the studio! #gamedev"));
    let prompts = generator.prompts.lock().unwrap();
    assert!(prompts[0].contains(&format!("Write the post in {capped}.")));
}
