//! Distribution against mocked Catbox, Telegram and webhook endpoints.

use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shorts_models::Caption;
use shorts_storage::{CatboxConfig, CatboxUploader};
use shorts_worker::{
    ChannelOutcome, DistributionConfig, Distributor, TelegramConfig, WebhookConfig,
};

fn caption() -> Caption {
    Caption {
        title: "River Vibes 🌿".to_string(),
        hashtags: vec!["#river".to_string(), "#nature".to_string()],
    }
}

fn clip(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("final_output.mp4");
    std::fs::write(&path, b"not really an mp4").unwrap();
    path
}

fn distributor(server: &MockServer) -> Distributor {
    let config = DistributionConfig {
        telegram: Some(TelegramConfig {
            token: "123:abc".to_string(),
            chat_id: "-1001".to_string(),
            base_url: server.uri(),
        }),
        webhook: Some(WebhookConfig {
            url: format!("{}/hook", server.uri()),
        }),
    };
    let uploader = CatboxUploader::new(CatboxConfig {
        base_url: server.uri(),
        timeout: Duration::from_secs(5),
    })
    .unwrap();
    Distributor::from_config(&config, Box::new(uploader), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_upload_failure_sends_no_webhook() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/api.php"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendVideo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let report = distributor(&server).distribute(&clip(&dir), &caption()).await;

    assert_eq!(report.outcome_for("telegram"), Some(&ChannelOutcome::Delivered));
    assert!(matches!(report.outcome_for("webhook"), Some(ChannelOutcome::Skipped { .. })));
}

#[tokio::test]
async fn test_full_delivery() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/api.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("https://files.catbox.moe/abc123.mp4"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendVideo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let report = distributor(&server).distribute(&clip(&dir), &caption()).await;

    assert_eq!(report.delivered_count(), 2);
    assert_eq!(report.public_url.as_deref(), Some("https://files.catbox.moe/abc123.mp4"));

    let requests = server.received_requests().await.unwrap();
    let hook = requests.iter().find(|r| r.url.path() == "/hook").unwrap();
    let body: serde_json::Value = serde_json::from_slice(&hook.body).unwrap();
    assert_eq!(body["video_url"], "https://files.catbox.moe/abc123.mp4");
    assert_eq!(body["content"], "🌿 Daily Nature Dose: https://files.catbox.moe/abc123.mp4");

    // Direct-file channel goes first
    assert_eq!(requests[0].url.path(), "/bot123:abc/sendVideo");
}

#[tokio::test]
async fn test_telegram_failure_does_not_block_webhook() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendVideo"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "ok": false,
            "description": "Forbidden: bot was kicked"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/user/api.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("https://files.catbox.moe/x.mp4"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let report = distributor(&server).distribute(&clip(&dir), &caption()).await;

    assert!(matches!(report.outcome_for("telegram"), Some(ChannelOutcome::Failed { reason }) if reason.contains("kicked")));
    assert_eq!(report.outcome_for("webhook"), Some(&ChannelOutcome::Delivered));
}
