// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `notify.rs`

use super::*;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn event(error: Option<&str>) -> Notification<'_> {
    Notification {
        domain: "example.com",
        provider: "cloudflare",
        msg: "+ CREATE www A 192.0.2.1 ttl=300",
        error,
        preview: false,
    }
}

#[test]
fn test_notification_text() {
    assert_eq!(
        event(None).text(),
        "Successfully ran correction for example.com[cloudflare] - + CREATE www A 192.0.2.1 ttl=300"
    );
    assert!(event(Some("boom")).text().ends_with(": boom"));

    let preview = Notification {
        preview: true,
        ..event(None)
    };
    assert!(preview.text().starts_with("DNSControl preview: example.com[cloudflare]"));
}

#[tokio::test]
async fn test_webhook_posts_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(body_partial_json(serde_json::json!({
            "domain": "example.com",
            "provider": "cloudflare",
            "error": "boom",
            "preview": false
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/hook", server.uri())).unwrap();
    let notifier = WebhookNotifier::new(HttpClient::new(), url);

    notifier.notify(&event(Some("boom"))).await.unwrap();
}

#[tokio::test]
async fn test_slack_posts_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(serde_json::json!({ "text": event(None).text() })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = SlackNotifier::new(HttpClient::new(), Url::parse(&server.uri()).unwrap());
    notifier.notify(&event(None)).await.unwrap();
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("down"))
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::new(HttpClient::new(), Url::parse(&server.uri()).unwrap());
    let err = notifier.notify(&event(None)).await.unwrap_err();
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_multi_notifier_swallows_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let url = Url::parse(&server.uri()).unwrap();
    let multi = MultiNotifier::new(vec![
        Box::new(WebhookNotifier::new(HttpClient::new(), url.clone())),
        Box::new(SlackNotifier::new(HttpClient::new(), url)),
    ]);

    assert!(multi.notify(&event(None)).await.is_ok());
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[test]
fn test_build_notifier() {
    let client = HttpClient::new();
    let config = ProviderConfig::from([
        ("webhook_url".to_string(), "https://hooks.example.com/dns".to_string()),
        ("slack_url".to_string(), String::new()),
    ]);

    assert!(build_notifier(true, Some(&config), &client).is_ok());
    assert!(build_notifier(false, Some(&config), &client).is_ok());
    assert!(build_notifier(true, None, &client).is_ok());

    let bad = ProviderConfig::from([("slack_url".to_string(), "ftp://example.com".to_string())]);
    assert!(build_notifier(true, Some(&bad), &client).is_err());
    let garbage = ProviderConfig::from([("webhook_url".to_string(), "not a url".to_string())]);
    assert!(build_notifier(true, Some(&garbage), &client).is_err());
}
