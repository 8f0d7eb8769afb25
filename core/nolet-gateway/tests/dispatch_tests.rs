use std::time::Duration;

use nolet_crypto::{decrypt_string, Algorithm, EncryptedPayload, EncryptionConfig, Mode};
use nolet_gateway::{GatewayConfig, PushClient, PushContent, PushError};
use nolet_types::{build_basic_auth, generate_id, Device, DeviceId};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "abcdefghijklmnopqrstuv";

fn client() -> PushClient {
    PushClient::new(GatewayConfig::default()).unwrap()
}

fn device_at(server: &MockServer, key: &str) -> Device {
    Device {
        id: DeviceId::new(),
        alias: key.to_string(),
        api_url: format!("{}/{key}/", server.uri()),
        authorization: None,
        encryption: None,
    }
}

fn ok_reply() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"code": 200, "message": "success"}))
}

async fn only_request_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    serde_json::from_slice(&requests[0].body).unwrap()
}

/// An address nothing listens on.
async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/{KEY}/")
}

// ── Plain dispatch ──────────────────────────────────────────────

#[tokio::test]
async fn plain_push_wire_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/{KEY}/")))
        .and(header("content-type", "application/json"))
        .respond_with(ok_reply())
        .expect(1)
        .mount(&server)
        .await;

    let id = generate_id();
    let content = PushContent::new("hello")
        .with_title("Page title")
        .with_url("https://example.com/article")
        .with_sound("bell")
        .with_icon("https://example.com/favicon.ico");
    let reply = client()
        .send(&device_at(&server, KEY), &content, &id)
        .await
        .unwrap();
    assert_eq!(reply.code, 200);
    assert_eq!(reply.message, "success");

    let body = only_request_body(&server).await;
    assert_eq!(
        body,
        json!({
            "id": id.to_string(),
            "body": "hello",
            "title": "Page title",
            "url": "https://example.com/article",
            "sound": "bell",
            "icon": "https://example.com/favicon.ico",
        })
    );
}

#[tokio::test]
async fn missing_optional_fields_are_omitted() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ok_reply()).mount(&server).await;

    client()
        .send(&device_at(&server, KEY), &PushContent::new("hi"), &generate_id())
        .await
        .unwrap();

    let body = only_request_body(&server).await;
    let fields = body.as_object().unwrap();
    assert!(!fields.contains_key("url"));
    assert!(!fields.contains_key("sound"));
    assert!(!fields.contains_key("icon"));
    assert_eq!(fields["title"], "");
}

#[tokio::test]
async fn authorization_header_is_attached_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("authorization", "Basic YWxpY2U6c2VjcmV0"))
        .respond_with(ok_reply())
        .expect(1)
        .mount(&server)
        .await;

    let mut device = device_at(&server, KEY);
    device.authorization = build_basic_auth("alice", "secret");
    client()
        .send(&device, &PushContent::new("hi"), &generate_id())
        .await
        .unwrap();
}

#[tokio::test]
async fn no_authorization_header_without_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ok_reply()).mount(&server).await;

    client()
        .send(&device_at(&server, KEY), &PushContent::new("hi"), &generate_id())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(!requests[0].headers.contains_key("authorization"));
}

// ── Gateway replies ─────────────────────────────────────────────

#[tokio::test]
async fn gateway_failure_message_is_threaded_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"code": 400, "message": "failed to get device token"})),
        )
        .mount(&server)
        .await;

    let err = client()
        .send(&device_at(&server, KEY), &PushContent::new("hi"), &generate_id())
        .await
        .unwrap_err();
    match err {
        PushError::Gateway { code, message } => {
            assert_eq!(code, 400);
            assert_eq!(message, "failed to get device token");
        }
        other => panic!("expected gateway error, got {other:?}"),
    }
}

#[tokio::test]
async fn string_code_is_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"code": "200", "message": "ok"})),
        )
        .mount(&server)
        .await;

    let reply = client()
        .send(&device_at(&server, KEY), &PushContent::new("hi"), &generate_id())
        .await
        .unwrap();
    assert!(reply.is_success());
}

#[tokio::test]
async fn non_json_success_is_invalid_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let err = client()
        .send(&device_at(&server, KEY), &PushContent::new("hi"), &generate_id())
        .await
        .unwrap_err();
    assert!(matches!(err, PushError::InvalidBody(_)));
    assert!(err.is_transport());
}

#[tokio::test]
async fn non_json_error_status_carries_raw_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = client()
        .send(&device_at(&server, KEY), &PushContent::new("hi"), &generate_id())
        .await
        .unwrap_err();
    match err {
        PushError::Gateway { code, message } => {
            assert_eq!(code, 502);
            assert_eq!(message, "Bad Gateway");
        }
        other => panic!("expected gateway error, got {other:?}"),
    }
}

#[tokio::test]
async fn error_status_wins_over_success_code_in_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"code": 200, "message": "ok"})),
        )
        .mount(&server)
        .await;

    let err = client()
        .send(&device_at(&server, KEY), &PushContent::new("hi"), &generate_id())
        .await
        .unwrap_err();
    match err {
        PushError::Gateway { code, message } => {
            assert_eq!(code, 500);
            assert_eq!(message, "ok");
        }
        other => panic!("expected gateway error, got {other:?}"),
    }
}

#[tokio::test]
async fn error_status_with_empty_json_message_uses_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string(r#"{"code":200,"message":""}"#))
        .mount(&server)
        .await;

    let err = client()
        .send(&device_at(&server, KEY), &PushContent::new("hi"), &generate_id())
        .await
        .unwrap_err();
    match err {
        PushError::Gateway { code, message } => {
            assert_eq!(code, 503);
            assert_eq!(message, r#"{"code":200,"message":""}"#);
        }
        other => panic!("expected gateway error, got {other:?}"),
    }
}

// ── Transport failures ──────────────────────────────────────────

#[tokio::test]
async fn unreachable_gateway_is_network_error() {
    let mut device = device_at(&MockServer::start().await, KEY);
    device.api_url = closed_port_url().await;

    let err = client()
        .send(&device, &PushContent::new("hi"), &generate_id())
        .await
        .unwrap_err();
    assert!(matches!(err, PushError::Network(_)), "{err:?}");
}

#[tokio::test]
async fn slow_gateway_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ok_reply().set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let config = GatewayConfig {
        request_timeout_ms: 100,
        ..GatewayConfig::default()
    };
    let err = PushClient::new(config)
        .unwrap()
        .send(&device_at(&server, KEY), &PushContent::new("hi"), &generate_id())
        .await
        .unwrap_err();
    assert!(matches!(err, PushError::Timeout), "{err:?}");
}

#[tokio::test]
async fn malformed_endpoint_is_input_error() {
    let mut device = device_at(&MockServer::start().await, KEY);
    device.api_url = "not a url".to_string();

    let err = client()
        .send(&device, &PushContent::new("hi"), &generate_id())
        .await
        .unwrap_err();
    assert!(err.is_input());
}

// ── Encryption ──────────────────────────────────────────────────

#[tokio::test]
async fn invalid_key_is_refused_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ok_reply())
        .expect(0)
        .mount(&server)
        .await;

    let device = device_at(&server, KEY).with_encryption(Some(EncryptionConfig::new(
        Algorithm::Aes256,
        Mode::Gcm,
        "abcdefghij",
    )));
    let err = client()
        .send(&device, &PushContent::new("secret text"), &generate_id())
        .await
        .unwrap_err();
    assert!(matches!(err, PushError::InvalidEncryptionKey(_)));
    assert!(err.is_security());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn encrypted_push_hides_content_and_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ok_reply()).mount(&server).await;

    let key = "Z9".repeat(16);
    let config = EncryptionConfig::new(Algorithm::Aes256, Mode::Gcm, key.clone());
    let device = device_at(&server, KEY).with_encryption(Some(config.clone()));
    let id = generate_id();
    let content = PushContent::new("secret text")
        .with_title("t")
        .with_sound("bell");
    client().send(&device, &content, &id).await.unwrap();

    let body = only_request_body(&server).await;
    let fields = body.as_object().unwrap();
    assert_eq!(fields["id"], id.to_string());
    assert_eq!(fields["algorithm"], "AES256");
    assert_eq!(fields["mode"], "GCM");
    assert_eq!(fields["sound"], "bell");
    assert!(!fields.contains_key("body"));
    assert!(!fields.contains_key("title"));
    assert!(!body.to_string().contains(&key));
    assert!(!body.to_string().contains("secret text"));

    let iv = fields["iv"].as_str().unwrap();
    assert_eq!(iv.len(), 12);
    let payload = EncryptedPayload {
        ciphertext: fields["ciphertext"].as_str().unwrap().to_string(),
        iv: iv.to_string(),
    };
    let plain: Value = serde_json::from_str(&decrypt_string(&config, &payload).unwrap()).unwrap();
    assert_eq!(plain["body"], "secret text");
    assert_eq!(plain["title"], "t");
}

#[tokio::test]
async fn cbc_push_uses_sixteen_char_iv() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ok_reply()).mount(&server).await;

    let config = EncryptionConfig::new(Algorithm::Aes128, Mode::Cbc, "a".repeat(16));
    let device = device_at(&server, KEY).with_encryption(Some(config));
    client()
        .send(&device, &PushContent::new("x"), &generate_id())
        .await
        .unwrap();

    let body = only_request_body(&server).await;
    assert_eq!(body["iv"].as_str().unwrap().len(), 16);
    assert_eq!(body["mode"], "CBC");
    assert_eq!(body["algorithm"], "AES128");
}

#[tokio::test]
async fn caller_ciphertext_is_forwarded_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST")).respond_with(ok_reply()).mount(&server).await;

    let device = device_at(&server, KEY).with_encryption(Some(EncryptionConfig::new(
        Algorithm::Aes128,
        Mode::Gcm,
        "a".repeat(16),
    )));
    let content = PushContent::new("QUJDREVG").pre_encrypted(Some("abcdefghijkl".to_string()));
    client()
        .send(&device, &content, &generate_id())
        .await
        .unwrap();

    let body = only_request_body(&server).await;
    assert_eq!(body["ciphertext"], "QUJDREVG");
    assert_eq!(body["iv"], "abcdefghijkl");
    assert!(body.get("body").is_none());
    assert!(body.get("algorithm").is_none());
}

// ── Fan-out ─────────────────────────────────────────────────────

#[tokio::test]
async fn fanout_shares_one_id_and_isolates_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bbbbbbbbbbbbbbbbbbbbbb/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"code": 400, "message": "nope"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST")).respond_with(ok_reply()).mount(&server).await;

    let devices = vec![
        device_at(&server, "aaaaaaaaaaaaaaaaaaaaaa"),
        device_at(&server, "bbbbbbbbbbbbbbbbbbbbbb"),
        device_at(&server, "cccccccccccccccccccccc"),
    ];
    let id = generate_id();
    let outcomes = client()
        .send_fanout(&devices, &PushContent::new("hi"), &id)
        .await;

    assert_eq!(outcomes.len(), 3);
    for (outcome, device) in outcomes.iter().zip(&devices) {
        assert_eq!(outcome.device_id, device.id);
        assert_eq!(outcome.alias, device.alias);
    }
    assert!(outcomes[0].result.is_ok());
    assert!(matches!(
        outcomes[1].result,
        Err(PushError::Gateway { code: 400, .. })
    ));
    assert!(outcomes[2].result.is_ok());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    for request in requests {
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(body["id"], id.to_string());
    }
}

#[tokio::test]
async fn fanout_with_bad_key_still_reaches_other_devices() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ok_reply())
        .expect(1)
        .mount(&server)
        .await;

    let bad = device_at(&server, "aaaaaaaaaaaaaaaaaaaaaa").with_encryption(Some(
        EncryptionConfig::new(Algorithm::Aes192, Mode::Gcm, "short"),
    ));
    let good = device_at(&server, "bbbbbbbbbbbbbbbbbbbbbb");
    let outcomes = client()
        .send_fanout(&[bad, good], &PushContent::new("hi"), &generate_id())
        .await;

    assert!(matches!(
        outcomes[0].result,
        Err(PushError::InvalidEncryptionKey(_))
    ));
    assert!(outcomes[1].result.is_ok());
}

#[tokio::test]
async fn fanout_over_no_devices_is_empty() {
    let outcomes = client()
        .send_fanout(&[], &PushContent::new("hi"), &generate_id())
        .await;
    assert!(outcomes.is_empty());
}
