use crate::helpers::{auth_token, spawn_app, TestOptions, MOCK_VOICE_ID};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hyper::StatusCode;
use serde_json::{json, Value};

fn create_body() -> Value {
    json!({
        "audioBase64": BASE64.encode(vec![7u8; 4096]),
        "mimeType": "audio/m4a",
        "name": "Mum"
    })
}

#[tokio::test]
async fn it_should_reject_unauthenticated_voice_creation() {
    let app = spawn_app(TestOptions::default()).await;

    let response = app
        .client
        .post("/api/voice/create", &create_body())
        .await
        .unwrap();

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn it_should_create_a_voice_from_a_sample() {
    let app = spawn_app(TestOptions::default()).await;

    let response = app
        .client
        .post_with_auth("/api/voice/create", &create_body(), &auth_token("user-1"))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.json_str("voiceId"), Some(MOCK_VOICE_ID));
}

#[tokio::test]
async fn it_should_reject_bad_voice_samples() {
    let app = spawn_app(TestOptions::default()).await;
    let token = auth_token("user-1");

    let mut missing_audio = create_body();
    missing_audio["audioBase64"] = json!("");
    app.client
        .post_with_auth("/api/voice/create", &missing_audio, &token)
        .await
        .unwrap()
        .assert_status(StatusCode::BAD_REQUEST);

    let mut not_base64 = create_body();
    not_base64["audioBase64"] = json!("definitely not base64!!!");
    app.client
        .post_with_auth("/api/voice/create", &not_base64, &token)
        .await
        .unwrap()
        .assert_status(StatusCode::BAD_REQUEST);

    let mut too_short = create_body();
    too_short["audioBase64"] = json!(BASE64.encode(vec![7u8; 50]));
    app.client
        .post_with_auth("/api/voice/create", &too_short, &token)
        .await
        .unwrap()
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn it_should_rate_limit_voice_creation() {
    let app = spawn_app(TestOptions {
        voice_create_rate_limit: 3,
        ..Default::default()
    })
    .await;
    let token = auth_token("user-1");

    for _ in 0..3 {
        app.client
            .post_with_auth("/api/voice/create", &create_body(), &token)
            .await
            .unwrap()
            .assert_status(StatusCode::OK);
    }

    app.client
        .post_with_auth("/api/voice/create", &create_body(), &token)
        .await
        .unwrap()
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}
