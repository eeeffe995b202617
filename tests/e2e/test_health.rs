use crate::helpers::{spawn_app, TestOptions};
use hyper::StatusCode;

#[tokio::test]
async fn it_should_return_ok_for_health_check() {
    let app = spawn_app(TestOptions::default()).await;

    let response = app.client.get("/health").await.unwrap();

    response.assert_status(StatusCode::OK);

    // Health endpoint returns plain text
    let body = String::from_utf8(response.body_bytes.clone()).unwrap();
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn it_should_not_require_auth_for_health_check() {
    let app = spawn_app(TestOptions::default()).await;

    let response = app.client.get("/health").await.unwrap();
    response.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn it_should_include_request_id_in_responses() {
    let app = spawn_app(TestOptions::default()).await;

    let response = app.client.get("/health").await.unwrap();
    response.assert_header_exists("x-request-id");
}
