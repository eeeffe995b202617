use anyhow::Result;
use http_body_util::{BodyExt, Full};
use hyper::{body::Bytes, Method, Request, StatusCode};
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Clone)]
pub struct TestClient {
    base_url: String,
    client: Client<hyper_util::client::legacy::connect::HttpConnector, Full<Bytes>>,
}

impl TestClient {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder(TokioExecutor::new()).build_http();
        Self {
            base_url: base_url.to_string(),
            client,
        }
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.request::<()>(Method::GET, path, None, None).await
    }

    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<ApiResponse> {
        self.request(Method::POST, path, Some(body), None).await
    }

    pub async fn post_with_auth<T: Serialize>(
        &self,
        path: &str,
        body: &T,
        token: &str,
    ) -> Result<ApiResponse> {
        self.request(Method::POST, path, Some(body), Some(token))
            .await
    }

    async fn request<T: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&T>,
        auth_token: Option<&str>,
    ) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, path);
        let mut req_builder = Request::builder().method(method).uri(&url);

        if let Some(token) = auth_token {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => req_builder
                .header("Content-Type", "application/json")
                .body(Full::new(Bytes::from(serde_json::to_vec(body)?)))?,
            None => req_builder.body(Full::new(Bytes::new()))?,
        };

        let response = self.client.request(request).await?;

        let status = response.status();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.to_string(), v.to_str().ok()?.to_string())))
            .collect();

        let body_bytes = response.into_body().collect().await?.to_bytes().to_vec();
        let body = serde_json::from_slice::<Value>(&body_bytes).ok();

        Ok(ApiResponse {
            status,
            headers,
            body,
            body_bytes,
        })
    }
}

pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HashMap<String, String>,
    pub body: Option<Value>,
    pub body_bytes: Vec<u8>,
}

impl ApiResponse {
    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(
            self.status, expected,
            "unexpected status, body: {:?}",
            self.body
        );
    }

    pub fn assert_header_exists(&self, name: &str) {
        assert!(
            self.headers.contains_key(name),
            "missing header '{}', present: {:?}",
            name,
            self.headers.keys().collect::<Vec<_>>()
        );
    }

    pub fn json_str(&self, field: &str) -> Option<&str> {
        self.body.as_ref()?.get(field)?.as_str()
    }

    pub fn json_bool(&self, field: &str) -> Option<bool> {
        self.body.as_ref()?.get(field)?.as_bool()
    }

    pub fn json_u64(&self, field: &str) -> Option<u64> {
        self.body.as_ref()?.get(field)?.as_u64()
    }
}
