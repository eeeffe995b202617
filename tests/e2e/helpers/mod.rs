pub mod api_client;
pub mod mocks;

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{encode, EncodingKey, Header};
use sqlx::postgres::PgPoolOptions;

use narration_backend::controllers::{NarrationController, VoiceController};
use narration_backend::domain::narration::{NarrationService, NarrationSettings};
use narration_backend::domain::voice::{VoiceCreateSettings, VoiceService};
use narration_backend::infrastructure::auth::jwt::Claims;
use narration_backend::infrastructure::config::{Config, Environment, LogFormat};
use narration_backend::infrastructure::http::build_router;
use narration_backend::infrastructure::records::MemoryRecordStore;

pub use api_client::TestClient;
pub use mocks::{MockObjectStore, MockSynthesis, MOCK_VOICE_ID};

pub const TEST_JWT_SECRET: &str = "e2e-test-secret";

/// Per-test knobs for the spawned application.
pub struct TestOptions {
    pub narration_rate_limit: u32,
    pub voice_create_rate_limit: u32,
    pub synth_delay: Duration,
    pub synth_fail_times: usize,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            narration_rate_limit: 100,
            voice_create_rate_limit: 100,
            synth_delay: Duration::ZERO,
            synth_fail_times: 0,
        }
    }
}

pub struct TestApp {
    pub client: TestClient,
    pub synthesis: Arc<MockSynthesis>,
}

/// Spawn the full router on an ephemeral port, backed by the in-memory
/// record store and mock collaborators.
pub async fn spawn_app(options: TestOptions) -> TestApp {
    let config = Arc::new(test_config());

    // The pool is only touched by /health/ready; connect lazily so no
    // database is needed
    let pool = Arc::new(
        PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .expect("lazy pool"),
    );

    let record_store = Arc::new(MemoryRecordStore::new());
    let synthesis = Arc::new(MockSynthesis {
        delay: options.synth_delay,
        fail_times: options.synth_fail_times.into(),
        ..Default::default()
    });
    let object_store = Arc::new(MockObjectStore::default());

    let narration_service = Arc::new(NarrationService::new(
        record_store.clone(),
        synthesis.clone(),
        object_store.clone(),
        NarrationSettings {
            lock_duration: Duration::from_secs(60),
            retry_hint: Duration::from_millis(2000),
            signed_url_ttl: Duration::from_secs(3600),
            rate_limit_window: Duration::from_secs(60),
            rate_limit_max: options.narration_rate_limit,
            url_cache_enabled: false,
        },
    ));
    let voice_service = Arc::new(VoiceService::new(
        record_store,
        synthesis.clone(),
        VoiceCreateSettings {
            rate_limit_window: Duration::from_secs(3600),
            rate_limit_max: options.voice_create_rate_limit,
        },
    ));

    let router = build_router(
        pool,
        config,
        Arc::new(NarrationController::new(narration_service)),
        Arc::new(VoiceController::new(voice_service)),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server");
    });

    TestApp {
        client: TestClient::new(&format!("http://{}", addr)),
        synthesis,
    }
}

/// Mint a bearer token the auth middleware accepts.
pub fn auth_token(user_id: &str) -> String {
    encode(
        &Header::default(),
        &Claims {
            sub: user_id.to_string(),
            exp: chrono::Utc::now().timestamp() + 3600,
        },
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("token")
}

fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/unused".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        aws_region: "eu-west-1".to_string(),
        audio_bucket: "test-bucket".to_string(),
        environment: Environment::Development,
        log_format: LogFormat::Pretty,
        elevenlabs_api_key: "test-key".to_string(),
        elevenlabs_base_url: "http://localhost:9".to_string(),
        lock_duration_secs: 60,
        retry_hint_ms: 2000,
        signed_url_ttl_days: 30,
        url_cache_enabled: false,
        narration_rate_limit: 100,
        narration_rate_window_secs: 60,
        voice_create_rate_limit: 100,
        voice_create_rate_window_secs: 3600,
    }
}
