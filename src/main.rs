use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use narration_backend::domain::narration::{NarrationService, NarrationSettings};
use narration_backend::domain::voice::{VoiceCreateSettings, VoiceService};
use narration_backend::infrastructure::config::{Config, LogFormat};
use narration_backend::infrastructure::db::{check_connection, create_pool, run_migrations};
use narration_backend::infrastructure::http::start_http_server;
use narration_backend::infrastructure::records::{PgRecordStore, RecordStore};
use narration_backend::infrastructure::repositories::{
    ElevenLabsRepository, ObjectStore, S3ObjectStore, SynthesisRepository,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting Narration Backend on {}:{}",
        config.host,
        config.port
    );

    // Create database connection pool
    let pool = create_pool(&config.database_url).await?;
    tracing::info!("Database connection pool created");

    // Verify connection and apply migrations
    check_connection(&pool).await?;
    run_migrations(&pool).await?;
    tracing::info!("Database connection verified, migrations applied");

    // Create the S3 client for audio blobs and signed links
    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.aws_region.clone()))
        .load()
        .await;
    tracing::info!(
        region = ?aws_config.region(),
        bucket = %config.audio_bucket,
        "AWS configuration loaded"
    );
    let s3_client = Arc::new(aws_sdk_s3::Client::new(&aws_config));

    let pool = Arc::new(pool);
    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Shared record store (cache entries, rate counters, user settings)
    let record_store: Arc<dyn RecordStore> = Arc::new(PgRecordStore::new(pool.clone()));

    // 2. External collaborators
    let synthesis_repo: Arc<dyn SynthesisRepository> = Arc::new(ElevenLabsRepository::new(
        reqwest::Client::new(),
        config.elevenlabs_base_url.clone(),
        config.elevenlabs_api_key.clone(),
    ));
    let object_store: Arc<dyn ObjectStore> = Arc::new(S3ObjectStore::new(
        s3_client,
        config.audio_bucket.clone(),
    ));

    // 3. Services
    tracing::info!("Instantiating services...");
    let narration_service = Arc::new(NarrationService::new(
        record_store.clone(),
        synthesis_repo.clone(),
        object_store,
        NarrationSettings {
            lock_duration: Duration::from_secs(config.lock_duration_secs),
            retry_hint: Duration::from_millis(config.retry_hint_ms),
            signed_url_ttl: Duration::from_secs(config.signed_url_ttl_days * 24 * 60 * 60),
            rate_limit_window: Duration::from_secs(config.narration_rate_window_secs),
            rate_limit_max: config.narration_rate_limit,
            url_cache_enabled: config.url_cache_enabled,
        },
    ));
    let voice_service = Arc::new(VoiceService::new(
        record_store,
        synthesis_repo,
        VoiceCreateSettings {
            rate_limit_window: Duration::from_secs(config.voice_create_rate_window_secs),
            rate_limit_max: config.voice_create_rate_limit,
        },
    ));

    // 4. Controllers
    let narration_controller = Arc::new(
        narration_backend::controllers::NarrationController::new(narration_service),
    );
    let voice_controller = Arc::new(narration_backend::controllers::VoiceController::new(
        voice_service,
    ));

    // Start HTTP server with all routes
    start_http_server(pool, config, narration_controller, voice_controller).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "narration_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "narration_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
