use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

use super::coordinator::{ClaimOutcome, EntryMetadata, NarrationCoordinator};
use super::dto::{GenerateNarrationRequest, NarrationOutcome};
use super::error::NarrationServiceError;
use super::fingerprint::{fingerprint, sanitize_component, text_digest};
use super::language::NarrationLang;
use crate::domain::admission::{Admission, RateLimiter};
use crate::infrastructure::records::{RecordStore, RecordStoreError};
use crate::infrastructure::repositories::{ObjectStore, SynthesisRepository, VoiceSettings};

const MAX_PAGE_INDEX: i64 = 500;
const MAX_TEXT_CHARS: usize = 1000;
/// Anything smaller than this is not plausible audio, whatever the provider
/// claims (from observed provider error bodies served with a 200).
const MIN_PLAUSIBLE_AUDIO_BYTES: usize = 200;
const RATE_LIMIT_ACTION: &str = "generate_narration";

/// Which keyspace a generation call works in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrationScope {
    /// Content-addressed and deduplicated across all callers. This is the
    /// variant that needs the coordination protocol.
    Shared,
    /// Namespaced by caller identity; same code path, no cross-caller
    /// contention in practice.
    PerUser,
}

/// Tunables injected from config.
#[derive(Debug, Clone)]
pub struct NarrationSettings {
    pub lock_duration: Duration,
    pub retry_hint: Duration,
    pub signed_url_ttl: Duration,
    pub rate_limit_window: Duration,
    pub rate_limit_max: u32,
    pub url_cache_enabled: bool,
}

pub struct NarrationService {
    coordinator: NarrationCoordinator,
    limiter: RateLimiter,
    synthesis_repo: Arc<dyn SynthesisRepository>,
    object_store: Arc<dyn ObjectStore>,
    settings: NarrationSettings,
    url_cache: Option<Cache<String, String>>,
}

impl NarrationService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        synthesis_repo: Arc<dyn SynthesisRepository>,
        object_store: Arc<dyn ObjectStore>,
        settings: NarrationSettings,
    ) -> Self {
        let coordinator = NarrationCoordinator::new(
            store.clone(),
            settings.lock_duration,
            settings.retry_hint,
        );
        let limiter = RateLimiter::new(store);

        // Minted links expire, so the in-process cache must roll over well
        // before the signed-URL TTL does
        let url_cache = if settings.url_cache_enabled {
            Some(
                Cache::builder()
                    .max_capacity(1000)
                    .time_to_live(Duration::from_secs(30 * 60))
                    .build(),
            )
        } else {
            None
        };

        Self {
            coordinator,
            limiter,
            synthesis_repo,
            object_store,
            settings,
            url_cache,
        }
    }
}

#[async_trait]
pub trait NarrationServiceApi: Send + Sync {
    /// Turn one story page into narrated audio, or point the caller at audio
    /// that already exists or is being produced.
    ///
    /// This operation:
    /// - Validates input and admits the caller through the rate limiter,
    ///   before any cache mutation or external call
    /// - Claims the cache entry for the request fingerprint; at most one
    ///   caller per fingerprint performs the paid provider call
    /// - On a granted claim, synthesizes, stores the audio, publishes the
    ///   result and returns a signed link
    async fn generate(
        &self,
        user_id: &str,
        scope: NarrationScope,
        request: GenerateNarrationRequest,
    ) -> Result<NarrationOutcome, NarrationServiceError>;
}

#[async_trait]
impl NarrationServiceApi for NarrationService {
    async fn generate(
        &self,
        user_id: &str,
        scope: NarrationScope,
        request: GenerateNarrationRequest,
    ) -> Result<NarrationOutcome, NarrationServiceError> {
        // 1. Validate before touching anything shared
        let valid = validate(request)?;

        tracing::info!(
            user_id = %user_id,
            story_id = %valid.story_id,
            page_index = valid.page_index,
            lang = %valid.lang,
            scope = ?scope,
            text_length = valid.text.len(),
            "Narration generate request"
        );

        // 2. Admission check, also before any cache mutation
        match self
            .limiter
            .admit(
                user_id,
                RATE_LIMIT_ACTION,
                self.settings.rate_limit_window,
                self.settings.rate_limit_max,
            )
            .await?
        {
            Admission::Allowed => {}
            Admission::Rejected { retry_after_ms } => {
                return Err(NarrationServiceError::RateLimited(format!(
                    "Too many narration requests, retry in {}ms",
                    retry_after_ms
                )));
            }
        }

        // 3. Derive the cache identity
        let fp = fingerprint(
            &valid.voice_id,
            &valid.story_id,
            valid.page_index,
            valid.lang.as_str(),
            &valid.text,
        );
        let cache_key = cache_key(scope, user_id, &fp);

        // 4. Fast path: a link we minted recently for this key
        if let Some(cache) = &self.url_cache {
            if let Some(audio_url) = cache.get(&cache_key).await {
                tracing::debug!(cache_key = %cache_key, "Signed URL served from memory");
                return Ok(NarrationOutcome::Ready {
                    audio_url,
                    cached: true,
                });
            }
        }

        // 5. Claim the entry; the transaction decides who does the work
        let metadata = EntryMetadata {
            voice_id: valid.voice_id.clone(),
            story_id: valid.story_id.clone(),
            page_index: valid.page_index,
            lang: valid.lang.as_str().to_string(),
            text_digest: text_digest(&valid.text),
        };

        match self.coordinator.claim(&cache_key, &metadata).await? {
            ClaimOutcome::Ready { result_location } => {
                let audio_url = self.mint_url(&cache_key, &result_location).await?;
                Ok(NarrationOutcome::Ready {
                    audio_url,
                    cached: true,
                })
            }
            ClaimOutcome::Wait { retry_hint_ms } => Ok(NarrationOutcome::Generating {
                retry_after_ms: retry_hint_ms,
            }),
            ClaimOutcome::Granted => self.perform_generation(&cache_key, scope, user_id, &valid).await,
        }
    }
}

impl NarrationService {
    /// The expensive part, run strictly outside the claim transaction.
    /// Any failure is published into the entry first, so the key never stays
    /// locked and the failure itself is recorded.
    async fn perform_generation(
        &self,
        cache_key: &str,
        scope: NarrationScope,
        user_id: &str,
        valid: &ValidNarrationRequest,
    ) -> Result<NarrationOutcome, NarrationServiceError> {
        let audio = match self
            .synthesis_repo
            .synthesize(&valid.voice_id, &valid.text, &valid.voice_settings)
            .await
        {
            Ok(audio) => audio,
            Err(detail) => {
                self.record_failure(cache_key, &detail).await;
                return Err(NarrationServiceError::Provider(detail));
            }
        };

        if audio.len() < MIN_PLAUSIBLE_AUDIO_BYTES {
            let detail = format!(
                "implausibly small audio payload from provider ({} bytes)",
                audio.len()
            );
            self.record_failure(cache_key, &detail).await;
            return Err(NarrationServiceError::Provider(detail));
        }

        let path = storage_path(scope, user_id, valid, cache_key);
        if let Err(detail) = self.object_store.put(&path, audio, "audio/mpeg").await {
            self.record_failure(cache_key, &detail).await;
            return Err(NarrationServiceError::Dependency(detail));
        }

        self.coordinator.publish_success(cache_key, &path).await?;

        tracing::info!(
            cache_key = %cache_key,
            path = %path,
            "Narration generated and published"
        );

        let audio_url = self.mint_url(cache_key, &path).await?;
        Ok(NarrationOutcome::Ready {
            audio_url,
            cached: false,
        })
    }

    async fn mint_url(
        &self,
        cache_key: &str,
        result_location: &str,
    ) -> Result<String, NarrationServiceError> {
        let audio_url = self
            .object_store
            .signed_read_url(result_location, self.settings.signed_url_ttl)
            .await
            .map_err(NarrationServiceError::Dependency)?;

        if let Some(cache) = &self.url_cache {
            cache
                .insert(cache_key.to_string(), audio_url.clone())
                .await;
        }

        Ok(audio_url)
    }

    async fn record_failure(&self, cache_key: &str, detail: &str) {
        // Best effort: lock expiry is the backstop if this write fails too
        if let Err(err) = self.coordinator.publish_failure(cache_key, detail).await {
            tracing::warn!(
                cache_key = %cache_key,
                error = %err,
                "Failed to record generation failure into cache entry"
            );
        }
    }
}

impl From<RecordStoreError> for NarrationServiceError {
    fn from(err: RecordStoreError) -> Self {
        match err {
            RecordStoreError::TransactionConflict(key) => {
                NarrationServiceError::Conflict(format!("Contended record: {}", key))
            }
            RecordStoreError::Backend(msg) => NarrationServiceError::Dependency(msg),
        }
    }
}

#[derive(Debug)]
struct ValidNarrationRequest {
    story_id: String,
    page_index: u32,
    lang: NarrationLang,
    text: String,
    voice_id: String,
    voice_settings: VoiceSettings,
}

fn validate(
    request: GenerateNarrationRequest,
) -> Result<ValidNarrationRequest, NarrationServiceError> {
    let story_id = request.story_id.trim().to_string();
    if story_id.is_empty() {
        return Err(NarrationServiceError::Invalid("Invalid storyId".to_string()));
    }

    if request.page_index < 0 || request.page_index > MAX_PAGE_INDEX {
        return Err(NarrationServiceError::Invalid(format!(
            "Invalid pageIndex (must be 0-{})",
            MAX_PAGE_INDEX
        )));
    }

    let lang = NarrationLang::parse(&request.lang).ok_or_else(|| {
        NarrationServiceError::Invalid("Invalid lang (must be 'en' or 'te')".to_string())
    })?;

    let voice_id = request.voice_id.trim().to_string();
    if voice_id.len() < 3 {
        return Err(NarrationServiceError::Invalid("Invalid voiceId".to_string()));
    }

    let text = request.text.trim().to_string();
    if text.is_empty() {
        return Err(NarrationServiceError::Invalid("Empty text".to_string()));
    }
    if text.chars().count() > MAX_TEXT_CHARS {
        return Err(NarrationServiceError::TooLong(format!(
            "Text too long (max {} chars)",
            MAX_TEXT_CHARS
        )));
    }

    Ok(ValidNarrationRequest {
        story_id,
        page_index: request.page_index as u32,
        lang,
        text,
        voice_id,
        voice_settings: VoiceSettings {
            stability: request.stability,
            similarity_boost: request.similarity_boost,
        },
    })
}

fn cache_key(scope: NarrationScope, user_id: &str, fp: &str) -> String {
    match scope {
        NarrationScope::Shared => format!("narration:{}", fp),
        NarrationScope::PerUser => {
            format!("narration:{}:{}", sanitize_component(user_id), fp)
        }
    }
}

fn storage_path(
    scope: NarrationScope,
    user_id: &str,
    valid: &ValidNarrationRequest,
    cache_key: &str,
) -> String {
    match scope {
        // Content-addressed: the fingerprint is the whole identity
        NarrationScope::Shared => {
            let fp = cache_key.trim_start_matches("narration:");
            format!("narrations/shared/{}.mp3", fp)
        }
        NarrationScope::PerUser => format!(
            "users/{}/narrations/{}/page_{}_{}.mp3",
            sanitize_component(user_id),
            sanitize_component(&valid.story_id),
            valid.page_index,
            valid.lang
        ),
    }
}
