use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use narration_backend::infrastructure::repositories::{
    ObjectStore, SynthesisRepository, VoiceSettings,
};

pub const MOCK_VOICE_ID: &str = "test-voice-1";

/// Scriptable stand-in for the paid synthesis provider.
pub struct MockSynthesis {
    pub calls: AtomicUsize,
    pub fail_times: AtomicUsize,
    pub delay: Duration,
    pub payload_size: usize,
}

impl Default for MockSynthesis {
    fn default() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_times: AtomicUsize::new(0),
            delay: Duration::ZERO,
            payload_size: 4096,
        }
    }
}

impl MockSynthesis {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SynthesisRepository for MockSynthesis {
    async fn synthesize(
        &self,
        _voice_id: &str,
        _text: &str,
        _settings: &VoiceSettings,
    ) -> Result<Vec<u8>, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail_times.load(Ordering::SeqCst) > 0 {
            self.fail_times.fetch_sub(1, Ordering::SeqCst);
            return Err("provider 500".to_string());
        }
        Ok(vec![0u8; self.payload_size])
    }

    async fn create_voice(
        &self,
        _name: &str,
        _audio: Vec<u8>,
        _mime_type: &str,
    ) -> Result<String, String> {
        if self.fail_times.load(Ordering::SeqCst) > 0 {
            self.fail_times.fetch_sub(1, Ordering::SeqCst);
            return Err("provider 500".to_string());
        }
        Ok(MOCK_VOICE_ID.to_string())
    }
}

/// In-memory object store minting deterministic fake signed links.
#[derive(Default)]
pub struct MockObjectStore {
    pub blobs: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn put(&self, path: &str, bytes: Vec<u8>, _content_type: &str) -> Result<(), String> {
        self.blobs
            .lock()
            .map_err(|_| "mock store poisoned".to_string())?
            .insert(path.to_string(), bytes);
        Ok(())
    }

    async fn signed_read_url(&self, path: &str, _ttl: Duration) -> Result<String, String> {
        Ok(format!("https://signed.test/{}", path))
    }
}
