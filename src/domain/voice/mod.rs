pub mod dto;
pub mod service;

pub use dto::{CreateVoiceRequest, CreateVoiceResponse};
pub use service::{VoiceCreateSettings, VoiceService, VoiceServiceApi};
