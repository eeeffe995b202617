pub mod elevenlabs_repository;
pub mod object_store;
pub mod s3_object_store;
pub mod synthesis_repository;

pub use elevenlabs_repository::ElevenLabsRepository;
pub use object_store::ObjectStore;
pub use s3_object_store::S3ObjectStore;
pub use synthesis_repository::{SynthesisRepository, VoiceSettings};
