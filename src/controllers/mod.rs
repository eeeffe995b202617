pub mod health;
pub mod narration;
pub mod voice;

pub use narration::NarrationController;
pub use voice::VoiceController;
