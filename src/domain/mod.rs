pub mod admission;
pub mod narration;
pub mod voice;
