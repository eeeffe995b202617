pub mod coordinator;
pub mod dto;
pub mod error;
pub mod fingerprint;
pub mod language;
pub mod service;

pub use coordinator::{CacheEntry, ClaimOutcome, EntryMetadata, EntryStatus, NarrationCoordinator};
pub use dto::{GenerateNarrationRequest, NarrationOutcome};
pub use error::NarrationServiceError;
pub use language::NarrationLang;
pub use service::{NarrationScope, NarrationService, NarrationServiceApi, NarrationSettings};
