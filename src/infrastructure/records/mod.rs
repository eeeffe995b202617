pub mod memory;
pub mod pg;
pub mod store;

pub use memory::MemoryRecordStore;
pub use pg::PgRecordStore;
pub use store::{run_transaction, RecordStore, RecordStoreError, VersionedRecord};
