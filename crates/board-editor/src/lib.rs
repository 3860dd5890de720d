pub mod clipboard;
pub mod clock;
pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod input;
pub mod records;
pub mod shortcuts;
pub mod sync;
pub mod tools;

pub use clock::{Clock, ManualClock, SystemClock};
pub use commands::History;
pub use config::EditorConfig;
pub use editor::{BoardEditor, InlineEditor, InteractionPolicy, NodeView, PanBinding};
pub use error::StorageError;
pub use records::{FileRecordStore, MemoryRecordStore, RecordStore};
pub use sync::{PersistenceSync, SaveReason};
