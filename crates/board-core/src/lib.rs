pub mod document;
pub mod embed;
pub mod error;
pub mod id;
pub mod model;
pub mod store;
pub mod viewport;

pub use document::{BoardDocument, BoardRecord, ExportFile, export_document, parse_document};
pub use error::DocumentError;
pub use id::{EdgeId, NodeId};
pub use model::*;
pub use store::{
    Channel, EdgeChange, GraphStore, NodeChange, Snapshot, StoreEvent, SubscriptionId, UiState,
};
pub use viewport::{ViewTransform, Viewport, min_zoom};
