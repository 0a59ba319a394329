pub mod http;
pub mod snapshot;

pub use http::{parse_search_response, HttpRetrieverStore};
pub use snapshot::SnapshotStore;
