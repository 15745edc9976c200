pub mod error;
pub mod models;
pub mod parser;
pub mod settings;
pub mod store;
pub mod sync;
pub mod utils;

// Re-export the main types for easier access
pub use error::{DecodeError, DocumentError, FetchError, SyncError};
pub use models::{Group, GroupId, Profile, ProfileId, ProfileKind, ProxyBean};
pub use parser::{explode, normalize};
pub use settings::Settings;
pub use store::{MemoryStore, ProfileStore};
pub use sync::{RawUpdater, SyncSummary};
