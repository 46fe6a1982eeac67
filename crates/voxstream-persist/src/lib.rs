pub mod compat;
pub mod error;
pub mod format;
pub mod load;
pub mod save;
pub mod store;

pub use error::PersistError;
pub use format::{DeltaEntry, DeltaHeader};
pub use load::{apply_delta, decode_delta};
pub use save::encode_delta;
pub use store::DeltaStore;
