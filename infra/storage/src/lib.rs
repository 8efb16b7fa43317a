//! Sandboxed file storage for whole-document snapshots.
//!
//! A [`Storage`] handle owns one root directory. Every path handed to it is resolved relative
//! to that root and rejected if it would escape it. Writes replace the target in one step:
//! the bytes land in a unique temporary sibling, are synced to disk, and are then renamed over
//! the target, so a crash never leaves a truncated document behind.
//!
//! Temporary files orphaned by an interrupted write are removed when the handle connects.
//!
//! # Example
//!
//! ```rust
//! use scholar_storage::{Storage, StorageError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), StorageError> {
//!     # let tmp = tempfile::tempdir().unwrap();
//!     # let root = tmp.path().join("data");
//!     let storage = Storage::builder().root(&root).create(true).connect().await?;
//!
//!     storage.write("records.json", br#"{"usuarios":{}}"#).await?;
//!     assert!(root.join("records.json").is_file());
//!
//!     let data = storage.read("records.json").await?;
//!     assert_eq!(data, br#"{"usuarios":{}}"#);
//!     Ok(())
//! }
//! ```

mod builder;
mod engine;
mod error;
mod maintenance;
mod security;

pub use builder::StorageBuilder;
pub use engine::Storage;
pub use error::{StorageError, StorageErrorExt};
