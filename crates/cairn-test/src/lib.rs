//! # Cairn Test
//!
//! Test doubles shared by the Cairn crates' integration tests.
//!
//! - [`RecordingStore`] - Forwards store calls and remembers them
//! - [`DelayedStore`] - Stalls after every read so concurrent writes can interleave
//! - [`RecordingHandler`] - A downstream [`OperationHandler`](cairn_core::OperationHandler) that captures operations
//! - [`FailingPatcher`] - Accepts every patch, applies none
//!
//! ## Example
//!
//! ```ignore
//! use cairn_test::{fixtures, RecordingStore};
//!
//! #[tokio::test]
//! async fn test_failed_patch_never_writes() {
//!     let memory: Arc<dyn ResourceStore> = Arc::new(InMemoryStore::new(fixtures::strategy()));
//!     let recording = Arc::new(RecordingStore::new(memory));
//!     let store = PatchingStore::new(recording.clone(), Arc::new(FailingPatcher::new()));
//!
//!     // ...
//!     assert_eq!(recording.count("set_representation"), 0);
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/cairn-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod delay;
mod handler;
mod patcher;
mod store;

pub use cairn_core::fixtures;
pub use delay::DelayedStore;
pub use handler::RecordingHandler;
pub use patcher::FailingPatcher;
pub use store::{RecordingStore, StoreCall};
