//! # Cairn Store
//!
//! The [`ResourceStore`] abstraction and its building blocks.
//!
//! A store is assembled by stacking decorators over a backend:
//!
//! ```text
//! MonitoringStore
//!   └─ LockingStore
//!        └─ PatchingStore
//!             └─ ValidatingStore
//!                  └─ InMemoryStore
//! ```
//!
//! Each decorator implements [`ForwardingStore`], overriding only the
//! operations it changes; everything else reaches the next store unmodified.
//!
//! - [`InMemoryStore`] - Hierarchical container/document backend
//! - [`ValidatingStore`] - Rejects malformed representations
//! - [`PatchingStore`] - Implements `modify_resource` via [`patch::PatchHandler`]
//! - [`LockingStore`] - Per-identifier read/write locks
//! - [`MonitoringStore`] - Tracing and Prometheus metrics

#![doc(html_root_url = "https://docs.rs/cairn-store/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod forwarding;
mod locking;
mod memory;
mod monitoring;
pub mod patch;
mod patching;
mod store;
mod validating;

pub use forwarding::{ForwardingStore, PassthroughStore};
pub use locking::LockingStore;
pub use memory::InMemoryStore;
pub use monitoring::MonitoringStore;
pub use patch::{
    PatchHandler, PatcherInput, RepresentationPatcher, SemanticUpdatePatcher, WaterfallPatcher,
};
pub use patching::PatchingStore;
pub use store::ResourceStore;
pub use validating::ValidatingStore;
