//! The patch protocol.
//!
//! - [`RepresentationPatcher`] - Computes a new representation from a patch
//! - [`WaterfallPatcher`] - Picks the first patcher that supports a patch
//! - [`SemanticUpdatePatcher`] - Triple deletions and insertions on N-Triples
//! - [`PatchHandler`] - Reads, patches and commits against a store

mod handler;
pub mod ntriples;
mod patcher;
mod semantic;
mod waterfall;

pub use handler::PatchHandler;
pub use patcher::{PatcherInput, RepresentationPatcher};
pub use semantic::SemanticUpdatePatcher;
pub use waterfall::WaterfallPatcher;
