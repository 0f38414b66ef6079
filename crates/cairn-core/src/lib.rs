//! # Cairn Core
//!
//! Core types and traits for the Cairn resource server.
//!
//! This crate provides the data model shared by every other Cairn crate:
//!
//! - [`ResourceIdentifier`] / [`IdentifierStrategy`] - Addressing and the container hierarchy
//! - [`Representation`] / [`RepresentationMetadata`] - Content plus multi-valued attributes
//! - [`Conditions`] / [`BasicConditions`] - Optimistic-concurrency preconditions
//! - [`Patch`] - Closed set of patch dialects
//! - [`CredentialSet`], [`ModeSet`], [`PermissionSet`] - Authorization inputs and outputs
//! - [`Operation`] / [`OperationHandler`] - The unit of work and its executor
//! - [`CairnError`] - Standard error types

#![doc(html_root_url = "https://docs.rs/cairn-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod conditions;
mod credentials;
mod error;
pub mod fixtures;
mod handler;
mod identifier;
pub mod metadata;
mod operation;
mod patch;
mod permissions;
mod representation;

pub use conditions::{BasicConditions, Conditions, ANY_TOKEN};
pub use credentials::{Credential, CredentialSet};
pub use error::{CairnError, CairnResult, ErrorCategory, ErrorDetail, ErrorEnvelope};
pub use handler::OperationHandler;
pub use identifier::{IdentifierStrategy, ResourceIdentifier};
pub use metadata::{attributes, RepresentationMetadata};
pub use operation::{Operation, OperationKind, OperationOutcome, RequestId, ResourceRequest};
pub use patch::{Patch, SemanticUpdate, Term, Triple};
pub use permissions::{AccessMode, ModeSet, PermissionSet};
pub use representation::{Representation, RepresentationPreferences};
