//! # Cairn
//!
//! **Pluggable resource storage with conditional writes, semantic patching
//! and staged authorization.**
//!
//! - **Composable stores** – [`ResourceStore`](store::ResourceStore) backends
//!   wrapped by locking, patching, validating and monitoring decorators
//! - **Optimistic concurrency** – every write takes optional
//!   [`Conditions`](core::Conditions), checked atomically with the write
//! - **Semantic patches** – read, patch, write as one step per identifier
//! - **Four-stage authorization** – credentials, modes, permissions, authorize
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cairn::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new()
//!         .with_dotenv()
//!         .with_optional_file("cairn.toml")?
//!         .with_env_prefix("CAIRN")
//!         .load()?;
//!     let _telemetry = cairn::telemetry::init_telemetry(config.telemetry.to_telemetry_config())?;
//!
//!     let server = ResourceServer::from_config(&config)?;
//!     let outcome = server
//!         .handle(ResourceRequest::new(Operation::read(server.strategy().root().clone())))
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ResourceRequest → Credentials → Modes → Permissions → Authorize
//!                                                           ↓
//!                  Monitoring → Locking → Patching → Validating → backend
//! ```

#![doc(html_root_url = "https://docs.rs/cairn/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod handler;
mod server;

pub use handler::StoreOperationHandler;
pub use server::ResourceServer;

// Re-export core types
pub use cairn_core as core;

// Re-export stores and patchers
pub use cairn_store as store;

// Re-export authorization stages
pub use cairn_authz as authz;

// Re-export configuration
pub use cairn_config as config;

// Re-export telemetry
pub use cairn_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use cairn::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{ResourceServer, StoreOperationHandler};

    pub use cairn_core::{
        AccessMode, BasicConditions, CairnError, CairnResult, Conditions, CredentialSet,
        ErrorCategory, ModeSet, Operation, OperationHandler, OperationKind, OperationOutcome,
        Patch, PermissionSet, Representation, RepresentationPreferences, ResourceIdentifier,
        ResourceRequest, Triple,
    };

    pub use cairn_store::{ForwardingStore, InMemoryStore, ResourceStore};

    pub use cairn_authz::{AuthorizingHandler, CredentialsExtractor, PermissionReader};

    pub use cairn_config::{CairnConfig, ConfigLoader};
}
