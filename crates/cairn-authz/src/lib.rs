//! # Cairn Authz
//!
//! Authorization for Cairn as four substitutable stages:
//!
//! | Stage | Trait | Implementations |
//! |-------|-------|-----------------|
//! | Credentials | [`CredentialsExtractor`] | [`HeaderCredentialsExtractor`], [`UnionCredentialsExtractor`] |
//! | Modes | [`ModesExtractor`] | [`MethodModesExtractor`] |
//! | Permissions | [`PermissionReader`] | [`StaticPermissionReader`], [`AclPermissionReader`] |
//! | Authorize | [`Authorizer`] | [`PermissionBasedAuthorizer`] |
//!
//! [`AuthorizingHandler`] runs them in order and forwards granted operations
//! to the next [`OperationHandler`](cairn_core::OperationHandler).

#![doc(html_root_url = "https://docs.rs/cairn-authz/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod authorizer;
pub mod credentials;
mod modes;
mod permissions;
mod pipeline;

pub use authorizer::{Authorizer, PermissionBasedAuthorizer};
pub use credentials::{CredentialsExtractor, HeaderCredentialsExtractor, UnionCredentialsExtractor};
pub use modes::{MethodModesExtractor, ModesExtractor};
pub use permissions::{
    AccessRule, AclPermissionReader, AgentMatcher, PermissionReader, StaticPermissionReader,
};
pub use pipeline::{AuthorizingHandler, AuthorizingHandlerBuilder, Stage};
