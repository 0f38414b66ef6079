//! Preconditions for optimistic concurrency.
//!
//! A store evaluates [`Conditions`] against the current state of the target
//! in the same atomic step as the mutation. `None` means the target does not
//! exist.

use crate::metadata::{attributes, RepresentationMetadata};
use chrono::{DateTime, Utc};
use std::fmt::Debug;

/// A precondition predicate over the current state of a resource.
pub trait Conditions: Debug + Send + Sync {
    /// Returns `true` if the request may proceed given `metadata`
    /// (`None` when the resource is absent).
    fn matches_metadata(&self, metadata: Option<&RepresentationMetadata>) -> bool;
}

/// Wildcard token matching any existing resource.
pub const ANY_TOKEN: &str = "*";

/// HTTP-style conditions: entity tags plus timestamps.
///
/// # Example
///
/// ```
/// use cairn_core::{BasicConditions, Conditions, RepresentationMetadata};
///
/// let mut current = RepresentationMetadata::new();
/// current.set("revision", "4");
///
/// assert!(BasicConditions::if_match("4").matches_metadata(Some(&current)));
/// assert!(!BasicConditions::if_match("3").matches_metadata(Some(&current)));
/// assert!(!BasicConditions::must_not_exist().matches_metadata(Some(&current)));
/// assert!(BasicConditions::must_not_exist().matches_metadata(None));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicConditions {
    /// If-Match tokens; `*` matches any existing resource.
    pub match_tokens: Vec<String>,
    /// If-None-Match tokens; `*` matches any existing resource.
    pub not_match_tokens: Vec<String>,
    /// If-Modified-Since.
    pub modified_since: Option<DateTime<Utc>>,
    /// If-Unmodified-Since.
    pub unmodified_since: Option<DateTime<Utc>>,
}

impl BasicConditions {
    /// Requires the current revision to equal `token`.
    #[must_use]
    pub fn if_match(token: impl Into<String>) -> Self {
        Self {
            match_tokens: vec![token.into()],
            ..Self::default()
        }
    }

    /// Requires the current revision to differ from `token`.
    #[must_use]
    pub fn if_none_match(token: impl Into<String>) -> Self {
        Self {
            not_match_tokens: vec![token.into()],
            ..Self::default()
        }
    }

    /// Requires the resource to exist.
    #[must_use]
    pub fn must_exist() -> Self {
        Self::if_match(ANY_TOKEN)
    }

    /// Requires the resource to be absent.
    #[must_use]
    pub fn must_not_exist() -> Self {
        Self::if_none_match(ANY_TOKEN)
    }

    /// Requires a modification after `since`.
    #[must_use]
    pub fn with_modified_since(mut self, since: DateTime<Utc>) -> Self {
        self.modified_since = Some(since);
        self
    }

    /// Requires no modification after `since`.
    #[must_use]
    pub fn with_unmodified_since(mut self, since: DateTime<Utc>) -> Self {
        self.unmodified_since = Some(since);
        self
    }

    fn token_matches(tokens: &[String], revision: Option<&str>) -> bool {
        tokens
            .iter()
            .any(|token| token == ANY_TOKEN || Some(token.as_str()) == revision)
    }
}

impl Conditions for BasicConditions {
    fn matches_metadata(&self, metadata: Option<&RepresentationMetadata>) -> bool {
        let Some(metadata) = metadata else {
            // Only If-Match can fail on an absent resource.
            return self.match_tokens.is_empty();
        };
        let revision = metadata.revision();

        if !self.match_tokens.is_empty() && !Self::token_matches(&self.match_tokens, revision) {
            return false;
        }
        if Self::token_matches(&self.not_match_tokens, revision) {
            return false;
        }

        // Unparseable timestamps are ignored, as with HTTP dates.
        let modified = metadata
            .get(attributes::MODIFIED)
            .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
            .map(|value| value.with_timezone(&Utc));
        if let Some(modified) = modified {
            if self.modified_since.is_some_and(|since| modified <= since) {
                return false;
            }
            if self.unmodified_since.is_some_and(|since| modified > since) {
                return false;
            }
        }
        true
    }
}
