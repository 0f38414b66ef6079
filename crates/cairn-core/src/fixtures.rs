//! Test fixtures for Cairn development and testing.
//!
//! Pre-built identifiers, credentials and representations shared by tests
//! across the workspace.
//!
//! # Example
//!
//! ```
//! use cairn_core::fixtures;
//!
//! let strategy = fixtures::strategy();
//! assert!(strategy.supports(&fixtures::document()));
//! ```

use crate::patch::SemanticUpdate;
use crate::{
    CredentialSet, IdentifierStrategy, Patch, Representation, ResourceIdentifier, Term, Triple,
};
use std::collections::BTreeSet;

/// Root used by fixtures.
pub const BASE_URL: &str = "http://localhost:3000/";

/// Agent used by fixtures.
pub const ALICE: &str = "https://alice.example/profile#me";

/// Second agent used by fixtures.
pub const BOB: &str = "https://bob.example/profile#me";

/// Media type of N-Triples documents.
pub const NTRIPLES: &str = "application/n-triples";

/// Strategy rooted at [`BASE_URL`].
#[must_use]
pub fn strategy() -> IdentifierStrategy {
    IdentifierStrategy::new(BASE_URL)
}

/// The root container.
#[must_use]
pub fn root() -> ResourceIdentifier {
    ResourceIdentifier::new(BASE_URL)
}

/// Identifier of a path below [`BASE_URL`].
#[must_use]
pub fn id(path: &str) -> ResourceIdentifier {
    ResourceIdentifier::new(format!("{BASE_URL}{path}"))
}

/// `<BASE_URL>foo`, a document identifier.
#[must_use]
pub fn document() -> ResourceIdentifier {
    id("foo")
}

/// Credentials for [`ALICE`].
#[must_use]
pub fn alice() -> CredentialSet {
    CredentialSet::agent(ALICE)
}

/// Credentials for [`BOB`].
#[must_use]
pub fn bob() -> CredentialSet {
    CredentialSet::agent(BOB)
}

/// A plain-text document.
#[must_use]
pub fn text(body: &str) -> Representation {
    Representation::document("text/plain", body.to_owned())
}

/// A `(s, p, o)` triple of named nodes under `http://example.org/`.
#[must_use]
pub fn triple(s: &str, p: &str, o: &str) -> Triple {
    Triple::new(
        Term::named(format!("http://example.org/{s}")),
        Term::named(format!("http://example.org/{p}")),
        Term::named(format!("http://example.org/{o}")),
    )
}

/// A semantic update inserting `triples`.
#[must_use]
pub fn insert(triples: impl IntoIterator<Item = Triple>) -> Patch {
    Patch::SemanticUpdate(SemanticUpdate {
        deletions: BTreeSet::new(),
        insertions: triples.into_iter().collect(),
    })
}

/// An N-Triples document holding `triples`, one per line.
#[must_use]
pub fn ntriples(triples: &[Triple]) -> Representation {
    let mut body = String::new();
    for triple in triples {
        body.push_str(&triple.to_string());
        body.push('\n');
    }
    Representation::document(NTRIPLES, body)
}
