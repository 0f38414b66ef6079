//! Patch instructions.
//!
//! A [`Patch`] is a closed set of dialects. Only a
//! `RepresentationPatcher` interprets a patch; everything else forwards it
//! verbatim. Semantic updates are validated when they are constructed, so a
//! patcher never sees an ill-formed triple.

use crate::{CairnError, CairnResult};
use bytes::Bytes;
use std::collections::BTreeSet;
use std::fmt;

/// An RDF term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    /// An IRI.
    NamedNode(String),
    /// A blank node label.
    BlankNode(String),
    /// A literal value.
    Literal {
        /// Lexical form.
        value: String,
        /// Datatype IRI.
        datatype: Option<String>,
        /// Language tag.
        language: Option<String>,
    },
}

impl Term {
    /// Creates a named node.
    #[must_use]
    pub fn named(iri: impl Into<String>) -> Self {
        Self::NamedNode(iri.into())
    }

    /// Creates a blank node.
    #[must_use]
    pub fn blank(label: impl Into<String>) -> Self {
        Self::BlankNode(label.into())
    }

    /// Creates a plain string literal.
    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    /// Returns `true` for literals.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal { .. })
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::NamedNode(value) | Self::BlankNode(value) => value.is_empty(),
            Self::Literal { .. } => false,
        }
    }

    /// Rejects terms whose N-Triples form would not parse back to `self`.
    fn check_syntax(&self) -> Result<(), String> {
        match self {
            Self::NamedNode(iri) => check_iri(iri),
            Self::BlankNode(label) => {
                match label.chars().find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '_' | '-')) {
                    Some(c) => Err(format!("invalid character {c:?} in blank node label")),
                    None => Ok(()),
                }
            }
            Self::Literal {
                datatype, language, ..
            } => {
                if let Some(language) = language {
                    if datatype.is_some() {
                        return Err("literal has both a language tag and a datatype".to_string());
                    }
                    if language.is_empty()
                        || !language.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
                    {
                        return Err(format!("invalid language tag '{language}'"));
                    }
                }
                datatype.as_deref().map_or(Ok(()), check_iri)
            }
        }
    }
}

/// Characters N-Triples forbids inside `<...>`.
fn check_iri(iri: &str) -> Result<(), String> {
    match iri.chars().find(|c| {
        c.is_whitespace()
            || c.is_control()
            || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\')
    }) {
        Some(c) => Err(format!("invalid character {c:?} in IRI")),
        None => Ok(()),
    }
}

/// Writes the term in N-Triples syntax.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NamedNode(iri) => write!(f, "<{iri}>"),
            Self::BlankNode(label) => write!(f, "_:{label}"),
            Self::Literal {
                value,
                datatype,
                language,
            } => {
                f.write_str("\"")?;
                for c in value.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\r' => f.write_str("\\r")?,
                        '\t' => f.write_str("\\t")?,
                        other => write!(f, "{other}")?,
                    }
                }
                f.write_str("\"")?;
                if let Some(language) = language {
                    write!(f, "@{language}")
                } else if let Some(datatype) = datatype {
                    write!(f, "^^<{datatype}>")
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// A `(subject, predicate, object)` statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triple {
    /// Subject.
    pub subject: Term,
    /// Predicate.
    pub predicate: Term,
    /// Object.
    pub object: Term,
}

impl Triple {
    /// Creates a triple without validating it.
    #[must_use]
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// Checks that the triple is well-formed.
    pub fn validate(&self) -> CairnResult<()> {
        if self.subject.is_empty() || self.predicate.is_empty() || self.object.is_empty() {
            return Err(CairnError::validation(format!("empty term in triple {self}")));
        }
        if self.subject.is_literal() {
            return Err(CairnError::validation(format!(
                "literal subject in triple {self}"
            )));
        }
        if !matches!(self.predicate, Term::NamedNode(_)) {
            return Err(CairnError::validation(format!(
                "predicate must be a named node in triple {self}"
            )));
        }
        for term in [&self.subject, &self.predicate, &self.object] {
            term.check_syntax()
                .map_err(|reason| CairnError::validation(format!("{reason} in triple {self}")))?;
        }
        Ok(())
    }
}

/// Writes the triple as one N-Triples statement, without a newline.
impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

/// A validated set of deletions and insertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticUpdate {
    pub(crate) deletions: BTreeSet<Triple>,
    pub(crate) insertions: BTreeSet<Triple>,
}

impl SemanticUpdate {
    /// Triples to remove.
    #[must_use]
    pub fn deletions(&self) -> &BTreeSet<Triple> {
        &self.deletions
    }

    /// Triples to add.
    #[must_use]
    pub fn insertions(&self) -> &BTreeSet<Triple> {
        &self.insertions
    }

    /// Returns `true` if the update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deletions.is_empty() && self.insertions.is_empty()
    }
}

/// A patch instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch {
    /// Delete then insert triples.
    SemanticUpdate(SemanticUpdate),
    /// A dialect this crate does not model, forwarded as raw bytes.
    Opaque {
        /// Media type of the patch document.
        content_type: String,
        /// Patch document.
        data: Bytes,
    },
}

impl Patch {
    /// Builds a semantic update, rejecting malformed triples.
    ///
    /// # Example
    ///
    /// ```
    /// use cairn_core::{Patch, Term, Triple};
    ///
    /// let ok = Triple::new(Term::named("s"), Term::named("p"), Term::literal("o"));
    /// assert!(Patch::semantic_update(vec![], vec![ok]).is_ok());
    ///
    /// let bad = Triple::new(Term::literal("s"), Term::named("p"), Term::named("o"));
    /// assert!(Patch::semantic_update(vec![bad], vec![]).is_err());
    /// ```
    pub fn semantic_update(
        deletions: impl IntoIterator<Item = Triple>,
        insertions: impl IntoIterator<Item = Triple>,
    ) -> CairnResult<Self> {
        let deletions: BTreeSet<Triple> = deletions.into_iter().collect();
        let insertions: BTreeSet<Triple> = insertions.into_iter().collect();
        for triple in deletions.iter().chain(&insertions) {
            triple.validate()?;
        }
        Ok(Self::SemanticUpdate(SemanticUpdate {
            deletions,
            insertions,
        }))
    }

    /// Wraps an uninterpreted patch document.
    #[must_use]
    pub fn opaque(content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self::Opaque {
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Short name of the dialect, for logs.
    #[must_use]
    pub fn dialect(&self) -> &str {
        match self {
            Self::SemanticUpdate(_) => "semantic-update",
            Self::Opaque { content_type, .. } => content_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triple(s: &str, p: &str, o: &str) -> Triple {
        Triple::new(Term::named(s), Term::named(p), Term::literal(o))
    }

    #[test]
    fn test_literal_display_escapes() {
        let term = Term::literal("a \"quoted\"\nline");
        assert_eq!(term.to_string(), r#""a \"quoted\"\nline""#);
    }

    #[test]
    fn test_typed_and_tagged_literals() {
        let typed = Term::Literal {
            value: "1".into(),
            datatype: Some("http://www.w3.org/2001/XMLSchema#integer".into()),
            language: None,
        };
        let tagged = Term::Literal {
            value: "chat".into(),
            datatype: None,
            language: Some("fr".into()),
        };
        assert_eq!(
            typed.to_string(),
            "\"1\"^^<http://www.w3.org/2001/XMLSchema#integer>"
        );
        assert_eq!(tagged.to_string(), "\"chat\"@fr");
    }

    #[test]
    fn test_duplicate_triples_collapse() {
        let patch =
            Patch::semantic_update(vec![], vec![triple("s", "p", "o"), triple("s", "p", "o")])
                .unwrap();
        let Patch::SemanticUpdate(update) = patch else {
            panic!("expected semantic update");
        };
        assert_eq!(update.insertions().len(), 1);
    }

    #[test]
    fn test_predicate_must_be_named() {
        let bad = Triple::new(Term::named("s"), Term::blank("b0"), Term::named("o"));
        assert!(Patch::semantic_update(vec![], vec![bad]).is_err());
    }

    #[test]
    fn test_empty_iri_rejected() {
        let bad = Triple::new(Term::named(""), Term::named("p"), Term::named("o"));
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_unserializable_terms_rejected() {
        let iri_with_space = Triple::new(Term::named("http://e/s x"), Term::named("p"), Term::named("o"));
        let iri_with_bracket = Triple::new(Term::named("s"), Term::named("p"), Term::named("a>b"));
        let blank_with_dot = Triple::new(Term::blank("b.0"), Term::named("p"), Term::named("o"));
        let tagged_and_typed = Triple::new(
            Term::named("s"),
            Term::named("p"),
            Term::Literal {
                value: "x".into(),
                datatype: Some("http://e/t".into()),
                language: Some("en".into()),
            },
        );

        for bad in [iri_with_space, iri_with_bracket, blank_with_dot, tagged_and_typed] {
            assert!(Patch::semantic_update(vec![], vec![bad]).is_err());
        }
    }

    #[test]
    fn test_escaped_literals_are_accepted() {
        let triple = Triple::new(
            Term::blank("b_0-1"),
            Term::named("http://e/p"),
            Term::literal("spaces > and \"quotes\"\n"),
        );
        assert!(triple.validate().is_ok());
    }

    #[test]
    fn test_dialect_names() {
        assert_eq!(
            Patch::opaque("text/n3", "x").dialect(),
            "text/n3"
        );
        assert_eq!(
            Patch::semantic_update(vec![], vec![]).unwrap().dialect(),
            "semantic-update"
        );
    }
}
