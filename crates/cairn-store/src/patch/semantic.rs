//! Semantic updates on N-Triples documents.

use super::{ntriples, PatcherInput, RepresentationPatcher};
use async_trait::async_trait;
use cairn_core::{
    attributes, CairnError, CairnResult, Patch, Representation, RepresentationMetadata,
};

/// Applies [`Patch::SemanticUpdate`] to `application/n-triples` documents.
///
/// Deletions are removed, then insertions are added. Every deletion must be
/// present in the current document. When the target does not exist yet the
/// update may only insert, and the result holds exactly its insertions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemanticUpdatePatcher;

impl SemanticUpdatePatcher {
    /// Creates the patcher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RepresentationPatcher for SemanticUpdatePatcher {
    async fn can_handle(&self, input: &PatcherInput) -> CairnResult<()> {
        if !matches!(input.patch, Patch::SemanticUpdate(_)) {
            return Err(CairnError::validation(format!(
                "only semantic updates are supported, got {}",
                input.patch.dialect()
            )));
        }
        if let Some(representation) = &input.representation {
            let content_type = representation.metadata.content_type();
            if content_type != Some(ntriples::CONTENT_TYPE) {
                return Err(CairnError::validation(format!(
                    "cannot apply a semantic update to '{}' with content type {}",
                    input.identifier,
                    content_type.unwrap_or("(none)")
                )));
            }
        }
        Ok(())
    }

    async fn handle(&self, input: PatcherInput) -> CairnResult<Representation> {
        self.can_handle(&input).await?;
        let Patch::SemanticUpdate(update) = input.patch else {
            return Err(CairnError::validation("not a semantic update"));
        };

        let (mut metadata, mut triples) = match input.representation {
            Some(representation) => {
                let document = std::str::from_utf8(&representation.data).map_err(|error| {
                    CairnError::validation(format!(
                        "'{}' is not valid UTF-8: {error}",
                        input.identifier
                    ))
                })?;
                (representation.metadata.clone(), ntriples::parse(document)?)
            }
            None => (RepresentationMetadata::new(), Default::default()),
        };

        let missing: Vec<String> = update
            .deletions()
            .iter()
            .filter(|triple| !triples.contains(*triple))
            .map(ToString::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(CairnError::conflict(format!(
                "cannot delete triples absent from '{}': {}",
                input.identifier,
                missing.join(" ")
            )));
        }

        for triple in update.deletions() {
            triples.remove(triple);
        }
        triples.extend(update.insertions().iter().cloned());

        metadata.strip_server_managed();
        metadata.set(attributes::CONTENT_TYPE, ntriples::CONTENT_TYPE);

        tracing::debug!(
            identifier = %input.identifier,
            deleted = update.deletions().len(),
            inserted = update.insertions().len(),
            "applied semantic update"
        );
        Ok(Representation::new(metadata, ntriples::serialize(&triples)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_core::fixtures::{self, triple};

    fn input(patch: Patch, representation: Option<Representation>) -> PatcherInput {
        PatcherInput {
            identifier: fixtures::document(),
            patch,
            representation,
        }
    }

    #[tokio::test]
    async fn test_absent_target_gets_exactly_insertions() {
        let inserted = triple("s", "p", "o");
        let result = SemanticUpdatePatcher
            .handle(input(fixtures::insert([inserted.clone()]), None))
            .await
            .unwrap();

        assert_eq!(result.metadata.content_type(), Some(ntriples::CONTENT_TYPE));
        let triples = ntriples::parse(result.text().unwrap()).unwrap();
        assert_eq!(triples.into_iter().collect::<Vec<_>>(), vec![inserted]);
    }

    #[tokio::test]
    async fn test_delete_and_insert() {
        let keep = triple("a", "p", "1");
        let removed = triple("b", "p", "2");
        let add = triple("c", "p", "3");
        let current = fixtures::ntriples(&[keep.clone(), removed.clone()]);

        let patch = Patch::semantic_update(vec![removed.clone()], vec![add.clone()]).unwrap();
        let result = SemanticUpdatePatcher
            .handle(input(patch, Some(current)))
            .await
            .unwrap();

        let triples = ntriples::parse(result.text().unwrap()).unwrap();
        assert!(triples.contains(&keep));
        assert!(triples.contains(&add));
        assert!(!triples.contains(&removed));
    }

    #[tokio::test]
    async fn test_missing_deletion_is_conflict() {
        let patch = Patch::semantic_update(vec![triple("x", "y", "z")], vec![]).unwrap();
        let err = SemanticUpdatePatcher
            .handle(input(patch.clone(), Some(fixtures::ntriples(&[]))))
            .await
            .unwrap_err();
        assert_eq!(err.category(), cairn_core::ErrorCategory::Conflict);

        let err = SemanticUpdatePatcher
            .handle(input(patch, None))
            .await
            .unwrap_err();
        assert_eq!(err.category(), cairn_core::ErrorCategory::Conflict);
    }

    #[tokio::test]
    async fn test_other_content_type_is_validation() {
        let err = SemanticUpdatePatcher
            .handle(input(
                fixtures::insert([triple("s", "p", "o")]),
                Some(fixtures::text("hello")),
            ))
            .await
            .unwrap_err();
        assert_eq!(err.category(), cairn_core::ErrorCategory::Validation);
    }

    #[tokio::test]
    async fn test_opaque_patch_is_not_handled() {
        let patcher = SemanticUpdatePatcher::new();
        let result = patcher
            .can_handle(&input(Patch::opaque("text/n3", "@prefix"), None))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_keeps_extension_metadata() {
        let mut current = fixtures::ntriples(&[]);
        current.metadata.set("author", "alice").set(attributes::REVISION, "4");
        let result = SemanticUpdatePatcher
            .handle(input(fixtures::insert([triple("s", "p", "o")]), Some(current)))
            .await
            .unwrap();
        assert_eq!(result.metadata.get("author"), Some("alice"));
        assert!(result.metadata.revision().is_none());
    }
}
