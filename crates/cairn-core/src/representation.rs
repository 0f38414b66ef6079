//! Representations and read preferences.

use crate::metadata::{attributes, RepresentationMetadata};
use bytes::Bytes;

/// A resource's content plus its metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Representation {
    /// Attributes describing `data`.
    pub metadata: RepresentationMetadata,
    /// The payload.
    pub data: Bytes,
}

impl Representation {
    /// Creates a representation from metadata and data.
    #[must_use]
    pub fn new(metadata: RepresentationMetadata, data: impl Into<Bytes>) -> Self {
        Self {
            metadata,
            data: data.into(),
        }
    }

    /// Creates a document representation with the given content type.
    #[must_use]
    pub fn document(content_type: &str, data: impl Into<Bytes>) -> Self {
        Self::new(RepresentationMetadata::with_content_type(content_type), data)
    }

    /// Creates an empty container representation.
    #[must_use]
    pub fn container() -> Self {
        let mut metadata = RepresentationMetadata::new();
        metadata.set(attributes::RESOURCE_TYPE, attributes::CONTAINER);
        Self::new(metadata, Bytes::new())
    }

    /// Sets the `slug` attribute, the preferred name when created inside a container.
    #[must_use]
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.metadata.set(attributes::SLUG, slug);
        self
    }

    /// Returns the data as UTF-8 text, if it is valid UTF-8.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}

/// Caller preferences for the shape of a returned representation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepresentationPreferences {
    /// Acceptable media types, most preferred first. Empty accepts anything.
    pub accept: Vec<String>,
}

impl RepresentationPreferences {
    /// Preferences accepting any media type.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Preferences accepting a single media type.
    #[must_use]
    pub fn accept(media_type: impl Into<String>) -> Self {
        Self {
            accept: vec![media_type.into()],
        }
    }
}
