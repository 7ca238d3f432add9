use serde::{Deserialize, Serialize};

use crate::context::ListingContext;
use crate::scalar::Scalar;

/// Field name used to look up a listing attribute, optionally prefixed with
/// a related entity (`cpu.cores`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Resolves the field against the listing.
    ///
    /// The name is split on its first `.`; when the prefix names a related
    /// entity the remainder is looked up inside that entity, otherwise the
    /// whole name is looked up on the listing itself. Only one level of
    /// related-entity traversal is performed.
    pub fn resolve<'a>(&self, context: &'a ListingContext) -> Option<&'a Scalar> {
        if let Some((entity, rest)) = self.0.split_once('.') {
            if let Some(attributes) = context.related_entity(entity) {
                return attributes.get(rest);
            }
        }
        context.field(&self.0)
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FieldPath {
    fn from(value: &str) -> Self {
        FieldPath::new(value)
    }
}

impl From<String> for FieldPath {
    fn from(value: String) -> Self {
        FieldPath::new(value)
    }
}

/// Looks up `field_name` on the listing, see [`FieldPath::resolve`].
pub fn resolve<'a>(context: &'a ListingContext, field_name: &str) -> Option<&'a Scalar> {
    FieldPath::from(field_name).resolve(context)
}
