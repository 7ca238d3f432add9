use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::scalar::Scalar;

/// Flat attribute map of a listing or one of its related entities.
pub type Attributes = BTreeMap<String, Scalar>;

/// Read-only view of a listing that rules are evaluated against.
///
/// Built upstream from the stored listing record plus its related entities
/// (for example `cpu` and `gpu`). The engine never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingContext {
    /// Identifier used only for logging and reporting.
    #[serde(default)]
    pub listing_id: Option<String>,
    pub base_price_usd: Decimal,
    #[serde(default)]
    pub fields: Attributes,
    #[serde(default)]
    pub related: BTreeMap<String, Attributes>,
    /// Rulesets that must be skipped for this listing.
    #[serde(default)]
    pub excluded_rulesets: BTreeSet<String>,
}

impl ListingContext {
    pub fn new(base_price_usd: Decimal) -> Self {
        Self {
            listing_id: None,
            base_price_usd,
            fields: Attributes::new(),
            related: BTreeMap::new(),
            excluded_rulesets: BTreeSet::new(),
        }
    }

    pub fn builder(base_price_usd: Decimal) -> ListingContextBuilder {
        ListingContextBuilder {
            context: Self::new(base_price_usd),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Scalar> {
        self.fields.get(name)
    }

    pub fn related_entity(&self, name: &str) -> Option<&Attributes> {
        self.related.get(name)
    }

    pub fn is_excluded(&self, ruleset_id: &str) -> bool {
        self.excluded_rulesets.contains(ruleset_id)
    }

    /// Label used in log lines.
    pub fn label(&self) -> &str {
        self.listing_id.as_deref().unwrap_or("<unnamed>")
    }
}

/// Fluent builder for [`ListingContext`].
#[derive(Debug, Clone)]
pub struct ListingContextBuilder {
    context: ListingContext,
}

impl ListingContextBuilder {
    pub fn listing_id(mut self, id: impl Into<String>) -> Self {
        self.context.listing_id = Some(id.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.context.fields.insert(name.into(), value.into());
        self
    }

    pub fn related(
        mut self,
        entity: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<Scalar>,
    ) -> Self {
        self.context
            .related
            .entry(entity.into())
            .or_default()
            .insert(name.into(), value.into());
        self
    }

    pub fn exclude(mut self, ruleset_id: impl Into<String>) -> Self {
        self.context.excluded_rulesets.insert(ruleset_id.into());
        self
    }

    pub fn build(self) -> ListingContext {
        self.context
    }
}
