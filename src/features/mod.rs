//! Feature vectors for process models.
//!
//! Each process model is reduced to a [`FeatureRecord`]: an ordered array of
//! numeric metrics (node counts, path lengths, gateway counts, ...) and an
//! ordered array of categorical labels (activity names, model titles, ...).
//! Records are grouped into a [`FeatureSet`] that carries the shared
//! [`Schema`].
//!
//! ```text
//! Schema      numeric:     [nodes, gateways, max_path]
//!             categorical: [title]
//!
//! record 0    [12.0, 3.0, 7.0]   ["create account"]
//! record 1    [14.0, 2.0, 8.0]   ["delete account"]
//! ```
//!
//! Schema matching is checked once, when records enter a [`FeatureSet`].
//! Distance computations assume matching arrays and never re-check.

mod record;
mod set;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use record::{FeatureRecord, ModelRef};
pub use set::{FeatureSet, NumericRange};

/// Whether an attribute holds numbers or strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    /// Real-valued metric.
    Numeric,
    /// Free-text label.
    Categorical,
}

/// A named, weighted feature column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    name: String,
    weight: f64,
    kind: AttributeKind,
}

impl Attribute {
    /// Create an attribute with unit weight.
    pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            weight: 1.0,
            kind,
        }
    }

    /// Set the attribute weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Attribute name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Weight used by the distance metric.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Numeric or categorical.
    pub fn kind(&self) -> AttributeKind {
        self.kind
    }
}

/// Attribute layout shared by every record of a [`FeatureSet`].
///
/// Numeric and categorical attributes are kept in two ordered lists; record
/// value arrays are positional against them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    numeric: Vec<Attribute>,
    categorical: Vec<Attribute>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a numeric attribute.
    pub fn numeric(mut self, name: impl Into<String>, weight: f64) -> Self {
        self.numeric
            .push(Attribute::new(name, AttributeKind::Numeric).with_weight(weight));
        self
    }

    /// Append a categorical attribute.
    pub fn categorical(mut self, name: impl Into<String>, weight: f64) -> Self {
        self.categorical
            .push(Attribute::new(name, AttributeKind::Categorical).with_weight(weight));
        self
    }

    /// Check names are unique and weights usable.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for attr in self.attributes() {
            if !seen.insert(attr.name()) {
                return Err(Error::InvalidParameter {
                    name: "schema",
                    message: format!("duplicate attribute name '{}'", attr.name()),
                });
            }
            if !attr.weight().is_finite() || attr.weight() < 0.0 {
                return Err(Error::InvalidParameter {
                    name: "weight",
                    message: format!(
                        "attribute '{}' has weight {}, expected a finite non-negative value",
                        attr.name(),
                        attr.weight()
                    ),
                });
            }
        }
        Ok(())
    }

    /// Numeric attributes in value-array order.
    pub fn numeric_attributes(&self) -> &[Attribute] {
        &self.numeric
    }

    /// Categorical attributes in value-array order.
    pub fn categorical_attributes(&self) -> &[Attribute] {
        &self.categorical
    }

    /// Number of numeric attributes.
    pub fn numeric_len(&self) -> usize {
        self.numeric.len()
    }

    /// Number of categorical attributes.
    pub fn categorical_len(&self) -> usize {
        self.categorical.len()
    }

    /// All attributes, numeric first.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.numeric.iter().chain(self.categorical.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_order() {
        let schema = Schema::new()
            .numeric("nodes", 1.0)
            .categorical("title", 2.0)
            .numeric("gateways", 0.5);

        let names: Vec<&str> = schema.attributes().map(|a| a.name()).collect();
        assert_eq!(names, ["nodes", "gateways", "title"]);
        assert_eq!(schema.numeric_len(), 2);
        assert_eq!(schema.categorical_len(), 1);
        assert_eq!(schema.categorical_attributes()[0].weight(), 2.0);
    }

    #[test]
    fn test_schema_rejects_duplicate_names() {
        let schema = Schema::new().numeric("size", 1.0).categorical("size", 1.0);
        assert!(matches!(
            schema.validate(),
            Err(Error::InvalidParameter { name: "schema", .. })
        ));
    }

    #[test]
    fn test_schema_rejects_negative_weight() {
        let schema = Schema::new().numeric("size", -1.0);
        assert!(schema.validate().is_err());
    }
}
