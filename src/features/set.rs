//! Ordered record collections sharing one schema.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{FeatureRecord, Schema};
use crate::error::{Error, Result, ValueKind};

/// Observed `[min, max]` of one numeric attribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    /// Smallest observed value.
    pub min: f64,
    /// Largest observed value.
    pub max: f64,
}

impl NumericRange {
    /// Create a range.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `max - min`.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// True when min-max scaling would divide by zero.
    pub fn is_degenerate(&self) -> bool {
        !(self.span().is_finite() && self.span() > 0.0)
    }
}

/// An ordered collection of [`FeatureRecord`]s with a shared [`Schema`].
///
/// Every record's arrays match the schema; this is enforced on insertion.
/// Record order is insertion order and has no meaning for clustering.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    schema: Arc<Schema>,
    records: Vec<FeatureRecord>,
}

impl FeatureSet {
    /// Create an empty set over `schema`.
    pub fn new(schema: Schema) -> Result<Self> {
        schema.validate()?;
        Ok(Self::with_shared_schema(Arc::new(schema)))
    }

    /// Create an empty set sharing an existing schema.
    pub fn with_shared_schema(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            records: Vec::new(),
        }
    }

    /// Build a set from records, validating each one.
    pub fn from_records(schema: Schema, records: Vec<FeatureRecord>) -> Result<Self> {
        let mut set = Self::new(schema)?;
        set.records.reserve(records.len());
        for record in records {
            set.push(record)?;
        }
        Ok(set)
    }

    /// A one-record set, used as leaf payload.
    pub(crate) fn singleton(schema: Arc<Schema>, record: FeatureRecord) -> Self {
        Self {
            schema,
            records: vec![record],
        }
    }

    /// Union of several sets' records, in order. All sets share `schema`.
    pub(crate) fn union<'a>(
        schema: Arc<Schema>,
        sets: impl IntoIterator<Item = &'a FeatureSet>,
    ) -> Self {
        let records = sets
            .into_iter()
            .flat_map(|s| s.records.iter().cloned())
            .collect();
        Self { schema, records }
    }

    /// Append a record after checking it against the schema.
    ///
    /// The record weight must be finite and positive.
    pub fn push(&mut self, record: FeatureRecord) -> Result<()> {
        self.check(&record)?;
        self.records.push(record);
        Ok(())
    }

    fn check(&self, record: &FeatureRecord) -> Result<()> {
        if !(record.weight().is_finite() && record.weight() > 0.0) {
            return Err(Error::InvalidParameter {
                name: "weight",
                message: format!("record weight must be finite and positive, got {}", record.weight()),
            });
        }
        if record.numeric().len() != self.schema.numeric_len() {
            return Err(Error::SchemaMismatch {
                kind: ValueKind::Numeric,
                expected: self.schema.numeric_len(),
                found: record.numeric().len(),
            });
        }
        if record.categorical().len() != self.schema.categorical_len() {
            return Err(Error::SchemaMismatch {
                kind: ValueKind::Categorical,
                expected: self.schema.categorical_len(),
                found: record.categorical().len(),
            });
        }
        Ok(())
    }

    /// The shared schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub(crate) fn shared_schema(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[FeatureRecord] {
        &self.records
    }

    /// Record at `index`.
    pub fn get(&self, index: usize) -> Option<&FeatureRecord> {
        self.records.get(index)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the set holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Per-numeric-attribute `[min, max]` over the whole set.
    ///
    /// Missing values are skipped. An attribute with no observed values
    /// gets the degenerate range `[0, 0]`.
    pub fn numeric_ranges(&self) -> Vec<NumericRange> {
        (0..self.schema.numeric_len())
            .map(|i| {
                let mut range: Option<NumericRange> = None;
                for value in self.records.iter().map(|r| r.numeric()[i]) {
                    if value.is_nan() {
                        continue;
                    }
                    range = Some(match range {
                        None => NumericRange::new(value, value),
                        Some(r) => NumericRange::new(r.min.min(value), r.max.max(value)),
                    });
                }
                range.unwrap_or(NumericRange::new(0.0, 0.0))
            })
            .collect()
    }
}
