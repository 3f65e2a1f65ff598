//! Property analysis across a collection of features.
//!
//! A single pass records one [`SemanticType`] per property key, resolves
//! conflicts through [`SemanticType::merge`] and emits column descriptors sorted
//! by key.

use std::collections::BTreeMap;

use geopq_geojson::FeatureRecord;

use crate::infer::{SemanticType, infer};

/// Inferred name, type and nullability of one property column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub semantic_type: SemanticType,
    pub nullable: bool,
}

impl ColumnDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, semantic_type: SemanticType) -> Self {
        Self {
            name: name.into(),
            semantic_type,
            nullable: true,
        }
    }
}

/// Accumulates per-key types over any number of features.
#[derive(Debug, Clone, Default)]
pub struct PropertyAnalyzer {
    types: BTreeMap<String, SemanticType>,
}

impl PropertyAnalyzer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every property of one feature.
    pub fn observe(&mut self, feature: &FeatureRecord) {
        let Some(properties) = feature.properties.as_ref() else {
            return;
        };

        for (key, value) in properties {
            let observed = infer(value);
            match self.types.get_mut(key) {
                Some(current) => {
                    let merged = current.merge(observed);
                    if merged != *current {
                        log::trace!("Property '{key}' changed type from {current} to {merged}");
                    }
                    *current = merged;
                },
                None => {
                    self.types.insert(key.clone(), observed);
                },
            }
        }
    }

    /// Fold another analyzer's observations into this one.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        for (key, observed) in other.types {
            self.types
                .entry(key)
                .and_modify(|current| *current = current.merge(observed))
                .or_insert(observed);
        }
        self
    }

    /// Number of distinct property keys observed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Column descriptors sorted by name, with null-only keys typed as strings.
    #[must_use]
    pub fn finish(self) -> Vec<ColumnDescriptor> {
        self.types
            .into_iter()
            .map(|(name, semantic_type)| ColumnDescriptor::new(name, semantic_type.resolved()))
            .collect()
    }
}

/// Infer column descriptors for all properties in `features`.
#[must_use]
pub fn analyze_properties(features: &[FeatureRecord]) -> Vec<ColumnDescriptor> {
    let mut analyzer = PropertyAnalyzer::new();
    for feature in features {
        analyzer.observe(feature);
    }
    log::debug!(
        "Analyzed {} features, found {} property keys",
        features.len(),
        analyzer.len()
    );
    analyzer.finish()
}
