//! Static tier policy: field accessibility, array caps and feature gates.
//!
//! The tables are configuration. Every rule in the module reads them through
//! [`TierPolicy`] so tiers and fields can be adjusted in one place.

pub mod features;
pub mod fields;
pub mod limits;

use thiserror::Error;

pub use features::FeatureTable;
pub use fields::FieldAccessTable;
pub use limits::{ArrayLimitRule, ArrayLimitTable, Limit, LimitExceeded, LimitMode, Projection};

/// Raised when a policy table is constructed from inconsistent input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("field '{field}' is assigned to more than one tier")]
    DuplicateField { field: String },

    #[error("array limit for '{category}' decreases at a higher tier")]
    DecreasingLimit { category: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierPolicy {
    pub fields: FieldAccessTable,
    pub limits: ArrayLimitTable,
    pub features: FeatureTable,
}

impl TierPolicy {
    #[must_use]
    pub const fn new(
        fields: FieldAccessTable,
        limits: ArrayLimitTable,
        features: FeatureTable,
    ) -> Self {
        Self {
            fields,
            limits,
            features,
        }
    }

    #[must_use]
    pub fn standard() -> Self {
        Self::new(
            FieldAccessTable::standard(),
            ArrayLimitTable::standard(),
            FeatureTable::standard(),
        )
    }
}

impl Default for TierPolicy {
    fn default() -> Self {
        Self::standard()
    }
}
