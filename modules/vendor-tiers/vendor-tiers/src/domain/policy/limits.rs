//! Per-tier caps on array-valued profile fields.

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;
use vendor_tiers_sdk::Tier;

use super::PolicyError;

pub const LOCATIONS: &str = "locations";
pub const MEDIA: &str = "media";
pub const PRODUCTS: &str = "products";

/// Flag marking the headquarters entry in a `locations` array.
pub const HQ_FLAG: &str = "isHQ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Capped(usize),
    Unbounded,
}

impl Limit {
    #[must_use]
    pub const fn allows(self, count: usize) -> bool {
        match self {
            Self::Capped(max) => count <= max,
            Self::Unbounded => true,
        }
    }

    #[must_use]
    pub const fn cap(self) -> Option<usize> {
        match self {
            Self::Capped(max) => Some(max),
            Self::Unbounded => None,
        }
    }
}

/// How a category is trimmed in a public projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Keep the first `max_allowed` entries.
    FirstN,
    /// Lowest tier shows only the headquarters entry, falling back to the
    /// first entry; `tier1` keeps the first `max_allowed`; higher tiers keep
    /// everything.
    HqPriority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitMode {
    /// Drop the excess silently.
    Truncate,
    /// Fail with [`LimitExceeded`].
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Tier {tier} allows maximum {max} {category}, but {actual} provided")]
pub struct LimitExceeded {
    pub category: String,
    pub tier: Tier,
    pub max: usize,
    pub actual: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayLimitRule {
    caps: [Limit; 4],
    projection: Projection,
}

impl ArrayLimitRule {
    /// # Errors
    ///
    /// Returns [`PolicyError::DecreasingLimit`] if a higher tier would be
    /// allowed fewer items than a lower one.
    pub fn new(
        category: &str,
        caps: [Limit; 4],
        projection: Projection,
    ) -> Result<Self, PolicyError> {
        let non_decreasing = caps.windows(2).all(|pair| match (pair[0], pair[1]) {
            (Limit::Capped(lower), Limit::Capped(higher)) => lower <= higher,
            (Limit::Capped(_) | Limit::Unbounded, Limit::Unbounded) => true,
            (Limit::Unbounded, Limit::Capped(_)) => false,
        });
        if !non_decreasing {
            return Err(PolicyError::DecreasingLimit {
                category: category.to_owned(),
            });
        }
        Ok(Self { caps, projection })
    }

    const fn unchecked(caps: [Limit; 4], projection: Projection) -> Self {
        Self { caps, projection }
    }

    #[must_use]
    pub fn max_allowed(&self, tier: Tier) -> Limit {
        self.caps[usize::from(tier.level())]
    }

    #[must_use]
    pub const fn projection(&self) -> Projection {
        self.projection
    }

    /// Trim `items` for public display at `tier`.
    #[must_use]
    pub fn project(&self, items: Vec<Value>, tier: Tier) -> Vec<Value> {
        match (self.projection, tier) {
            (Projection::HqPriority, Tier::Free) => headquarters_only(items),
            (Projection::HqPriority, Tier::Tier2 | Tier::Tier3) => items,
            (Projection::FirstN | Projection::HqPriority, _) => {
                truncate(items, self.max_allowed(tier))
            }
        }
    }
}

fn truncate<T>(mut items: Vec<T>, limit: Limit) -> Vec<T> {
    if let Limit::Capped(max) = limit {
        items.truncate(max);
    }
    items
}

#[must_use]
pub fn is_headquarters(entry: &Value) -> bool {
    entry.get(HQ_FLAG).and_then(Value::as_bool).unwrap_or(false)
}

/// The flagged entry, or the first entry promoted to headquarters.
fn headquarters_only(items: Vec<Value>) -> Vec<Value> {
    if let Some(hq) = items.iter().find(|entry| is_headquarters(entry)) {
        return vec![hq.clone()];
    }
    let Some(mut first) = items.into_iter().next() else {
        return Vec::new();
    };
    if let Value::Object(fields) = &mut first {
        fields.insert(HQ_FLAG.to_owned(), Value::Bool(true));
    }
    vec![first]
}

/// Category name -> rule. Categories without a rule are not capped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArrayLimitTable {
    rules: BTreeMap<String, ArrayLimitRule>,
}

impl ArrayLimitTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_rule(mut self, category: impl Into<String>, rule: ArrayLimitRule) -> Self {
        self.rules.insert(category.into(), rule);
        self
    }

    /// Locations 1/3/10, media 5/20/50, products 3/10/25; the top tier is
    /// unbounded everywhere.
    #[must_use]
    pub fn standard() -> Self {
        use Limit::{Capped, Unbounded};
        Self::new()
            .with_rule(
                LOCATIONS,
                ArrayLimitRule::unchecked(
                    [Capped(1), Capped(3), Capped(10), Unbounded],
                    Projection::HqPriority,
                ),
            )
            .with_rule(
                MEDIA,
                ArrayLimitRule::unchecked(
                    [Capped(5), Capped(20), Capped(50), Unbounded],
                    Projection::FirstN,
                ),
            )
            .with_rule(
                PRODUCTS,
                ArrayLimitRule::unchecked(
                    [Capped(3), Capped(10), Capped(25), Unbounded],
                    Projection::FirstN,
                ),
            )
    }

    #[must_use]
    pub fn rule(&self, category: &str) -> Option<&ArrayLimitRule> {
        self.rules.get(category)
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &ArrayLimitRule)> {
        self.rules.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    #[must_use]
    pub fn max_allowed(&self, category: &str, tier: Tier) -> Limit {
        self.rule(category)
            .map_or(Limit::Unbounded, |rule| rule.max_allowed(tier))
    }

    /// Apply the cap for `category` at `tier`.
    ///
    /// # Errors
    ///
    /// In [`LimitMode::Reject`], returns [`LimitExceeded`] when `items` is
    /// over the cap. [`LimitMode::Truncate`] never fails.
    pub fn enforce<T>(
        &self,
        items: Vec<T>,
        category: &str,
        tier: Tier,
        mode: LimitMode,
    ) -> Result<Vec<T>, LimitExceeded> {
        let limit = self.max_allowed(category, tier);
        match (mode, limit) {
            (_, Limit::Unbounded) => Ok(items),
            (LimitMode::Truncate, limit) => Ok(truncate(items, limit)),
            (LimitMode::Reject, Limit::Capped(max)) if items.len() > max => Err(LimitExceeded {
                category: category.to_owned(),
                tier,
                max,
                actual: items.len(),
            }),
            (LimitMode::Reject, Limit::Capped(_)) => Ok(items),
        }
    }
}
