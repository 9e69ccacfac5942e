//! Tier -> vendor profile field accessibility.
//!
//! Authored as per-tier additions; the cumulative sets are folded once at
//! construction so every higher tier inherits the fields below it.

use std::collections::BTreeSet;

use vendor_tiers_sdk::Tier;

use super::PolicyError;

/// Profile fields each tier adds on top of the tier below it.
pub const STANDARD_FIELD_ADDITIONS: [&[&str]; 4] = [
    &[
        "companyName",
        "slug",
        "description",
        "logo",
        "contactEmail",
        "contactPhone",
        "published",
        "featured",
        "partner",
    ],
    &[
        "website",
        "linkedinUrl",
        "twitterUrl",
        "foundedYear",
        "certifications",
        "awards",
        "totalProjects",
        "employeeCount",
        "linkedinFollowers",
        "instagramFollowers",
        "clientSatisfactionScore",
        "repeatClientPercentage",
        "videoUrl",
        "videoThumbnail",
        "videoDuration",
        "videoTitle",
        "videoDescription",
        "caseStudies",
        "innovationHighlights",
        "teamMembers",
        "yachtProjects",
        "longDescription",
        "serviceAreas",
        "companyValues",
    ],
    &[
        "locations",
        "featuredInCategory",
        "advancedAnalytics",
        "apiAccess",
        "customDomain",
    ],
    &["promotionPack", "editorialContent"],
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAccessTable {
    cumulative: [BTreeSet<String>; 4],
}

impl FieldAccessTable {
    /// Build a table from per-tier additions, lowest tier first.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::DuplicateField`] if a field is listed more than
    /// once across the additions.
    pub fn from_additions(additions: [&[&str]; 4]) -> Result<Self, PolicyError> {
        let mut seen = BTreeSet::new();
        for field in additions.iter().flat_map(|fields| fields.iter()) {
            if !seen.insert(*field) {
                return Err(PolicyError::DuplicateField {
                    field: (*field).to_owned(),
                });
            }
        }
        Ok(Self::fold(additions))
    }

    #[must_use]
    pub fn standard() -> Self {
        Self::fold(STANDARD_FIELD_ADDITIONS)
    }

    fn fold(additions: [&[&str]; 4]) -> Self {
        let mut running = BTreeSet::new();
        let cumulative = additions.map(|fields| {
            running.extend(fields.iter().map(|f| (*f).to_owned()));
            running.clone()
        });
        Self { cumulative }
    }

    /// Every field the tier may read or write.
    #[must_use]
    pub fn accessible_fields(&self, tier: Tier) -> &BTreeSet<String> {
        &self.cumulative[usize::from(tier.level())]
    }

    #[must_use]
    pub fn is_field_accessible(&self, tier: Tier, field: &str) -> bool {
        self.accessible_fields(tier).contains(field)
    }

    /// Lowest tier that unlocks `field`, if any does.
    #[must_use]
    pub fn unlocking_tier(&self, field: &str) -> Option<Tier> {
        Tier::ALL
            .into_iter()
            .find(|tier| self.is_field_accessible(*tier, field))
    }

    /// Fields `current` can access that `target` cannot.
    #[must_use]
    pub fn lost_between(&self, current: Tier, target: Tier) -> Vec<&str> {
        self.accessible_fields(current)
            .difference(self.accessible_fields(target))
            .map(String::as_str)
            .collect()
    }
}

impl Default for FieldAccessTable {
    fn default() -> Self {
        Self::standard()
    }
}
