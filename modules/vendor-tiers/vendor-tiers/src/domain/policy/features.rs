//! Capability gates for coarse features.

use std::collections::BTreeMap;

use vendor_tiers_sdk::Tier;

pub const MULTIPLE_LOCATIONS: &str = "multipleLocations";
pub const MEDIA_GALLERY: &str = "media-gallery";
pub const ENHANCED_PROFILE: &str = "enhancedProfile";
pub const ADVANCED_ANALYTICS: &str = "advancedAnalytics";
pub const API_ACCESS: &str = "apiAccess";
pub const CUSTOM_DOMAIN: &str = "customDomain";
pub const EXCEL_IMPORT: &str = "excel-import";
pub const PRODUCT_MANAGEMENT: &str = "productManagement";
pub const PROMOTION_PACK: &str = "promotionPack";
pub const EDITORIAL_CONTENT: &str = "editorialContent";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureTable {
    required: BTreeMap<String, Tier>,
}

impl FeatureTable {
    pub fn new<'a>(entries: impl IntoIterator<Item = (&'a str, Tier)>) -> Self {
        Self {
            required: entries
                .into_iter()
                .map(|(feature, tier)| (feature.to_owned(), tier))
                .collect(),
        }
    }

    #[must_use]
    pub fn standard() -> Self {
        Self::new([
            (MULTIPLE_LOCATIONS, Tier::Tier1),
            (MEDIA_GALLERY, Tier::Tier1),
            (ENHANCED_PROFILE, Tier::Tier1),
            (ADVANCED_ANALYTICS, Tier::Tier2),
            (API_ACCESS, Tier::Tier2),
            (CUSTOM_DOMAIN, Tier::Tier2),
            (EXCEL_IMPORT, Tier::Tier2),
            (PRODUCT_MANAGEMENT, Tier::Tier2),
            (PROMOTION_PACK, Tier::Tier3),
            (EDITORIAL_CONTENT, Tier::Tier3),
        ])
    }

    /// Unknown features are never accessible.
    #[must_use]
    pub fn can_access(&self, tier: Tier, feature: &str) -> bool {
        self.upgrade_path(feature)
            .is_some_and(|required| tier.meets_or_exceeds(required))
    }

    /// Minimum tier unlocking `feature`.
    #[must_use]
    pub fn upgrade_path(&self, feature: &str) -> Option<Tier> {
        self.required.get(feature).copied()
    }

    /// Every feature available at `tier`.
    #[must_use]
    pub fn features_for(&self, tier: Tier) -> Vec<&str> {
        self.required
            .iter()
            .filter(|(_, required)| tier.meets_or_exceeds(**required))
            .map(|(feature, _)| feature.as_str())
            .collect()
    }
}
