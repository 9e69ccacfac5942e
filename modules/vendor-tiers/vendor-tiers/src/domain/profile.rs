//! Tier rules applied to vendor profile payloads.
//!
//! Writes go through [`filter_fields_by_tier`] and [`check_array_limits`]
//! and fail loudly. Reads go through [`project_public_profile`] and degrade
//! silently: restricted fields are dropped and arrays are trimmed.

use serde_json::Value;
use vendor_tiers_sdk::{ProfilePayload, Tier, ValidationIssue};

use super::error::DomainError;
use super::policy::limits::{LOCATIONS, is_headquarters};
use super::policy::{LimitMode, TierPolicy};

/// Keys every public projection keeps regardless of tier.
pub const ALWAYS_PUBLIC_FIELDS: [&str; 5] = ["id", "tier", "slug", "createdAt", "updatedAt"];

/// Pass `payload` through if every key is accessible at `tier`.
///
/// Admins bypass the check entirely.
///
/// # Errors
///
/// [`DomainError::TierRestricted`] naming every inaccessible key.
pub fn filter_fields_by_tier(
    policy: &TierPolicy,
    payload: ProfilePayload,
    tier: Tier,
    is_admin: bool,
) -> Result<ProfilePayload, DomainError> {
    if is_admin {
        return Ok(payload);
    }

    let restricted: Vec<String> = payload
        .keys()
        .filter(|key| !policy.fields.is_field_accessible(tier, key))
        .cloned()
        .collect();

    if restricted.is_empty() {
        Ok(payload)
    } else {
        Err(DomainError::TierRestricted {
            tier,
            fields: restricted,
        })
    }
}

/// Copy of `payload` without the keys `tier` cannot access.
#[must_use]
pub fn sanitize_for_tier(
    policy: &TierPolicy,
    payload: &ProfilePayload,
    tier: Tier,
) -> ProfilePayload {
    payload
        .iter()
        .filter(|(key, _)| policy.fields.is_field_accessible(tier, key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Array categories in `payload` that exceed their cap at `tier`.
#[must_use]
pub fn check_array_limits(
    policy: &TierPolicy,
    payload: &ProfilePayload,
    tier: Tier,
) -> Vec<ValidationIssue> {
    policy
        .limits
        .categories()
        .filter_map(|(category, _)| {
            let items = payload.get(category)?.as_array()?;
            policy
                .limits
                .enforce(items.iter().collect(), category, tier, LimitMode::Reject)
                .err()
                .map(|exceeded| ValidationIssue::new(category, exceeded.to_string()))
        })
        .collect()
}

/// At most one `locations` entry may be flagged as headquarters.
#[must_use]
pub fn check_single_headquarters(payload: &ProfilePayload) -> Option<ValidationIssue> {
    let flagged = payload
        .get(LOCATIONS)?
        .as_array()?
        .iter()
        .filter(|entry| is_headquarters(entry))
        .count();
    (flagged > 1).then(|| {
        ValidationIssue::new(
            LOCATIONS,
            format!("Only one location can be marked as headquarters, found {flagged}"),
        )
    })
}

/// Public view of a stored profile, keyed by the profile's own `tier`.
#[must_use]
pub fn project_public_profile(policy: &TierPolicy, profile: &ProfilePayload) -> ProfilePayload {
    let tier = Tier::resolve(profile.get("tier").and_then(Value::as_str));
    let mut projected = ProfilePayload::new();

    for (key, value) in profile {
        if ALWAYS_PUBLIC_FIELDS.contains(&key.as_str()) {
            projected.insert(key.clone(), value.clone());
            continue;
        }
        if let Some(rule) = policy.limits.rule(key) {
            if let Value::Array(items) = value {
                projected.insert(key.clone(), Value::Array(rule.project(items.clone(), tier)));
            }
            continue;
        }
        if policy.fields.is_field_accessible(tier, key) {
            projected.insert(key.clone(), value.clone());
        }
    }

    projected
}

/// What moving from `current` to `target` would take away from `profile`.
///
/// Advisory only. Empty strings, arrays and objects do not count as data.
#[must_use]
pub fn downgrade_conflicts(
    policy: &TierPolicy,
    current: Tier,
    target: Tier,
    profile: &ProfilePayload,
) -> Vec<String> {
    if target >= current {
        return Vec::new();
    }

    let mut conflicts: Vec<String> = policy
        .fields
        .lost_between(current, target)
        .into_iter()
        .filter(|field| profile.get(*field).is_some_and(has_data))
        .map(|field| {
            let required = policy.fields.unlocking_tier(field).unwrap_or(current);
            format!("Cannot downgrade: vendor has data in {field} which requires {required}")
        })
        .collect();

    for (category, rule) in policy.limits.categories() {
        let Some(count) = profile.get(category).and_then(Value::as_array).map(Vec::len) else {
            continue;
        };
        let limit = rule.max_allowed(target);
        if let Some(max) = limit.cap()
            && !limit.allows(count)
        {
            conflicts.push(format!(
                "Tier {target} allows maximum {max} {category}, but {count} provided"
            ));
        }
    }

    conflicts
}

fn has_data(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}
