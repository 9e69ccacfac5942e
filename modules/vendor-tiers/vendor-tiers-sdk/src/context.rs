//! Caller identity as resolved by the authorization layer.
//!
//! The module trusts this context: role resolution and vendor ownership checks
//! happen before any client method is invoked.

use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Admin { user_id: Uuid },
    Vendor { user_id: Uuid, vendor_id: Uuid },
}

/// Per-call context passed to every [`crate::VendorTiersClientV1`] method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    actor: Actor,
    client_key: String,
}

impl RequestContext {
    #[must_use]
    pub fn new(actor: Actor) -> Self {
        Self {
            actor,
            client_key: String::new(),
        }
    }

    #[must_use]
    pub fn admin(user_id: Uuid) -> Self {
        Self::new(Actor::Admin { user_id })
    }

    #[must_use]
    pub fn vendor(user_id: Uuid, vendor_id: Uuid) -> Self {
        Self::new(Actor::Vendor { user_id, vendor_id })
    }

    /// Attach the caller's network identity (usually the client IP).
    #[must_use]
    pub fn with_client_key(mut self, key: impl Into<String>) -> Self {
        self.client_key = key.into();
        self
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.actor, Actor::Admin { .. })
    }

    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        match self.actor {
            Actor::Admin { user_id } | Actor::Vendor { user_id, .. } => user_id,
        }
    }

    /// Vendor the caller acts for; `None` for admins.
    #[must_use]
    pub const fn vendor_id(&self) -> Option<Uuid> {
        match self.actor {
            Actor::Admin { .. } => None,
            Actor::Vendor { vendor_id, .. } => Some(vendor_id),
        }
    }

    #[must_use]
    pub fn client_key(&self) -> &str {
        &self.client_key
    }
}
