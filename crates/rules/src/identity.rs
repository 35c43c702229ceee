//! Rules about what the current identity may do.
//!
//! The same checks run against a dashboard snapshot and against the user
//! record returned on creation, so both implement [`IdentityFacts`].

use tribute_protocol::{DashboardSnapshot, UserRecord};

use crate::RuleError;

/// The handful of identity facts the rules depend on.
pub trait IdentityFacts {
    fn is_verified(&self) -> bool;
    fn has_published_subscription(&self) -> bool;
    fn earned(&self) -> f64;
}

impl IdentityFacts for DashboardSnapshot {
    fn is_verified(&self) -> bool {
        self.is_verified
    }

    fn has_published_subscription(&self) -> bool {
        self.is_subscription_published
    }

    fn earned(&self) -> f64 {
        self.earnings
    }
}

impl IdentityFacts for UserRecord {
    fn is_verified(&self) -> bool {
        self.is_verified
    }

    fn has_published_subscription(&self) -> bool {
        self.is_sub_published
    }

    fn earned(&self) -> f64 {
        self.earned
    }
}

pub fn can_publish_subscription(identity: &impl IdentityFacts) -> bool {
    identity.is_verified() && !identity.has_published_subscription()
}

/// Like [`can_publish_subscription`] but names the failing precondition.
pub fn check_can_publish_subscription(identity: &impl IdentityFacts) -> Result<(), RuleError> {
    if !identity.is_verified() {
        return Err(RuleError::NotVerified);
    }
    if identity.has_published_subscription() {
        return Err(RuleError::SubscriptionAlreadyPublished);
    }
    Ok(())
}

pub fn can_set_up_payouts(identity: &impl IdentityFacts) -> bool {
    identity.is_verified() && identity.earned() > 0.0
}

pub fn check_can_set_up_payouts(identity: &impl IdentityFacts) -> Result<(), RuleError> {
    if can_set_up_payouts(identity) {
        Ok(())
    } else {
        Err(RuleError::PayoutsUnavailable)
    }
}

pub fn needs_verification(identity: &impl IdentityFacts) -> bool {
    !identity.is_verified()
}

pub fn can_receive_payments(identity: &impl IdentityFacts) -> bool {
    identity.is_verified()
}

/// What a screen may show given the latest dashboard, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardAccess {
    pub can_access: bool,
    pub needs_onboarding: bool,
    pub needs_verification: bool,
}

pub fn dashboard_access(dashboard: Option<&DashboardSnapshot>) -> DashboardAccess {
    match dashboard {
        Some(snapshot) => DashboardAccess {
            can_access: true,
            needs_onboarding: false,
            needs_verification: needs_verification(snapshot),
        },
        None => DashboardAccess {
            can_access: false,
            needs_onboarding: true,
            needs_verification: false,
        },
    }
}
