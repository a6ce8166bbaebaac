//! Listing moderation: who enters the review queue, and what an admin decision
//! does to a listing.

use serde::{Deserialize, Serialize};

use crate::models::property::ListingStatus;
use crate::models::user::UserRole;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "Pending",
            ApprovalStatus::Approved => "Approved",
            ApprovalStatus::Rejected => "Rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Pending" => Some(ApprovalStatus::Pending),
            "Approved" => Some(ApprovalStatus::Approved),
            "Rejected" => Some(ApprovalStatus::Rejected),
            _ => None,
        }
    }
}

/// Per-entity-kind submission policy. Gated kinds queue ordinary users' listings
/// for review; trusted roles skip the queue. Ungated kinds go live immediately
/// for everyone allowed to create them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModerationPolicy {
    gated: bool,
}

impl ModerationPolicy {
    pub const PROPERTIES: ModerationPolicy = ModerationPolicy { gated: true };
    pub const BLOG_POSTS: ModerationPolicy = ModerationPolicy { gated: true };
    // Development creation routes are admin/agent-only.
    pub const DEVELOPMENTS: ModerationPolicy = ModerationPolicy { gated: false };

    pub fn initial_approval(&self, submitter: UserRole) -> ApprovalStatus {
        if !self.gated {
            return ApprovalStatus::Approved;
        }
        match submitter {
            UserRole::Admin | UserRole::Agent => ApprovalStatus::Approved,
            UserRole::User => ApprovalStatus::Pending,
        }
    }
}

/// Outcome of an admin review on a property: the new approval state plus the
/// listing-status side effect, if any.
///
/// Rejection always parks the listing as a draft. Approval promotes a listing
/// that was waiting (or parked) to `For Sale`; listings already live keep
/// whatever status they had. Any state may be re-reviewed at will.
pub fn review_property(
    decision: ApprovalStatus,
    current: ListingStatus,
) -> (ApprovalStatus, Option<ListingStatus>) {
    let status_change = match decision {
        ApprovalStatus::Rejected => Some(ListingStatus::Draft),
        ApprovalStatus::Approved => match current {
            ListingStatus::PendingApproval | ListingStatus::Draft => Some(ListingStatus::ForSale),
            _ => None,
        },
        ApprovalStatus::Pending => None,
    };
    (decision, status_change)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinary_users_queue_on_gated_kinds() {
        assert_eq!(
            ModerationPolicy::PROPERTIES.initial_approval(UserRole::User),
            ApprovalStatus::Pending
        );
        assert_eq!(
            ModerationPolicy::BLOG_POSTS.initial_approval(UserRole::User),
            ApprovalStatus::Pending
        );
    }

    #[test]
    fn trusted_roles_skip_the_queue() {
        assert_eq!(
            ModerationPolicy::PROPERTIES.initial_approval(UserRole::Agent),
            ApprovalStatus::Approved
        );
        assert_eq!(
            ModerationPolicy::BLOG_POSTS.initial_approval(UserRole::Admin),
            ApprovalStatus::Approved
        );
    }

    #[test]
    fn ungated_kinds_approve_everyone() {
        for role in [UserRole::User, UserRole::Agent, UserRole::Admin] {
            assert_eq!(
                ModerationPolicy::DEVELOPMENTS.initial_approval(role),
                ApprovalStatus::Approved
            );
        }
    }

    #[test]
    fn rejection_forces_draft_from_any_status() {
        for current in [
            ListingStatus::ForSale,
            ListingStatus::ForRent,
            ListingStatus::Sold,
            ListingStatus::PendingApproval,
            ListingStatus::Draft,
        ] {
            let (approval, status) = review_property(ApprovalStatus::Rejected, current);
            assert_eq!(approval, ApprovalStatus::Rejected);
            assert_eq!(status, Some(ListingStatus::Draft));
        }
    }

    #[test]
    fn approval_promotes_waiting_listings_to_for_sale() {
        let (_, status) = review_property(ApprovalStatus::Approved, ListingStatus::PendingApproval);
        assert_eq!(status, Some(ListingStatus::ForSale));

        let (_, status) = review_property(ApprovalStatus::Approved, ListingStatus::Draft);
        assert_eq!(status, Some(ListingStatus::ForSale));
    }

    #[test]
    fn approval_leaves_live_listings_alone() {
        for current in [ListingStatus::ForSale, ListingStatus::ForRent, ListingStatus::Sold] {
            let (_, status) = review_property(ApprovalStatus::Approved, current);
            assert_eq!(status, None);
        }
    }

    #[test]
    fn re_review_back_to_pending_is_allowed() {
        let (approval, status) = review_property(ApprovalStatus::Pending, ListingStatus::ForSale);
        assert_eq!(approval, ApprovalStatus::Pending);
        assert_eq!(status, None);
    }

    #[test]
    fn approval_status_wire_values() {
        assert_eq!(ApprovalStatus::parse("Approved"), Some(ApprovalStatus::Approved));
        assert_eq!(ApprovalStatus::parse("approved"), None);
        assert_eq!(ApprovalStatus::Rejected.as_str(), "Rejected");
    }
}
