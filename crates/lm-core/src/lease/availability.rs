use serde::Serialize;

use crate::lease::LeaseStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeVariant {
    Default,
    Secondary,
    Destructive,
}

/// How a listing status is labelled for tenants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AvailabilityInfo {
    pub label: &'static str,
    pub variant: BadgeVariant,
    pub is_available: bool,
}

pub fn availability_info(status: LeaseStatus) -> AvailabilityInfo {
    match status {
        LeaseStatus::Available => AvailabilityInfo {
            label: "Available",
            variant: BadgeVariant::Default,
            is_available: true,
        },
        LeaseStatus::Unavailable => AvailabilityInfo {
            label: "In Use",
            variant: BadgeVariant::Destructive,
            is_available: false,
        },
        LeaseStatus::Archived => AvailabilityInfo {
            label: "Archived",
            variant: BadgeVariant::Secondary,
            is_available: false,
        },
    }
}

pub fn unavailable_message(status: LeaseStatus) -> Option<&'static str> {
    match status {
        LeaseStatus::Unavailable => {
            Some("This lease code is currently in use. Please try another available code.")
        }
        LeaseStatus::Archived => {
            Some("This lease code has been archived and is no longer available.")
        }
        LeaseStatus::Available => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_available_listings_accept_requests() {
        assert!(availability_info(LeaseStatus::Available).is_available);
        assert!(!availability_info(LeaseStatus::Unavailable).is_available);
        assert!(!availability_info(LeaseStatus::Archived).is_available);
        assert_eq!(availability_info(LeaseStatus::Unavailable).label, "In Use");
    }

    #[test]
    fn unavailable_message_only_for_blocked_statuses() {
        assert!(unavailable_message(LeaseStatus::Available).is_none());
        assert!(unavailable_message(LeaseStatus::Archived)
            .is_some_and(|m| m.contains("archived")));
    }
}
