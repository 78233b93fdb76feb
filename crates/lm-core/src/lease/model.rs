use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Listing status as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaseStatus {
    #[serde(alias = "active")]
    Available,
    Unavailable,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseListing {
    /// Lease code, usually a UUID.
    pub id: String,
    pub status: LeaseStatus,
    /// Principal text of the listing owner.
    pub owner: String,
    pub area: u64,
    pub capacity: u64,
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

/// Owner decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestDecision {
    Accepted,
    Rejected,
}

impl From<RequestDecision> for RequestStatus {
    fn from(decision: RequestDecision) -> Self {
        match decision {
            RequestDecision::Accepted => RequestStatus::Accepted,
            RequestDecision::Rejected => RequestStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseRequest {
    pub id: String,
    pub status: RequestStatus,
    pub listing_id: String,
    pub info: String,
    /// Principal text of the requesting tenant.
    pub tenant: String,
    /// Nanoseconds since the Unix epoch.
    pub request_date: i64,
}

impl LeaseRequest {
    pub fn requested_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.request_date)
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_accepts_backend_active_status() {
        let listing: LeaseListing = serde_json::from_str(
            r#"{"id":"1234-abcd","status":"active","owner":"aaaaa-aa","area":40,"capacity":3,"location":"Lisbon"}"#,
        )
        .unwrap();
        assert_eq!(listing.status, LeaseStatus::Available);
        assert_eq!(listing.capacity, 3);
    }

    #[test]
    fn request_uses_camel_case_and_nanosecond_dates() {
        let request: LeaseRequest = serde_json::from_str(
            r#"{"id":"r1","status":"pending","listingId":"l1","info":"hi","tenant":"bbbbb-bb","requestDate":1700000000000000000}"#,
        )
        .unwrap();
        assert!(request.is_pending());
        assert_eq!(request.listing_id, "l1");
        assert_eq!(request.requested_at().timestamp(), 1_700_000_000);
    }

    #[test]
    fn decision_maps_to_status() {
        assert_eq!(RequestStatus::from(RequestDecision::Accepted), RequestStatus::Accepted);
        assert_eq!(RequestStatus::from(RequestDecision::Rejected), RequestStatus::Rejected);
    }
}
