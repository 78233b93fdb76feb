//! Caller profile and role models.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
}

impl UserProfile {
    /// Name shown in the auth badge.
    pub fn display_name(profile: Option<&UserProfile>) -> &str {
        match profile {
            Some(p) if !p.name.trim().is_empty() => &p.name,
            _ => "User",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
    Guest,
}
