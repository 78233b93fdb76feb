//! Identity types supplied by the identity provider.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Cache key derived from an identity's principal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub fn new(key: String) -> Self {
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for IdentityKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for IdentityKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Opaque credential handle of the signed-in user.
///
/// Only the principal text is observable; the signing material stays with
/// the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    principal: String,
}

impl Identity {
    pub fn new(principal: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
        }
    }

    pub fn principal_text(&self) -> &str {
        &self.principal
    }

    pub fn key(&self) -> IdentityKey {
        IdentityKey(self.principal.clone())
    }

    /// Shortened principal for badges, `abcde...xyz`.
    pub fn short_principal(&self) -> String {
        let chars: Vec<char> = self.principal.chars().collect();
        if chars.len() <= 8 {
            return self.principal.clone();
        }
        let head: String = chars[..5].iter().collect();
        let tail: String = chars[chars.len() - 3..].iter().collect();
        format!("{head}...{tail}")
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.principal)
    }
}

/// Login progress reported by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoginStatus {
    #[default]
    Idle,
    LoggingIn,
    LoggedIn,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_principal_keeps_head_and_tail() {
        let identity = Identity::new("rrkah-fqaaa-aaaaa-aaaaq-cai");
        assert_eq!(identity.short_principal(), "rrkah...cai");
    }

    #[test]
    fn short_principal_returns_short_text_unchanged() {
        let identity = Identity::new("2vxsx-fae");
        assert_eq!(identity.short_principal(), "2vxsx-fae");
        assert_eq!(Identity::new("aaaa").short_principal(), "aaaa");
    }

    #[test]
    fn key_uses_principal_text() {
        let identity = Identity::new("abc-def");
        assert_eq!(identity.key().as_str(), "abc-def");
        assert_eq!(identity.key(), IdentityKey::from("abc-def"));
    }

    #[test]
    fn login_status_serializes_kebab_case() {
        let json = serde_json::to_string(&LoginStatus::LoggingIn).unwrap();
        assert_eq!(json, "\"logging-in\"");
    }
}
