//! User types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique user identifier, issued by the external auth provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Create a new random user ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from a string
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// First eight hex characters of the hyphenated form.
    ///
    /// Used where an external system caps identifier length (payment receipts).
    pub fn short_prefix(&self) -> String {
        self.0.to_string().chars().take(8).collect()
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for UserId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_prefix() {
        let id = UserId::parse("0f8fad5b-d9cb-469f-a165-70867728950e").unwrap();
        assert_eq!(id.short_prefix(), "0f8fad5b");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(UserId::parse("not-a-uuid").is_err());
    }
}
