//! Users as seen by the blog: an id and a unique username.

use serde::{Deserialize, Serialize};

use yatube_core::{DomainError, DomainResult, Entity, UserId, ValueObject};

const MAX_USERNAME_LEN: usize = 150;

/// Unique login name of a user.
///
/// Letters, digits and `@ . + - _`, at most 150 characters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    pub fn parse(raw: impl Into<String>) -> DomainResult<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("username", crate::BLANK));
        }
        if trimmed.chars().count() > MAX_USERNAME_LEN {
            return Err(DomainError::validation(
                "username",
                format!("Ensure this field has no more than {MAX_USERNAME_LEN} characters."),
            ));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
        {
            return Err(DomainError::validation(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Username {}

impl core::fmt::Display for Username {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Username {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl PartialEq<str> for Username {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: Username,
}

impl Entity for User {
    type Id = UserId;
    const KIND: &'static str = "user";

    fn id(&self) -> UserId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_django_style_usernames() {
        for ok in ["alice", "bob.smith", "c+d@e", "under_score-1"] {
            assert_eq!(Username::parse(ok).unwrap().as_str(), ok);
        }
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(Username::parse("  alice ").unwrap(), *"alice");
    }

    #[test]
    fn rejects_blank_and_invalid_characters() {
        assert!(Username::parse("   ").is_err());
        assert!(Username::parse("al ice").is_err());
        assert!(Username::parse("semi;colon").is_err());
        assert!(Username::parse("x".repeat(151)).is_err());
    }

    #[test]
    fn deserialization_validates() {
        assert!(serde_json::from_str::<Username>("\"ok_name\"").is_ok());
        assert!(serde_json::from_str::<Username>("\"bad name\"").is_err());
    }
}
