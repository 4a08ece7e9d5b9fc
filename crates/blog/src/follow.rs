//! Follow relationships between users.

use serde::{Deserialize, Serialize};

use yatube_core::{DomainError, DomainResult, Entity, FieldErrors, FollowId};

use crate::Username;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
    pub id: FollowId,
    /// The follower.
    pub user: Username,
    pub following: Username,
}

impl Follow {
    /// Case-insensitive substring match of `term` on either username.
    pub fn matches_term(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.user.as_str().to_lowercase().contains(&term)
            || self.following.as_str().to_lowercase().contains(&term)
    }
}

impl Entity for Follow {
    type Id = FollowId;
    const KIND: &'static str = "follow";

    fn id(&self) -> FollowId {
        self.id
    }
}

/// Client-writable follow fields. The follower always comes from the identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FollowInput {
    #[serde(default)]
    pub following: Option<String>,
}

impl FollowInput {
    /// Validate the target and pair it with `user`.
    ///
    /// Whether the target user exists and whether the pair is already
    /// present are store questions, checked by the caller.
    pub fn into_new_follow(self, user: Username) -> DomainResult<NewFollow> {
        let raw = match self.following {
            Some(raw) if !raw.trim().is_empty() => raw,
            Some(_) => return Err(DomainError::validation("following", crate::BLANK)),
            None => return Err(DomainError::validation("following", crate::REQUIRED)),
        };
        let following = Username::parse(raw).map_err(|_| {
            DomainError::Validation(FieldErrors::single(
                "following",
                "Object with username does not exist.",
            ))
        })?;
        if following == user {
            return Err(DomainError::validation("following", "You cannot follow yourself."));
        }
        Ok(NewFollow { user, following })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NewFollow {
    pub user: Username,
    pub following: Username,
}

impl NewFollow {
    pub fn into_follow(self, id: FollowId) -> Follow {
        Follow {
            id,
            user: self.user,
            following: self.following,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Username {
        Username::parse(s).unwrap()
    }

    fn input(following: Option<&str>) -> FollowInput {
        FollowInput {
            following: following.map(str::to_string),
        }
    }

    #[test]
    fn follower_is_always_the_identity() {
        let new = input(Some("bob")).into_new_follow(name("alice")).unwrap();
        assert_eq!(new.user, name("alice"));
        assert_eq!(new.following, name("bob"));
    }

    #[test]
    fn self_follow_is_rejected() {
        let err = input(Some("alice")).into_new_follow(name("alice")).unwrap_err();
        assert!(matches!(err, DomainError::Validation(f) if f.get("following").is_some()));
    }

    #[test]
    fn missing_and_blank_targets_are_rejected() {
        assert!(input(None).into_new_follow(name("alice")).is_err());
        assert!(input(Some(" ")).into_new_follow(name("alice")).is_err());
    }

    #[test]
    fn term_matches_either_side_ignoring_case() {
        let follow = NewFollow {
            user: name("alice"),
            following: name("BobTheBuilder"),
        }
        .into_follow(FollowId::new(1));
        assert!(follow.matches_term("ALI"));
        assert!(follow.matches_term("builder"));
        assert!(!follow.matches_term("carol"));
    }
}
