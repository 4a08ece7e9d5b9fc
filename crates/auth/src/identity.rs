use serde::Serialize;

use yatube_blog::{User, Username};
use yatube_core::UserId;

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    user_id: UserId,
    username: Username,
}

impl Identity {
    pub fn new(user_id: UserId, username: Username) -> Self {
        Self { user_id, username }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn username(&self) -> &Username {
        &self.username
    }
}

impl From<User> for Identity {
    fn from(user: User) -> Self {
        Self::new(user.id, user.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_carries_the_stored_user() {
        let user = User {
            id: UserId::new(7),
            username: Username::parse("alice").unwrap(),
        };
        let identity = Identity::from(user);
        assert_eq!(identity.user_id(), UserId::new(7));
        assert_eq!(identity.username().as_str(), "alice");
    }
}
