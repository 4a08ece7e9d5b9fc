use yatube_auth::Identity;

/// Identity context for a request.
///
/// Always present in request extensions once the auth middleware has run;
/// `None` means the caller sent no credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestIdentity(Option<Identity>);

impl RequestIdentity {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn authenticated(identity: Identity) -> Self {
        Self(Some(identity))
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}
