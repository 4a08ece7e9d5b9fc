//! Groups (communities) posts can be published into.
//!
//! Groups are managed by an administrative process; the API only reads them.

use serde::{Deserialize, Serialize};

use yatube_core::{DomainError, DomainResult, Entity, FieldErrors, GroupId, ValueObject};

const MAX_TITLE_LEN: usize = 200;
const MAX_SLUG_LEN: usize = 50;

/// URL-safe unique group key: ASCII letters, digits, `-` and `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    pub fn parse(raw: impl Into<String>) -> DomainResult<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(DomainError::validation("slug", crate::BLANK));
        }
        if raw.len() > MAX_SLUG_LEN {
            return Err(DomainError::validation(
                "slug",
                format!("Ensure this field has no more than {MAX_SLUG_LEN} characters."),
            ));
        }
        if !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(DomainError::validation(
                "slug",
                "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
            ));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Slug {}

impl core::fmt::Display for Slug {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Slug {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Slug> for String {
    fn from(value: Slug) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub title: String,
    pub slug: Slug,
    pub description: String,
}

impl Entity for Group {
    type Id = GroupId;
    const KIND: &'static str = "group";

    fn id(&self) -> GroupId {
        self.id
    }
}

/// A group about to be inserted by the administrative process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    pub title: String,
    pub slug: Slug,
    pub description: String,
}

impl NewGroup {
    pub fn new(
        title: impl Into<String>,
        slug: &str,
        description: impl Into<String>,
    ) -> DomainResult<Self> {
        let title = title.into();
        let mut errors = FieldErrors::new();
        if title.trim().is_empty() {
            errors.add("title", crate::BLANK);
        } else if title.chars().count() > MAX_TITLE_LEN {
            errors.add(
                "title",
                format!("Ensure this field has no more than {MAX_TITLE_LEN} characters."),
            );
        }
        let slug = match Slug::parse(slug) {
            Ok(slug) => Some(slug),
            Err(DomainError::Validation(e)) => {
                for msg in e.get("slug").unwrap_or_default() {
                    errors.add("slug", msg.clone());
                }
                None
            }
            Err(other) => return Err(other),
        };
        errors.into_result()?;

        Ok(Self {
            title,
            // `errors` was empty, so the slug parsed.
            slug: slug.ok_or_else(|| DomainError::validation("slug", crate::REQUIRED))?,
            description: description.into(),
        })
    }

    pub fn into_group(self, id: GroupId) -> Group {
        Group {
            id,
            title: self.title,
            slug: self.slug,
            description: self.description,
        }
    }
}
