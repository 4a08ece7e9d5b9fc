//! Free-text search over follow relationships.
//!
//! The query string is split into terms on whitespace and commas. A row
//! matches when *every* term is a case-insensitive substring of at least one
//! searchable field.

use yatube_blog::Follow;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTerms(Vec<String>);

impl SearchTerms {
    pub fn parse(raw: Option<&str>) -> Self {
        let terms = raw
            .unwrap_or_default()
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        Self(terms)
    }

    pub fn terms(&self) -> &[String] {
        &self.0
    }

    pub fn matches(&self, follow: &Follow) -> bool {
        self.0.iter().all(|term| follow.matches_term(term))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use yatube_blog::{NewFollow, Username};
    use yatube_core::FollowId;

    fn follow(user: &str, following: &str) -> Follow {
        NewFollow {
            user: Username::parse(user).unwrap(),
            following: Username::parse(following).unwrap(),
        }
        .into_follow(FollowId::new(1))
    }

    #[test]
    fn splits_on_whitespace_and_commas() {
        let terms = SearchTerms::parse(Some(" bob,  carol\tdave ,"));
        assert_eq!(terms.terms(), ["bob", "carol", "dave"]);
    }

    #[test]
    fn missing_or_blank_search_matches_everything() {
        let row = follow("alice", "bob");
        assert!(SearchTerms::parse(None).matches(&row));
        assert!(SearchTerms::parse(Some("  , ")).matches(&row));
    }

    #[test]
    fn all_terms_must_match() {
        let row = follow("alice", "bob");
        assert!(SearchTerms::parse(Some("ali bo")).matches(&row));
        assert!(!SearchTerms::parse(Some("ali carol")).matches(&row));
    }

    proptest! {
        /// Any substring of the followed username finds the row, whatever its case.
        #[test]
        fn any_substring_of_following_matches(
            name in "[a-z][a-z0-9_]{0,20}",
            start in 0usize..21,
            len in 1usize..21,
        ) {
            let row = follow("someone", &name);
            let start = start.min(name.len() - 1);
            let end = (start + len).min(name.len());
            let term = name[start..end].to_uppercase();
            prop_assert!(SearchTerms::parse(Some(&term)).matches(&row));
        }
    }
}
