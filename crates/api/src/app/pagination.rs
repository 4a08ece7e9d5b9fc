//! Limit/offset pagination for list endpoints.
//!
//! Pagination is opt-in: without `limit`/`offset` a list endpoint returns a
//! plain array. With either one, it returns
//! `{count, next, previous, results}` where the links are relative and carry
//! the effective `limit`.

use yatube_infra::Window;

use crate::app::dto::PageQuery;
use crate::config::PaginationConfig;

/// Turn raw query parameters into a window, or `None` for an unpaginated list.
///
/// Malformed values never fail the request: a missing, non-numeric or zero
/// `limit` falls back to the default page size, a malformed `offset` to 0.
/// Any limit is clamped to the configured maximum.
pub fn parse_window(query: &PageQuery, cfg: PaginationConfig) -> Option<Window> {
    if query.limit.is_none() && query.offset.is_none() {
        return None;
    }

    let limit = query
        .limit
        .as_deref()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(cfg.default_limit)
        .min(cfg.max_limit);

    let offset = query
        .offset
        .as_deref()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .unwrap_or(0);

    Some(Window { limit, offset })
}

/// Relative link to the page after `window`, if any rows remain.
pub fn next_link(base_path: &str, window: Window, count: u64) -> Option<String> {
    let next_offset = window.offset.saturating_add(window.limit);
    (next_offset < count).then(|| format!("{base_path}?limit={}&offset={next_offset}", window.limit))
}

/// Relative link to the page before `window`; the first page omits `offset`.
pub fn previous_link(base_path: &str, window: Window) -> Option<String> {
    if window.offset == 0 {
        return None;
    }
    if window.offset <= window.limit {
        return Some(format!("{base_path}?limit={}", window.limit));
    }
    Some(format!(
        "{base_path}?limit={}&offset={}",
        window.limit,
        window.offset - window.limit
    ))
}

pub fn envelope(
    base_path: &str,
    window: Window,
    count: u64,
    results: Vec<serde_json::Value>,
) -> serde_json::Value {
    serde_json::json!({
        "count": count,
        "next": next_link(base_path, window, count),
        "previous": previous_link(base_path, window),
        "results": results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn query(limit: Option<&str>, offset: Option<&str>) -> PageQuery {
        PageQuery {
            limit: limit.map(str::to_string),
            offset: offset.map(str::to_string),
        }
    }

    fn cfg() -> PaginationConfig {
        PaginationConfig {
            default_limit: 10,
            max_limit: 100,
        }
    }

    #[test]
    fn no_params_means_no_pagination() {
        assert_eq!(parse_window(&query(None, None), cfg()), None);
    }

    #[test]
    fn offset_alone_uses_default_limit() {
        assert_eq!(
            parse_window(&query(None, Some("20")), cfg()),
            Some(Window { limit: 10, offset: 20 })
        );
    }

    #[test]
    fn oversized_limit_is_clamped() {
        assert_eq!(
            parse_window(&query(Some("5000"), None), cfg()),
            Some(Window { limit: 100, offset: 0 })
        );
    }

    #[test]
    fn default_limit_never_exceeds_the_maximum() {
        let cfg = PaginationConfig {
            default_limit: 500,
            max_limit: 100,
        };
        assert_eq!(
            parse_window(&query(None, Some("0")), cfg),
            Some(Window { limit: 100, offset: 0 })
        );
    }

    #[test]
    fn malformed_values_fall_back_to_defaults() {
        for (limit, offset, expected) in [
            (Some("0"), None, Window { limit: 10, offset: 0 }),
            (Some("-3"), None, Window { limit: 10, offset: 0 }),
            (Some("ten"), Some("4"), Window { limit: 10, offset: 4 }),
            (Some("5"), Some("-1"), Window { limit: 5, offset: 0 }),
            (None, Some("abc"), Window { limit: 10, offset: 0 }),
        ] {
            assert_eq!(
                parse_window(&query(limit, offset), cfg()),
                Some(expected),
                "limit={limit:?} offset={offset:?}"
            );
        }
    }

    #[test]
    fn links_walk_the_listing() {
        let w = Window { limit: 2, offset: 2 };
        assert_eq!(next_link("/p/", w, 5).as_deref(), Some("/p/?limit=2&offset=4"));
        assert_eq!(previous_link("/p/", w).as_deref(), Some("/p/?limit=2"));
        let last = Window { limit: 2, offset: 4 };
        assert_eq!(next_link("/p/", last, 5), None);
        assert_eq!(previous_link("/p/", last).as_deref(), Some("/p/?limit=2&offset=2"));
        assert_eq!(previous_link("/p/", Window { limit: 2, offset: 0 }), None);
    }

    proptest! {
        /// `next` exists exactly when rows remain past the current window.
        #[test]
        fn next_link_iff_rows_remain(count in 0u64..500, limit in 1u64..50, offset in 0u64..600) {
            let w = Window { limit, offset };
            prop_assert_eq!(next_link("/x/", w, count).is_some(), offset + limit < count);
            prop_assert_eq!(previous_link("/x/", w).is_some(), offset > 0);
        }
    }
}
