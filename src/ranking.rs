//! Result ordering for the feed and search pipelines.
//!
//! One comparator serves every location mode so the contract cannot drift:
//! emergency posts first, then priority rank (urgent=1 .. low=4, unknown
//! last), then distance ascending where the caller ranks geographically,
//! then newest first. Popularity sorting layers an engagement key on top of
//! the same order.

use std::cmp::Ordering;

use crate::models::{PageParams, Post, PostAuthor, Priority, SortMode};

/// A post enriched with everything ranking and display need.
#[derive(Debug, Clone)]
pub struct RankedPost {
    pub post: Post,
    pub author: PostAuthor,
    /// Miles from the request origin; 0 outside geographic mode and for
    /// posts without a point.
    pub distance_miles: f64,
    pub comment_count: i64,
    pub reaction_count: i64,
}

impl RankedPost {
    #[must_use]
    pub const fn engagement(&self) -> i64 {
        self.comment_count + self.reaction_count
    }
}

/// Emergency > priority rank > (distance) > recency.
///
/// `by_distance` is set only for geographic-mode feeds; city and unfiltered
/// modes carry uniform zero distances and fall through to recency.
#[must_use]
pub fn relevance_cmp(a: &RankedPost, b: &RankedPost, by_distance: bool) -> Ordering {
    b.post
        .is_emergency
        .cmp(&a.post.is_emergency)
        .then_with(|| Priority::rank_of(&a.post.priority).cmp(&Priority::rank_of(&b.post.priority)))
        .then_with(|| {
            if by_distance {
                a.distance_miles
                    .partial_cmp(&b.distance_miles)
                    .unwrap_or(Ordering::Equal)
            } else {
                Ordering::Equal
            }
        })
        .then_with(|| b.post.created_at.cmp(&a.post.created_at))
}

/// Engagement (comments + reactions) descending, ties broken by the
/// relevance order.
#[must_use]
pub fn popularity_cmp(a: &RankedPost, b: &RankedPost, by_distance: bool) -> Ordering {
    b.engagement()
        .cmp(&a.engagement())
        .then_with(|| relevance_cmp(a, b, by_distance))
}

/// Sorts in place per the requested mode and returns the requested page.
#[must_use]
pub fn sort_and_page(
    mut posts: Vec<RankedPost>,
    sort: SortMode,
    by_distance: bool,
    page: PageParams,
) -> Vec<RankedPost> {
    match sort {
        SortMode::Relevance => posts.sort_by(|a, b| relevance_cmp(a, b, by_distance)),
        SortMode::Popularity => posts.sort_by(|a, b| popularity_cmp(a, b, by_distance)),
    }

    posts
        .into_iter()
        .skip(usize::try_from(page.offset).unwrap_or(usize::MAX))
        .take(usize::try_from(page.limit).unwrap_or(usize::MAX))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PostAuthor;

    fn ranked(
        id: i32,
        emergency: bool,
        priority: &str,
        distance: f64,
        created_at: &str,
    ) -> RankedPost {
        RankedPost {
            post: Post {
                id,
                user_id: 1,
                title: format!("post {id}"),
                content: String::new(),
                post_type: "general".to_string(),
                priority: priority.to_string(),
                is_emergency: emergency,
                is_resolved: false,
                location: None,
                city: None,
                state: None,
                county: None,
                images: vec![],
                tags: vec![],
                expires_at: None,
                created_at: created_at.to_string(),
                updated_at: created_at.to_string(),
            },
            author: PostAuthor {
                first_name: "A".to_string(),
                last_name: "B".to_string(),
                profile_image: None,
            },
            distance_miles: distance,
            comment_count: 0,
            reaction_count: 0,
        }
    }

    fn ids(posts: &[RankedPost]) -> Vec<i32> {
        posts.iter().map(|p| p.post.id).collect()
    }

    #[test]
    fn test_emergency_sorts_first() {
        let posts = vec![
            ranked(1, false, "urgent", 0.0, "2026-08-01T00:00:00Z"),
            ranked(2, true, "low", 0.0, "2026-08-01T00:00:00Z"),
        ];
        let page = PageParams {
            limit: 10,
            offset: 0,
        };
        let sorted = sort_and_page(posts, SortMode::Relevance, false, page);
        assert_eq!(ids(&sorted), vec![2, 1]);
    }

    #[test]
    fn test_priority_order_within_emergency_class() {
        let posts = vec![
            ranked(1, false, "low", 0.0, "2026-08-01T00:00:00Z"),
            ranked(2, false, "normal", 0.0, "2026-08-01T00:00:00Z"),
            ranked(3, false, "urgent", 0.0, "2026-08-01T00:00:00Z"),
            ranked(4, false, "high", 0.0, "2026-08-01T00:00:00Z"),
        ];
        let page = PageParams {
            limit: 10,
            offset: 0,
        };
        let sorted = sort_and_page(posts, SortMode::Relevance, false, page);
        assert_eq!(ids(&sorted), vec![3, 4, 2, 1]);
    }

    #[test]
    fn test_unknown_priority_sorts_last() {
        let posts = vec![
            ranked(1, false, "mystery", 0.0, "2026-08-01T00:00:00Z"),
            ranked(2, false, "low", 0.0, "2026-08-01T00:00:00Z"),
        ];
        let page = PageParams {
            limit: 10,
            offset: 0,
        };
        let sorted = sort_and_page(posts, SortMode::Relevance, false, page);
        assert_eq!(ids(&sorted), vec![2, 1]);
    }

    #[test]
    fn test_distance_breaks_ties_in_geographic_mode() {
        let posts = vec![
            ranked(1, false, "normal", 8.0, "2026-08-01T00:00:00Z"),
            ranked(2, false, "normal", 2.0, "2026-08-01T00:00:00Z"),
        ];
        let page = PageParams {
            limit: 10,
            offset: 0,
        };
        let sorted = sort_and_page(posts, SortMode::Relevance, true, page);
        assert_eq!(ids(&sorted), vec![2, 1]);
    }

    #[test]
    fn test_distance_ignored_outside_geographic_mode() {
        let newer = "2026-08-02T00:00:00Z";
        let older = "2026-08-01T00:00:00Z";
        let posts = vec![
            ranked(1, false, "normal", 2.0, older),
            ranked(2, false, "normal", 8.0, newer),
        ];
        let page = PageParams {
            limit: 10,
            offset: 0,
        };
        let sorted = sort_and_page(posts, SortMode::Relevance, false, page);
        assert_eq!(ids(&sorted), vec![2, 1]);
    }

    #[test]
    fn test_newest_first_final_tiebreak() {
        let posts = vec![
            ranked(1, false, "normal", 0.0, "2026-08-01T00:00:00Z"),
            ranked(2, false, "normal", 0.0, "2026-08-03T00:00:00Z"),
            ranked(3, false, "normal", 0.0, "2026-08-02T00:00:00Z"),
        ];
        let page = PageParams {
            limit: 10,
            offset: 0,
        };
        let sorted = sort_and_page(posts, SortMode::Relevance, false, page);
        assert_eq!(ids(&sorted), vec![2, 3, 1]);
    }

    #[test]
    fn test_popularity_overrides_relevance() {
        let mut busy = ranked(1, false, "low", 0.0, "2026-08-01T00:00:00Z");
        busy.comment_count = 5;
        busy.reaction_count = 3;
        let quiet = ranked(2, true, "urgent", 0.0, "2026-08-01T00:00:00Z");

        let page = PageParams {
            limit: 10,
            offset: 0,
        };
        let sorted = sort_and_page(vec![quiet, busy], SortMode::Popularity, false, page);
        assert_eq!(ids(&sorted), vec![1, 2]);
    }

    #[test]
    fn test_pagination_window() {
        let posts = (1..=5)
            .map(|i| {
                ranked(
                    i,
                    false,
                    "normal",
                    0.0,
                    &format!("2026-08-0{}T00:00:00Z", 6 - i),
                )
            })
            .collect::<Vec<_>>();
        let page = PageParams {
            limit: 2,
            offset: 2,
        };
        let sorted = sort_and_page(posts, SortMode::Relevance, false, page);
        assert_eq!(sorted.len(), 2);
        assert_eq!(ids(&sorted), vec![3, 4]);
    }
}
