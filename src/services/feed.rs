//! The nearby-post feed: resolves the caller's effective location and plans
//! the filtered, ranked, paginated query for it.

use chrono::Utc;
use thiserror::Error;

use crate::config::FeedConfig;
use crate::db::{CandidateScope, Store};
use crate::geo::{bounding_box, haversine_miles};
use crate::models::{LocationScope, PageParams, SortMode, resolve_location};
use crate::ranking::{RankedPost, sort_and_page};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("User {0} not found")]
    UserNotFound(i32),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for FeedError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// One page of the feed plus the scope that produced it, so callers can
/// echo the effective location back to the client.
pub struct NearbyFeed {
    pub posts: Vec<RankedPost>,
    pub scope: LocationScope,
}

#[derive(Clone)]
pub struct FeedService {
    store: Store,
    default_radius_miles: f64,
}

impl FeedService {
    #[must_use]
    pub fn new(store: Store, config: &FeedConfig) -> Self {
        Self {
            store,
            default_radius_miles: config.default_radius_miles,
        }
    }

    /// Active posts visible to the user's resolved location, ordered by the
    /// shared ranking contract and paginated.
    pub async fn nearby_posts(
        &self,
        user_id: i32,
        page: PageParams,
    ) -> Result<NearbyFeed, FeedError> {
        let profile = self
            .store
            .get_user_profile(user_id)
            .await?
            .ok_or(FeedError::UserNotFound(user_id))?;

        let scope = resolve_location(&profile, self.default_radius_miles);
        let now = Utc::now().to_rfc3339();

        let candidates = match &scope {
            LocationScope::Geographic {
                origin,
                radius_miles,
            } => {
                let bbox = bounding_box(*origin, *radius_miles);
                let rows = self
                    .store
                    .active_post_candidates(CandidateScope::BoundingBox(bbox), &now)
                    .await?;

                // The box is coarse; the haversine test is the contract.
                rows.into_iter()
                    .filter_map(|(post, author)| {
                        let point = post.location?;
                        let distance = haversine_miles(point, *origin);
                        (distance <= *radius_miles).then(|| RankedPost {
                            post,
                            author,
                            distance_miles: distance,
                            comment_count: 0,
                            reaction_count: 0,
                        })
                    })
                    .collect()
            }
            LocationScope::City { city, state } => {
                let rows = self
                    .store
                    .active_post_candidates(
                        CandidateScope::City {
                            city,
                            state: state.as_deref(),
                        },
                        &now,
                    )
                    .await?;
                plain_ranked(rows)
            }
            LocationScope::Unfiltered => {
                let rows = self
                    .store
                    .active_post_candidates(CandidateScope::All, &now)
                    .await?;
                plain_ranked(rows)
            }
        };

        let by_distance = matches!(scope, LocationScope::Geographic { .. });
        let mut posts = sort_and_page(candidates, SortMode::Relevance, by_distance, page);

        // Engagement decoration for the returned page only; it plays no
        // part in feed ranking.
        let ids: Vec<i32> = posts.iter().map(|p| p.post.id).collect();
        let counts = self.store.engagement_counts(&ids).await?;
        for post in &mut posts {
            if let Some((comments, reactions)) = counts.get(&post.post.id) {
                post.comment_count = *comments;
                post.reaction_count = *reactions;
            }
        }

        Ok(NearbyFeed { posts, scope })
    }
}

fn plain_ranked(rows: Vec<(crate::models::Post, crate::models::PostAuthor)>) -> Vec<RankedPost> {
    rows.into_iter()
        .map(|(post, author)| RankedPost {
            post,
            author,
            distance_miles: 0.0,
            comment_count: 0,
            reaction_count: 0,
        })
        .collect()
}
