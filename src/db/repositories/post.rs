use std::collections::HashMap;

use anyhow::Result;
use sea_orm::sea_query::{Expr, ExprTrait, LikeExpr};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

use crate::entities::{comments, posts, prelude::*, reactions, users};
use crate::geo::{BoundingBox, Point};
use crate::models::{Post, PostAuthor, PostType, Priority, ResolvedFilter};

/// Location narrowing applied to the active-post candidate query.
///
/// The bounding box is a coarse SQL prefilter; the exact haversine test
/// happens in the service layer.
#[derive(Debug, Clone)]
pub enum CandidateScope<'a> {
    City {
        city: &'a str,
        state: Option<&'a str>,
    },
    BoundingBox(BoundingBox),
    All,
}

/// The conjunctive filter set of a search. All present filters AND together.
#[derive(Debug, Clone, Default)]
pub struct PostSelector<'a> {
    pub text: Option<&'a str>,
    pub city: Option<&'a str>,
    pub state: Option<&'a str>,
    pub post_types: &'a [PostType],
    pub priorities: &'a [Priority],
    pub date_from: Option<&'a str>,
    pub date_to: Option<&'a str>,
    pub emergency_only: bool,
    pub resolved: ResolvedFilter,
}

pub struct PostRepository {
    conn: DatabaseConnection,
}

impl PostRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Active posts (unexpired as of `now`) within the given scope, each
    /// joined with its author projection.
    pub async fn active_candidates(
        &self,
        scope: CandidateScope<'_>,
        now: &str,
    ) -> Result<Vec<(Post, PostAuthor)>> {
        let mut query = Posts::find().filter(active_condition(now));

        match scope {
            CandidateScope::City { city, state } => {
                query = query.filter(posts::Column::City.eq(city));
                if let Some(state) = state {
                    query = query.filter(posts::Column::State.eq(state));
                }
            }
            CandidateScope::BoundingBox(bbox) => {
                query = query
                    .filter(posts::Column::Latitude.is_not_null())
                    .filter(posts::Column::Longitude.is_not_null())
                    .filter(posts::Column::Latitude.between(bbox.min_lat, bbox.max_lat))
                    .filter(posts::Column::Longitude.between(bbox.min_lon, bbox.max_lon));
            }
            CandidateScope::All => {}
        }

        let rows = query
            .order_by_desc(posts::Column::CreatedAt)
            .find_also_related(Users)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(post, author)| (to_domain(post), to_author(author)))
            .collect())
    }

    /// Active posts matching the full search selector. Only posts by active
    /// authors are eligible here, unlike the feed path.
    ///
    /// The free-text contract is case-insensitive substring containment on
    /// title OR content (SQLite LIKE), not tokenized relevance.
    pub async fn search_candidates(
        &self,
        selector: &PostSelector<'_>,
        now: &str,
    ) -> Result<Vec<(Post, PostAuthor)>> {
        let mut query = Posts::find()
            .filter(active_condition(now))
            .filter(users::Column::IsActive.eq(true));

        if let Some(text) = selector.text {
            query = query.filter(
                Condition::any()
                    .add(Expr::col(posts::Column::Title).like(contains_pattern(text)))
                    .add(Expr::col(posts::Column::Content).like(contains_pattern(text))),
            );
        }

        if let Some(city) = selector.city {
            query = query.filter(posts::Column::City.eq(city));
        }
        if let Some(state) = selector.state {
            query = query.filter(posts::Column::State.eq(state));
        }

        if !selector.post_types.is_empty() {
            let types: Vec<&str> = selector.post_types.iter().map(|t| t.as_str()).collect();
            query = query.filter(posts::Column::PostType.is_in(types));
        }
        if !selector.priorities.is_empty() {
            let priorities: Vec<&str> = selector.priorities.iter().map(|p| p.as_str()).collect();
            query = query.filter(posts::Column::Priority.is_in(priorities));
        }

        if let Some(from) = selector.date_from {
            query = query.filter(posts::Column::CreatedAt.gte(from));
        }
        if let Some(to) = selector.date_to {
            query = query.filter(posts::Column::CreatedAt.lte(to));
        }

        if selector.emergency_only {
            query = query.filter(posts::Column::IsEmergency.eq(true));
        }

        match selector.resolved {
            ResolvedFilter::All => {}
            ResolvedFilter::Resolved => {
                query = query.filter(posts::Column::IsResolved.eq(true));
            }
            ResolvedFilter::Unresolved => {
                query = query.filter(posts::Column::IsResolved.eq(false));
            }
        }

        let rows = query
            .order_by_desc(posts::Column::CreatedAt)
            .find_also_related(Users)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(post, author)| (to_domain(post), to_author(author)))
            .collect())
    }

    /// Comment and reaction counts per post id, zero when absent.
    pub async fn engagement_counts(&self, post_ids: &[i32]) -> Result<HashMap<i32, (i64, i64)>> {
        let mut counts: HashMap<i32, (i64, i64)> = HashMap::new();
        if post_ids.is_empty() {
            return Ok(counts);
        }

        let comment_rows: Vec<(i32, i64)> = Comments::find()
            .select_only()
            .column(comments::Column::PostId)
            .column_as(comments::Column::Id.count(), "count")
            .filter(comments::Column::PostId.is_in(post_ids.to_vec()))
            .group_by(comments::Column::PostId)
            .into_tuple()
            .all(&self.conn)
            .await?;

        for (post_id, count) in comment_rows {
            counts.entry(post_id).or_default().0 = count;
        }

        let reaction_rows: Vec<(i32, i64)> = Reactions::find()
            .select_only()
            .column(reactions::Column::PostId)
            .column_as(reactions::Column::Id.count(), "count")
            .filter(reactions::Column::PostId.is_in(post_ids.to_vec()))
            .group_by(reactions::Column::PostId)
            .into_tuple()
            .all(&self.conn)
            .await?;

        for (post_id, count) in reaction_rows {
            counts.entry(post_id).or_default().1 = count;
        }

        Ok(counts)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(Posts::find().count(&self.conn).await?)
    }
}

/// Substring LIKE pattern with `%`/`_` in the user's term treated as
/// literals, not wildcards.
fn contains_pattern(text: &str) -> LikeExpr {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    LikeExpr::new(format!("%{escaped}%")).escape('\\')
}

/// expiration null OR expiration still in the future.
fn active_condition(now: &str) -> Condition {
    Condition::any()
        .add(posts::Column::ExpiresAt.is_null())
        .add(posts::Column::ExpiresAt.gt(now))
}

fn to_domain(model: posts::Model) -> Post {
    let location = match (model.latitude, model.longitude) {
        (Some(lat), Some(lon)) => Some(Point::new(lat, lon)),
        _ => None,
    };

    Post {
        id: model.id,
        user_id: model.user_id,
        title: model.title,
        content: model.content,
        post_type: model.post_type,
        priority: model.priority,
        is_emergency: model.is_emergency,
        is_resolved: model.is_resolved,
        location,
        city: model.city,
        state: model.state,
        county: model.county,
        images: model
            .images
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default(),
        tags: model
            .tags
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default(),
        expires_at: model.expires_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn to_author(model: Option<users::Model>) -> PostAuthor {
    model.map_or_else(
        || PostAuthor {
            first_name: String::new(),
            last_name: String::new(),
            profile_image: None,
        },
        |u| PostAuthor {
            first_name: u.first_name,
            last_name: u.last_name,
            profile_image: u.profile_image,
        },
    )
}
