use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, NotSet, QueryFilter, Set};
use tower::ServiceExt;

use stormfeed::config::Config;
use stormfeed::db::Store;
use stormfeed::entities::{comments, posts, reactions, search_queries, search_suggestions, users};

/// In-memory SQLite needs a single connection: each pooled connection would
/// otherwise see its own empty database.
async fn spawn_app() -> (Router, Store) {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;

    let state = stormfeed::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    let store = state.store.clone();
    let app = stormfeed::api::router(state).await;
    (app, store)
}

struct UserSeed {
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<&'static str>,
    state: Option<&'static str>,
    radius: Option<f64>,
    show_city_only: bool,
}

impl Default for UserSeed {
    fn default() -> Self {
        Self {
            latitude: None,
            longitude: None,
            city: None,
            state: None,
            radius: None,
            show_city_only: false,
        }
    }
}

async fn seed_user(store: &Store, seed: UserSeed) -> i32 {
    let user = users::ActiveModel {
        id: NotSet,
        first_name: Set("Sam".to_string()),
        last_name: Set("Rivera".to_string()),
        profile_image: Set(None),
        latitude: Set(seed.latitude),
        longitude: Set(seed.longitude),
        city: Set(seed.city.map(ToString::to_string)),
        state: Set(seed.state.map(ToString::to_string)),
        notification_radius_miles: Set(seed.radius),
        show_city_only: Set(seed.show_city_only),
        is_active: Set(true),
        created_at: Set(Utc::now().to_rfc3339()),
    };
    user.insert(&store.conn).await.unwrap().id
}

struct PostSeed {
    title: &'static str,
    post_type: &'static str,
    priority: &'static str,
    is_emergency: bool,
    is_resolved: bool,
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<&'static str>,
    state: Option<&'static str>,
    expires_at: Option<String>,
    created_at: Option<String>,
}

impl Default for PostSeed {
    fn default() -> Self {
        Self {
            title: "A post",
            post_type: "general",
            priority: "normal",
            is_emergency: false,
            is_resolved: false,
            latitude: None,
            longitude: None,
            city: None,
            state: None,
            expires_at: None,
            created_at: None,
        }
    }
}

async fn seed_post(store: &Store, user_id: i32, seed: PostSeed) -> i32 {
    let now = Utc::now().to_rfc3339();
    let post = posts::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        title: Set(seed.title.to_string()),
        content: Set(format!("{} content", seed.title)),
        post_type: Set(seed.post_type.to_string()),
        priority: Set(seed.priority.to_string()),
        is_emergency: Set(seed.is_emergency),
        is_resolved: Set(seed.is_resolved),
        latitude: Set(seed.latitude),
        longitude: Set(seed.longitude),
        city: Set(seed.city.map(ToString::to_string)),
        state: Set(seed.state.map(ToString::to_string)),
        county: Set(None),
        images: Set(None),
        tags: Set(None),
        expires_at: Set(seed.expires_at),
        created_at: Set(seed.created_at.unwrap_or_else(|| now.clone())),
        updated_at: Set(now),
    };
    post.insert(&store.conn).await.unwrap().id
}

struct SuggestionSeed {
    text: &'static str,
    search_count: i32,
    is_approved: bool,
    is_trending: bool,
    trend_score: f64,
    city: &'static str,
    state: &'static str,
}

impl Default for SuggestionSeed {
    fn default() -> Self {
        Self {
            text: "flood",
            search_count: 1,
            is_approved: true,
            is_trending: false,
            trend_score: 0.0,
            city: "",
            state: "",
        }
    }
}

async fn seed_suggestion(store: &Store, seed: SuggestionSeed) {
    search_suggestions::ActiveModel {
        id: NotSet,
        suggestion_text: Set(seed.text.to_string()),
        suggestion_type: Set("query".to_string()),
        city: Set(seed.city.to_string()),
        state: Set(seed.state.to_string()),
        search_count: Set(seed.search_count),
        result_count: Set(1.0),
        click_through_rate: Set(0.0),
        is_approved: Set(seed.is_approved),
        is_trending: Set(seed.is_trending),
        trend_score: Set(seed.trend_score),
        category: Set(None),
        sentiment: Set(None),
        last_searched_at: Set(Utc::now().to_rfc3339()),
    }
    .insert(&store.conn)
    .await
    .unwrap();
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", mime::APPLICATION_JSON.as_ref())
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

// Austin city center; the nearby point is roughly 2 miles out, Dallas is
// far outside any sane neighborhood radius.
const AUSTIN: (f64, f64) = (30.2672, -97.7431);
const AUSTIN_NEARBY: (f64, f64) = (30.29, -97.75);
const DALLAS: (f64, f64) = (32.7767, -96.797);

#[tokio::test]
async fn test_feed_requires_valid_user_id() {
    let (app, _store) = spawn_app().await;

    let (status, _) = get_json(&app, "/api/posts").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(&app, "/api/posts?user_id=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_feed_unknown_user_is_404() {
    let (app, _store) = spawn_app().await;

    let (status, body) = get_json(&app, "/api/posts?user_id=999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_city_mode_feed_matches_city_with_zero_distance() {
    let (app, store) = spawn_app().await;

    let user = seed_user(
        &store,
        UserSeed {
            city: Some("Austin"),
            state: Some("TX"),
            show_city_only: true,
            latitude: Some(AUSTIN.0),
            longitude: Some(AUSTIN.1),
            ..Default::default()
        },
    )
    .await;

    seed_post(
        &store,
        user,
        PostSeed {
            title: "Austin post",
            city: Some("Austin"),
            state: Some("TX"),
            ..Default::default()
        },
    )
    .await;
    seed_post(
        &store,
        user,
        PostSeed {
            title: "Dallas post",
            city: Some("Dallas"),
            state: Some("TX"),
            ..Default::default()
        },
    )
    .await;

    let (status, body) = get_json(&app, &format!("/api/posts?user_id={user}")).await;
    assert_eq!(status, StatusCode::OK);

    let posts = body["data"]["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"], "Austin post");
    assert_eq!(posts[0]["distance_miles"], 0.0);
    assert_eq!(body["data"]["location"]["mode"], "city");
}

#[tokio::test]
async fn test_geographic_feed_applies_radius() {
    let (app, store) = spawn_app().await;

    let user = seed_user(
        &store,
        UserSeed {
            latitude: Some(AUSTIN.0),
            longitude: Some(AUSTIN.1),
            radius: Some(10.0),
            ..Default::default()
        },
    )
    .await;

    seed_post(
        &store,
        user,
        PostSeed {
            title: "Nearby post",
            latitude: Some(AUSTIN_NEARBY.0),
            longitude: Some(AUSTIN_NEARBY.1),
            ..Default::default()
        },
    )
    .await;
    seed_post(
        &store,
        user,
        PostSeed {
            title: "Far away post",
            latitude: Some(DALLAS.0),
            longitude: Some(DALLAS.1),
            ..Default::default()
        },
    )
    .await;

    let (status, body) = get_json(&app, &format!("/api/posts?user_id={user}")).await;
    assert_eq!(status, StatusCode::OK);

    let posts = body["data"]["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"], "Nearby post");

    let distance = posts[0]["distance_miles"].as_f64().unwrap();
    assert!(distance > 0.0 && distance < 10.0);
    assert_eq!(body["data"]["location"]["mode"], "geographic");
}

#[tokio::test]
async fn test_expired_posts_are_excluded() {
    let (app, store) = spawn_app().await;

    let user = seed_user(
        &store,
        UserSeed {
            city: Some("Austin"),
            show_city_only: true,
            ..Default::default()
        },
    )
    .await;

    seed_post(
        &store,
        user,
        PostSeed {
            title: "Expired post",
            city: Some("Austin"),
            expires_at: Some((Utc::now() - Duration::hours(1)).to_rfc3339()),
            ..Default::default()
        },
    )
    .await;
    seed_post(
        &store,
        user,
        PostSeed {
            title: "Live post",
            city: Some("Austin"),
            expires_at: Some((Utc::now() + Duration::hours(1)).to_rfc3339()),
            ..Default::default()
        },
    )
    .await;
    seed_post(
        &store,
        user,
        PostSeed {
            title: "Never expires",
            city: Some("Austin"),
            ..Default::default()
        },
    )
    .await;

    let (status, body) = get_json(&app, &format!("/api/posts?user_id={user}")).await;
    assert_eq!(status, StatusCode::OK);

    let titles: Vec<&str> = body["data"]["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles.len(), 2);
    assert!(!titles.contains(&"Expired post"));
}

#[tokio::test]
async fn test_feed_orders_emergency_then_priority() {
    let (app, store) = spawn_app().await;

    let user = seed_user(
        &store,
        UserSeed {
            city: Some("Austin"),
            show_city_only: true,
            ..Default::default()
        },
    )
    .await;

    let old = (Utc::now() - Duration::hours(3)).to_rfc3339();
    seed_post(
        &store,
        user,
        PostSeed {
            title: "Low priority",
            priority: "low",
            city: Some("Austin"),
            ..Default::default()
        },
    )
    .await;
    seed_post(
        &store,
        user,
        PostSeed {
            title: "Urgent",
            priority: "urgent",
            city: Some("Austin"),
            ..Default::default()
        },
    )
    .await;
    seed_post(
        &store,
        user,
        PostSeed {
            title: "Emergency",
            priority: "low",
            is_emergency: true,
            city: Some("Austin"),
            created_at: Some(old),
            ..Default::default()
        },
    )
    .await;

    let (status, body) = get_json(&app, &format!("/api/posts?user_id={user}")).await;
    assert_eq!(status, StatusCode::OK);

    let titles: Vec<&str> = body["data"]["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Emergency", "Urgent", "Low priority"]);
}

#[tokio::test]
async fn test_feed_lenient_pagination_coercion() {
    let (app, store) = spawn_app().await;

    let user = seed_user(
        &store,
        UserSeed {
            city: Some("Austin"),
            show_city_only: true,
            ..Default::default()
        },
    )
    .await;
    seed_post(
        &store,
        user,
        PostSeed {
            title: "Only post",
            city: Some("Austin"),
            ..Default::default()
        },
    )
    .await;

    let (status, body) =
        get_json(&app, &format!("/api/posts?user_id={user}&limit=abc&offset=-3")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["limit"], 20);
    assert_eq!(body["data"]["pagination"]["offset"], 0);
    assert_eq!(body["data"]["pagination"]["returned"], 1);
}

#[tokio::test]
async fn test_search_rejects_empty_query_and_filters() {
    let (app, _store) = spawn_app().await;

    let (status, body) = get_json(&app, "/api/search/posts").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = get_json(&app, "/api/search/posts?q=%20%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_text_and_emergency_filter() {
    let (app, store) = spawn_app().await;

    let user = seed_user(&store, UserSeed::default()).await;

    seed_post(
        &store,
        user,
        PostSeed {
            title: "Flood warning downtown",
            is_emergency: true,
            ..Default::default()
        },
    )
    .await;
    seed_post(
        &store,
        user,
        PostSeed {
            title: "Flood cleanup volunteers",
            ..Default::default()
        },
    )
    .await;
    seed_post(
        &store,
        user,
        PostSeed {
            title: "Garage sale",
            ..Default::default()
        },
    )
    .await;

    let (status, body) = get_json(&app, "/api/search/posts?q=flood").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["posts"].as_array().unwrap().len(), 2);

    let (status, body) = get_json(&app, "/api/search/posts?q=flood&emergency_only=true").await;
    assert_eq!(status, StatusCode::OK);
    let posts = body["data"]["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"], "Flood warning downtown");
}

#[tokio::test]
async fn test_search_treats_like_wildcards_as_literals() {
    let (app, store) = spawn_app().await;

    let user = seed_user(&store, UserSeed::default()).await;
    seed_post(
        &store,
        user,
        PostSeed {
            title: "Fundraiser at 100% of goal",
            ..Default::default()
        },
    )
    .await;
    seed_post(
        &store,
        user,
        PostSeed {
            title: "Garage sale",
            ..Default::default()
        },
    )
    .await;
    seed_post(
        &store,
        user,
        PostSeed {
            title: "snow_plow schedule",
            ..Default::default()
        },
    )
    .await;
    seed_post(
        &store,
        user,
        PostSeed {
            title: "snowyplow notice",
            ..Default::default()
        },
    )
    .await;

    // "%" in the term must not act as a match-everything wildcard.
    let (status, body) = get_json(&app, "/api/search/posts?q=100%25").await;
    assert_eq!(status, StatusCode::OK);
    let posts = body["data"]["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"], "Fundraiser at 100% of goal");

    // "_" must match only a literal underscore, not any single character.
    let (status, body) = get_json(&app, "/api/search/posts?q=snow_plow").await;
    assert_eq!(status, StatusCode::OK);
    let posts = body["data"]["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"], "snow_plow schedule");
}

#[tokio::test]
async fn test_search_popularity_sort_uses_engagement() {
    let (app, store) = spawn_app().await;

    let user = seed_user(&store, UserSeed::default()).await;
    let quiet = seed_post(
        &store,
        user,
        PostSeed {
            title: "Flood report A",
            ..Default::default()
        },
    )
    .await;
    let busy = seed_post(
        &store,
        user,
        PostSeed {
            title: "Flood report B",
            created_at: Some((Utc::now() - Duration::hours(2)).to_rfc3339()),
            ..Default::default()
        },
    )
    .await;

    let now = Utc::now().to_rfc3339();
    comments::ActiveModel {
        id: NotSet,
        post_id: Set(busy),
        user_id: Set(user),
        content: Set("me too".to_string()),
        created_at: Set(now.clone()),
    }
    .insert(&store.conn)
    .await
    .unwrap();
    reactions::ActiveModel {
        id: NotSet,
        post_id: Set(busy),
        user_id: Set(user),
        reaction_type: Set("like".to_string()),
        created_at: Set(now),
    }
    .insert(&store.conn)
    .await
    .unwrap();

    let (status, body) = get_json(&app, "/api/search/posts?q=flood&sort=popularity").await;
    assert_eq!(status, StatusCode::OK);

    let posts = body["data"]["posts"].as_array().unwrap();
    assert_eq!(posts[0]["id"], busy);
    assert_eq!(posts[0]["comment_count"], 1);
    assert_eq!(posts[0]["reaction_count"], 1);
    assert_eq!(posts[1]["id"], quiet);
}

#[tokio::test]
async fn test_search_telemetry_backfill_and_suggestion() {
    let (app, store) = spawn_app().await;

    let user = seed_user(&store, UserSeed::default()).await;
    seed_post(
        &store,
        user,
        PostSeed {
            title: "Flood on 5th street",
            ..Default::default()
        },
    )
    .await;

    let (status, _) = get_json(&app, &format!("/api/search/posts?q=flood&user_id={user}")).await;
    assert_eq!(status, StatusCode::OK);

    // Telemetry writes are detached; poll for them.
    let mut logged = None;
    for _ in 0..100 {
        let rows = search_queries::Entity::find()
            .filter(search_queries::Column::UserId.eq(user))
            .all(&store.conn)
            .await
            .unwrap();
        if let Some(row) = rows.iter().find(|r| r.result_count > 0) {
            logged = Some(row.clone());
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }

    let logged = logged.expect("search query row was never backfilled");
    assert_eq!(logged.query_text, "flood");
    assert_eq!(logged.result_count, 1);

    let mut suggestion = None;
    for _ in 0..100 {
        let matches = store.suggestion_matches("flo", None, None, 10).await.unwrap();
        if let Some(m) = matches.first() {
            suggestion = Some(m.clone());
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }

    let suggestion = suggestion.expect("suggestion was never upserted");
    assert_eq!(suggestion.suggestion_text, "flood");
    assert_eq!(suggestion.search_count, 1);
}

#[tokio::test]
async fn test_suggestion_upsert_halving_average() {
    let (_app, store) = spawn_app().await;

    let now = Utc::now().to_rfc3339();
    store
        .upsert_suggestion("flood", "query", None, None, 4, &now)
        .await
        .unwrap();
    store
        .upsert_suggestion("flood", "query", None, None, 6, &now)
        .await
        .unwrap();

    let matches = store.suggestion_matches("flood", None, None, 10).await.unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].search_count, 2);
    // (4 + 6) / 2
    assert!((matches[0].result_count - 5.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_suggestions_endpoint_prefix_approval_and_echo() {
    let (app, store) = spawn_app().await;

    seed_suggestion(
        &store,
        SuggestionSeed {
            text: "flood watch",
            search_count: 10,
            ..Default::default()
        },
    )
    .await;
    seed_suggestion(
        &store,
        SuggestionSeed {
            text: "flood map",
            search_count: 2,
            ..Default::default()
        },
    )
    .await;
    seed_suggestion(
        &store,
        SuggestionSeed {
            text: "floodgate",
            search_count: 99,
            is_approved: false,
            ..Default::default()
        },
    )
    .await;
    seed_suggestion(
        &store,
        SuggestionSeed {
            text: "storm prep",
            search_count: 50,
            ..Default::default()
        },
    )
    .await;

    let (status, body) = get_json(&app, "/api/search/suggestions?q=flood").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["query"], "flood");

    // Prefix matches only, unapproved rows hidden, ordered by search count.
    let suggestions: Vec<&str> = body["data"]["suggestions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["text"].as_str().unwrap())
        .collect();
    assert_eq!(suggestions, vec!["flood watch", "flood map"]);

    // Popular ignores the prefix: approved terms searched more than five
    // times recently, busiest first.
    let popular: Vec<&str> = body["data"]["popular"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["text"].as_str().unwrap())
        .collect();
    assert_eq!(popular, vec!["storm prep", "flood watch"]);
}

#[tokio::test]
async fn test_trending_endpoint_gating_ordering_and_scope() {
    let (app, store) = spawn_app().await;

    seed_suggestion(
        &store,
        SuggestionSeed {
            text: "sandbags",
            search_count: 3,
            is_trending: true,
            trend_score: 9.0,
            ..Default::default()
        },
    )
    .await;
    seed_suggestion(
        &store,
        SuggestionSeed {
            text: "generators",
            search_count: 20,
            is_trending: true,
            trend_score: 5.0,
            ..Default::default()
        },
    )
    .await;
    seed_suggestion(
        &store,
        SuggestionSeed {
            text: "storm shelter",
            search_count: 10,
            is_trending: true,
            trend_score: 5.0,
            ..Default::default()
        },
    )
    .await;
    seed_suggestion(
        &store,
        SuggestionSeed {
            text: "road closures",
            search_count: 2,
            is_trending: true,
            trend_score: 1.0,
            city: "Austin",
            state: "TX",
            ..Default::default()
        },
    )
    .await;
    seed_suggestion(
        &store,
        SuggestionSeed {
            text: "flood",
            search_count: 50,
            is_trending: false,
            ..Default::default()
        },
    )
    .await;

    // Unscoped: trending rows only, trend score first, search count breaking
    // the tie.
    let (status, body) = get_json(&app, "/api/search/trending").await;
    assert_eq!(status, StatusCode::OK);
    let texts: Vec<&str> = body["data"]["trending"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["text"].as_str().unwrap())
        .collect();
    assert_eq!(
        texts,
        vec!["sandbags", "generators", "storm shelter", "road closures"]
    );
    assert!(body["data"]["location"]["city"].is_null());

    // A scope keeps region-wide rows but drops other cities' terms, and the
    // applied scope is echoed back.
    let (status, body) = get_json(&app, "/api/search/trending?city=Dallas&state=TX").await;
    assert_eq!(status, StatusCode::OK);
    let texts: Vec<&str> = body["data"]["trending"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["sandbags", "generators", "storm shelter"]);
    assert_eq!(body["data"]["location"]["city"], "Dallas");
    assert_eq!(body["data"]["location"]["state"], "TX");

    let (status, body) = get_json(&app, "/api/search/trending?city=Austin&state=TX").await;
    assert_eq!(status, StatusCode::OK);
    let texts: Vec<&str> = body["data"]["trending"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["text"].as_str().unwrap())
        .collect();
    assert!(texts.contains(&"road closures"));
}

#[tokio::test]
async fn test_anonymous_search_is_not_logged() {
    let (app, store) = spawn_app().await;

    let user = seed_user(&store, UserSeed::default()).await;
    seed_post(
        &store,
        user,
        PostSeed {
            title: "Flood watch",
            ..Default::default()
        },
    )
    .await;

    let (status, _) = get_json(&app, "/api/search/posts?q=flood").await;
    assert_eq!(status, StatusCode::OK);

    // Give any stray spawned write time to land before asserting absence.
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    let rows = search_queries::Entity::find().all(&store.conn).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_saved_search_round_trip() {
    let (app, store) = spawn_app().await;

    let user = seed_user(&store, UserSeed::default()).await;
    seed_post(
        &store,
        user,
        PostSeed {
            title: "Urgent flood help needed",
            priority: "urgent",
            ..Default::default()
        },
    )
    .await;
    seed_post(
        &store,
        user,
        PostSeed {
            title: "Flood pictures",
            priority: "low",
            ..Default::default()
        },
    )
    .await;

    let request = serde_json::json!({
        "name": "Urgent floods",
        "description": "Only the urgent ones",
        "query": "flood",
        "filters": { "priorities": ["urgent"] }
    });

    let (status, body) = post_json(
        &app,
        &format!("/api/search/saved?user_id={user}"),
        request.clone(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let saved_id = body["data"]["id"].as_i64().unwrap();

    // Saving under the same name overwrites instead of duplicating.
    let (status, body) = post_json(&app, &format!("/api/search/saved?user_id={user}"), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"].as_i64().unwrap(), saved_id);

    let (status, body) = get_json(&app, &format!("/api/search/saved?user_id={user}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = post_json(
        &app,
        &format!("/api/search/saved/{saved_id}/execute?user_id={user}"),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let posts = body["data"]["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"], "Urgent flood help needed");
}

#[tokio::test]
async fn test_saved_search_ownership_and_delete() {
    let (app, store) = spawn_app().await;

    let owner = seed_user(&store, UserSeed::default()).await;
    let other = seed_user(&store, UserSeed::default()).await;

    let (status, body) = post_json(
        &app,
        &format!("/api/search/saved?user_id={owner}"),
        serde_json::json!({ "name": "Mine", "query": "flood" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let saved_id = body["data"]["id"].as_i64().unwrap();

    // Another user cannot see, execute, or delete it.
    let (status, _) = post_json(
        &app,
        &format!("/api/search/saved/{saved_id}/execute?user_id={other}"),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let delete = |uri: String| {
        let app = app.clone();
        async move {
            app.oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
            .status()
        }
    };

    let status = delete(format!("/api/search/saved/{saved_id}?user_id={other}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let status = delete(format!("/api/search/saved/{saved_id}?user_id={owner}")).await;
    assert_eq!(status, StatusCode::OK);

    // Soft-deleted rows read as absent.
    let status = delete(format!("/api/search/saved/{saved_id}?user_id={owner}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get_json(&app, &format!("/api/search/saved?user_id={owner}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_save_search_validation() {
    let (app, store) = spawn_app().await;
    let user = seed_user(&store, UserSeed::default()).await;

    let (status, _) = post_json(
        &app,
        &format!("/api/search/saved?user_id={user}"),
        serde_json::json!({ "name": "  ", "query": "flood" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_json(
        &app,
        &format!("/api/search/saved?user_id={user}"),
        serde_json::json!({ "name": "Empty", "query": "" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_system_status() {
    let (app, store) = spawn_app().await;

    let user = seed_user(&store, UserSeed::default()).await;
    seed_post(&store, user, PostSeed::default()).await;

    let (status, body) = get_json(&app, "/api/system/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["database_ok"], true);
    assert_eq!(body["data"]["total_users"], 1);
    assert_eq!(body["data"]["total_posts"], 1);
    assert!(body["data"]["version"].is_string());
}
