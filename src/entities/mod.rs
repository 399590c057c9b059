pub mod prelude;

pub mod comments;
pub mod posts;
pub mod reactions;
pub mod saved_searches;
pub mod search_queries;
pub mod search_suggestions;
pub mod users;
