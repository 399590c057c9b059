pub mod post;
pub mod saved_search;
pub mod search_log;
pub mod user;
