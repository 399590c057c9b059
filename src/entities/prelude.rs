pub use super::comments::Entity as Comments;
pub use super::posts::Entity as Posts;
pub use super::reactions::Entity as Reactions;
pub use super::saved_searches::Entity as SavedSearches;
pub use super::search_queries::Entity as SearchQueries;
pub use super::search_suggestions::Entity as SearchSuggestions;
pub use super::users::Entity as Users;
