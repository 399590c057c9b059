pub mod location;
pub mod post;
pub mod search;

pub use location::{LocationScope, UserProfile, resolve_location};
pub use post::{Post, PostAuthor, PostType, Priority};
pub use search::{PageParams, ResolvedFilter, SearchFilters, SortMode};
