pub mod feed;
pub use feed::{FeedError, FeedService, NearbyFeed};

pub mod search;
pub use search::{SearchError, SearchPage, SearchService, SaveSearchRequest};

pub mod telemetry;
pub use telemetry::TelemetryService;
