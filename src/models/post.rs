use serde::{Deserialize, Serialize};

use crate::geo::Point;

/// The fixed post-type vocabulary. Stored as strings in the database; the
/// enum exists for filter parsing, so unknown stored values stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostType {
    HelpRequest,
    HelpOffer,
    LostFound,
    SafetyAlert,
    General,
}

impl PostType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HelpRequest => "help_request",
            Self::HelpOffer => "help_offer",
            Self::LostFound => "lost_found",
            Self::SafetyAlert => "safety_alert",
            Self::General => "general",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "help_request" => Some(Self::HelpRequest),
            "help_offer" => Some(Self::HelpOffer),
            "lost_found" => Some(Self::LostFound),
            "safety_alert" => Some(Self::SafetyAlert),
            "general" => Some(Self::General),
            _ => None,
        }
    }

    /// Parses a comma-separated list, silently dropping unknown entries.
    #[must_use]
    pub fn parse_list(value: &str) -> Vec<Self> {
        value.split(',').filter_map(Self::parse).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Urgent,
    High,
    Normal,
    Low,
}

impl Priority {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::High => "high",
            Self::Normal => "normal",
            Self::Low => "low",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "urgent" => Some(Self::Urgent),
            "high" => Some(Self::High),
            "normal" => Some(Self::Normal),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    #[must_use]
    pub fn parse_list(value: &str) -> Vec<Self> {
        value.split(',').filter_map(Self::parse).collect()
    }

    /// Sort rank: urgent=1 .. low=4. Strings that are not part of the
    /// vocabulary rank 5 so they sort last.
    #[must_use]
    pub fn rank_of(value: &str) -> u8 {
        Self::parse(value).map_or(5, |p| match p {
            Self::Urgent => 1,
            Self::High => 2,
            Self::Normal => 3,
            Self::Low => 4,
        })
    }
}

/// A community post as the feed and search layers see it.
///
/// `post_type` and `priority` stay raw strings here: the database is the
/// source of truth and pre-enum rows must still rank and render.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub content: String,
    pub post_type: String,
    pub priority: String,
    pub is_emergency: bool,
    pub is_resolved: bool,
    pub location: Option<Point>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub county: Option<String>,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub expires_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Minimal author projection joined onto feed/search results for display.
#[derive(Debug, Clone, Serialize)]
pub struct PostAuthor {
    pub first_name: String,
    pub last_name: String,
    pub profile_image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_rank_order() {
        assert_eq!(Priority::rank_of("urgent"), 1);
        assert_eq!(Priority::rank_of("high"), 2);
        assert_eq!(Priority::rank_of("normal"), 3);
        assert_eq!(Priority::rank_of("low"), 4);
    }

    #[test]
    fn test_unknown_priority_ranks_last() {
        assert_eq!(Priority::rank_of("critical"), 5);
        assert_eq!(Priority::rank_of(""), 5);
    }

    #[test]
    fn test_parse_list_drops_unknown() {
        let types = PostType::parse_list("safety_alert,bogus, general");
        assert_eq!(types, vec![PostType::SafetyAlert, PostType::General]);

        let priorities = Priority::parse_list("urgent,,whatever,low");
        assert_eq!(priorities, vec![Priority::Urgent, Priority::Low]);
    }
}
