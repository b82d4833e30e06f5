use std::fmt::Display;

/// Namespace shared by every recommendation key
pub const KEY_PREFIX: &str = "user_recommendations:";

/// Storage key of a user's recommendation record.
///
/// The user id is embedded verbatim, so callers must supply ids that are safe
/// to use inside a Redis key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecommendationKey<'a>(&'a str);

impl<'a> RecommendationKey<'a> {
    pub fn new(user_id: &'a str) -> Self {
        Self(user_id)
    }

    /// Glob pattern matching every recommendation key
    pub fn pattern() -> String {
        format!("{}*", KEY_PREFIX)
    }

    /// Extracts the user id from a raw storage key
    pub fn user_id_from(key: &str) -> Option<&str> {
        key.strip_prefix(KEY_PREFIX).filter(|id| !id.is_empty())
    }
}

impl Display for RecommendationKey<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", KEY_PREFIX, self.0)
    }
}
