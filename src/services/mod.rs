pub mod recommendations;

pub use recommendations::{
    default_recommendations, RecommendationService, DEFAULT_RECOMMENDATIONS, DEFAULT_TTL_SECS,
    MAX_TTL_SECS,
};
