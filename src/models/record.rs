use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Canonical on-the-wire shape of a stored recommendation list
#[derive(Debug, Serialize)]
pub struct RecommendationRecord<'a> {
    pub user_id: &'a str,
    pub recommend_movie: &'a [String],
}

impl<'a> RecommendationRecord<'a> {
    pub fn new(user_id: &'a str, movies: &'a [String]) -> Self {
        Self {
            user_id,
            recommend_movie: movies,
        }
    }

    pub fn encode(&self) -> StoreResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Every payload shape accepted when reading a record back.
///
/// The canonical object is tried first; older producers wrote a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredPayload {
    Canonical { recommend_movie: Vec<String> },
    BareList(Vec<String>),
}

/// Decodes a stored payload into its ordered movie ids
pub fn decode_movies(raw: &str) -> StoreResult<Vec<String>> {
    match serde_json::from_str::<StoredPayload>(raw) {
        Ok(StoredPayload::Canonical { recommend_movie }) => Ok(recommend_movie),
        Ok(StoredPayload::BareList(movies)) => Ok(movies),
        Err(e) => Err(StoreError::MalformedRecord(e.to_string())),
    }
}
