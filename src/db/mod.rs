pub mod backend;
pub mod key;
pub mod memory;
pub mod redis;
pub mod store;

pub use backend::KeyValueBackend;
pub use key::{RecommendationKey, KEY_PREFIX};
pub use memory::MemoryBackend;
pub use self::redis::RedisBackend;
pub use store::RecommendationStore;

#[cfg(test)]
pub use backend::MockKeyValueBackend;
