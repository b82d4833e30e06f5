pub mod backend;

pub use backend::create_redis_client;
pub use backend::RedisBackend;
