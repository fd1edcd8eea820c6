mod session_cache_redis;

pub use session_cache_redis::*;
