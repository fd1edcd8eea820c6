mod credential_store_mem;
mod session_cache_mem;

pub use credential_store_mem::*;
pub use session_cache_mem::*;
