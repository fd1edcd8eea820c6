// store

mod session_cache;

pub use session_cache::*;

// repo

mod credential_store;

pub use credential_store::*;

// outbound

mod completion_client;

pub use completion_client::*;
