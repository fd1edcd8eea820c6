mod completion_client_fake;
mod completion_client_http;

pub use completion_client_fake::*;
pub use completion_client_http::*;
