mod assistant_service;
mod auth_service;
mod user_service;

pub use assistant_service::*;
pub use auth_service::*;
pub use user_service::*;
