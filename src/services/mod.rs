pub mod auth_service;
pub mod profile_filter;
pub mod profile_service;
pub mod session_service;
pub mod token_service;

pub use session_service::*;
pub use token_service::*;
