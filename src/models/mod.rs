pub mod profile;
pub mod user_type;

pub use profile::*;
pub use user_type::*;
