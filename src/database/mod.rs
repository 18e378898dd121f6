pub mod connection;
pub mod mongo;

pub use connection::*;
pub use mongo::*;
