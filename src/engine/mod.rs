pub mod aggregate;
pub mod errors;
pub mod shard;
pub mod source;
pub mod types;

pub use errors::*;
