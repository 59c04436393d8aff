// Application layer - use cases and orchestration on top of a store.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
