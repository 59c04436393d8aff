mod date_range;
mod error;
mod expense;
mod filter;
mod money;
mod owner;
mod sort;
mod summary;

pub use date_range::*;
pub use error::*;
pub use expense::*;
pub use filter::*;
pub use money::*;
pub use owner::*;
pub use sort::*;
pub use summary::*;
