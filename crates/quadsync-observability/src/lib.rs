mod coordinator;
mod index;
mod repository;

pub use coordinator::*;
pub use index::*;
pub use repository::*;
