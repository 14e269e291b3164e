mod alloc;
pub mod error;
#[cfg(feature = "llrb")]
pub mod llrb;
pub mod rbtree;
mod set;
pub mod verify;

pub use error::{AllocError, Error};
#[cfg(feature = "llrb")]
pub use llrb::LlrbSet;
pub use rbtree::RbSet;
pub use set::{Color, OrderedSet};
