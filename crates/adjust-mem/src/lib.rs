#[macro_use]

mod macros;
mod allocator;
mod global_alloc;
mod errors;

pub mod misuse;
pub mod adjustable_array;

pub use allocator::Allocator;
pub use global_alloc::{GlobalAlloc, GLOBAL_ALLOC};
pub use errors::CapacityError;
pub use misuse::{Misuse, Misuses};
pub use adjustable_array::{AdjustableArray, GlobalArray};

pub type Result<T> = core::result::Result<T, CapacityError>;
