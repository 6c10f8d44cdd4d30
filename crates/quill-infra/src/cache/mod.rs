//! Cache implementations.

mod memory;

pub use memory::InMemoryCache;
