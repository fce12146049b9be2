//! `MemeRepository` implementations.

mod in_memory;
mod sqlite;

pub use in_memory::InMemoryMemeRepository;
pub use sqlite::SqliteMemeRepository;
