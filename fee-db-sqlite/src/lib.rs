//! SQLite storage backend for saved design-fee projects.

mod factory;
mod repository;

pub use factory::SqliteRepositoryFactory;
pub use repository::SqliteRepository;
