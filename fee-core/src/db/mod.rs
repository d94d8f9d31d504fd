pub mod factory;
pub mod in_memory;
pub mod repository;

pub use factory::{DbConfig, RepositoryFactory, RepositoryRegistry};
pub use in_memory::{InMemoryProjectRepository, InMemoryRepositoryFactory};
pub use repository::{ProjectRepository, RepositoryError};
