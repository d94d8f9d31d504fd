pub mod calculations;
pub mod db;
pub mod models;
pub mod tables;

pub use calculations::{CalculationResult, FeeCalculator, calculate, calculate_with};
pub use db::repository::{ProjectRepository, RepositoryError};
pub use models::*;
