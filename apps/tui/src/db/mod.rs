pub mod migrations;
pub mod models;
pub mod queries;
pub mod store;

pub use migrations::{create_database_pool, setup_database};
pub use store::SqliteStore;
