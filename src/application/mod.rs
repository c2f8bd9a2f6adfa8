//! Application services: cache-aside reads and invalidating writes over the repositories.

pub mod categories;
pub mod envelope;
pub mod error;
pub mod pagination;
pub mod products;
mod read_through;
pub mod repos;
