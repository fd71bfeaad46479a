//! Repository ports and their adapters.
//!
//! Services depend only on the traits in [`ports`]; the PostgreSQL adapter
//! lives behind the `database` feature.

pub mod ports;

#[cfg(feature = "database")]
pub mod postgres;

pub use ports::{
    images::{ImageRepository, ImageUpdateDocument, NewImageDocument, PopulatedImage},
    users::UserRepository,
};

#[cfg(feature = "database")]
pub use postgres::{PostgresDatabase, PostgresImageRepository, PostgresUserRepository};
