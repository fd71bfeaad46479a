//! # Vistoria Core
//!
//! Business logic for the Vistoria image gallery: the image catalog, its
//! public/private visibility rules, paginated and searchable listings, user
//! provisioning, and the PostgreSQL adapters behind them.
//!
//! ## Feature Flags
//!
//! - `database`: PostgreSQL adapters (SQLx) and the embedded migrator
//! - `test-utils`: in-memory ports for downstream test suites
//!
//! ## Architecture
//!
//! - [`catalog`]: visibility state machine, query builder, and the
//!   [`catalog::ImageCatalogService`] operations
//! - [`database`]: repository ports and their PostgreSQL implementations
//! - [`cache`]: the cache-invalidation port mutations push to
//! - [`users`]: mapping identity-provider subjects onto internal users

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

/// Route templates shared by the server and its clients
pub mod api_routes;

/// JSON response envelope
pub mod api_types;

/// Cache invalidation port
pub mod cache;

/// Image catalog operations and rules
pub mod catalog;

/// Repository ports and database adapters
pub mod database;

/// Error types and error handling utilities
pub mod error;

/// Internal user provisioning
pub mod users;

/// In-memory ports for tests
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

#[cfg(feature = "database")]
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub use api_types::ApiResponse;
pub use error::{CatalogError, Result};
pub use vistoria_model as model;
