//! # Adverts Database Crate
//!
//! This crate is the application-specific interface to the PostgreSQL
//! database. It owns all persisted advert state.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** All SQL lives here. The rest of the application talks to the
//!   [`AdvertRepository`] trait and never sees a query.
//! - **Scoped sessions:** Each repository operation opens one [`Session`]
//!   (a transaction) from the [`SessionProvider`] and either commits it or
//!   lets it roll back on drop.
//! - **Asynchronous & Pooled:** All operations are asynchronous and share a
//!   bounded connection pool (`PgPool`).
//!
//! ## Public API
//!
//! - `SessionProvider`: created once at startup (`init` connects and applies
//!   the create-if-absent schema), closed on shutdown.
//! - `DbRepository`: the PostgreSQL implementation of `AdvertRepository`.
//! - `LocalRepository`: an in-memory implementation used by the test suites.
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod local;
pub mod repository;
pub mod session;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use local::LocalRepository;
pub use repository::{AdvertRepository, DbRepository};
pub use session::{Session, SessionProvider};
