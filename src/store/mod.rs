//! Persistence layer: libSQL-backed storage for projects and onboarding
//! documents.

pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use traits::ProjectStore;
