//! SQLite backend for the Direktori IBS store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Each store method is one `call`
//! closure; multi-step writes run inside a transaction that rolls back when
//! dropped.

mod company;
mod directory;
mod encode;
mod field_worker;
mod history;
mod import;
mod integrity;
mod lookup;
mod query;
mod schema;
mod store;
mod survey;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
