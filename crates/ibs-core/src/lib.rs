//! Core types and trait definitions for the Direktori IBS back end.
//!
//! This crate is deliberately free of HTTP, database and spreadsheet
//! dependencies. Every other crate in the workspace depends on it.

// Native `async fn` in traits; the store trait spells out its `Send` bounds.
#![allow(async_fn_in_trait)]

pub mod company;
pub mod directory;
pub mod error;
pub mod export;
pub mod field_worker;
pub mod history;
pub mod import;
pub mod lookup;
pub mod query;
pub mod sheet;
pub mod store;
pub mod survey;
pub mod unique;
pub mod validate;

pub use error::{Error, Result};
