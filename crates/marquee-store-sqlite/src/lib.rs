//! SQLite backend for the Marquee loader.
//!
//! A [`BulkLoadSession`] owns one `rusqlite` connection for the whole run and
//! implements [`CatalogSink`](marquee_core::sink::CatalogSink) on top of it.

mod dimension;
mod session;
mod table;

pub mod error;

pub use dimension::DimensionCache;
pub use error::{Error, Result};
pub use session::BulkLoadSession;
pub use table::{InsertPolicy, Table};
