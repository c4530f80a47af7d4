//! Core types for the Marquee IMDb snapshot loader.
//!
//! Reads the flat tab-separated snapshot files, normalises their records and
//! defines the [`CatalogSink`](sink::CatalogSink) seam the loader writes
//! through. This crate is deliberately free of database dependencies.

pub mod dataset;
pub mod error;
pub mod model;
pub mod record;
pub mod sink;
pub mod source;

pub use error::{Error, Result};
