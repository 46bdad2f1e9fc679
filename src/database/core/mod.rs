//! Core storage infrastructure
//!
//! This module provides the foundational storage components used throughout nebula:
//! - `RecordFile`: JSON documents on disk with create-if-absent and atomic saves
//! - `DatabaseImage`: a SQLite file loaded wholesale into an in-memory connection

mod image;
mod record_file;

pub use image::DatabaseImage;
pub use record_file::{write_atomic, RecordFile};
