//! `depot-store` — Postgres persistence, attachment lifecycle, and
//! spreadsheet import/export.
//!
//! Layout:
//! - `db`: pool construction + embedded migrations
//! - `repo/`: one repository per resource (direct queries, no caching)
//! - `attachments`: per-code image directories on the local filesystem
//! - `sheet`: xlsx workbook read/write

pub mod attachments;
pub mod db;
pub mod error;
pub mod repo;
pub mod sheet;

pub use attachments::{AttachmentStore, UploadedFile};
pub use error::{StoreError, StoreResult};
