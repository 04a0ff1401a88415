//! `trackprep` - preparation pipeline for penguin satellite-tracking data
//!
//! This library loads raw tracking records from CSV files, imputes missing
//! values, derives colony-distance and calendar features, one-hot encodes
//! the categorical columns, and stores the result as CSV and `SQLite`.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod catalog;
pub mod check;
pub mod cli;
pub mod config;
pub mod error;
pub mod frame;
pub mod ingest;
pub mod logging;
pub mod pipeline;
pub mod storage;

pub use check::{check_file, CheckReport};
pub use config::Config;
pub use error::{Error, Result};
pub use frame::{Frame, Value};
pub use ingest::load_data;
pub use logging::init_logging;
pub use pipeline::{Pipeline, ProcessReport};
pub use storage::{save, SavedOutputs, SqliteExport};
