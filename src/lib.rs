#![forbid(unsafe_code)]

//! Core library for the `jimports` automatic import manager.

pub mod cli;
pub mod diagnostics;
pub mod driver;
pub mod environment;
pub mod error;
pub mod frontend;
pub mod logging;
pub mod scan;
pub mod version;

pub use driver::{FixReport, ImportDriver};
pub use error::{Error, Result};
pub use scan::{CancellationToken, ScanResult, extend, scan};
