//! Study-hours based mark prediction.
//!
//! Records come from a manual entry grid or an uploaded CSV, get a predicted
//! mark and a recommendation each, and can be summarized, charted and
//! exported as xlsx, JSON, CSV, HTML or PDF.

pub mod app;
pub mod charts;
pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod output;
pub mod records;
pub mod reports;
pub mod scoring;
pub mod session;
pub mod types;
pub mod util;

pub use error::{AppError, Result};
pub use records::RecordSet;
pub use scoring::{recommend, score, Mode, Recommendation};
pub use types::StudyRecord;
