//! Report file output.
//!
//! - plain-text summary (`export::write_summary_text`)
//! - structured JSON (`export::write_report_json`)

pub mod export;

pub use export::*;
