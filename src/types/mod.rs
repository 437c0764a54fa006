//! Type definitions for costboard

mod error;
mod report;

pub use error::*;
pub use report::*;
