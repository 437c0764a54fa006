//! costboard - terminal dashboard for AWS cost reports
//!
//! Fetches the daily Cost Explorer report once, normalizes it into a
//! per-day per-service cost table, and derives filtered, weekly, and
//! exportable views from it.

pub mod cli;
pub mod config;
pub mod export;
pub mod services;
pub mod tui;
pub mod types;
