//! Report handles returned by a turn
//!
//! Reports are materialized asynchronously server-side. A turn deduplicates
//! the handles it receives and resolves each one to a presentable result
//! before committing.

mod registry;
mod resolver;

#[cfg(test)]
mod proptests;

pub use registry::dedupe_reports;
pub use resolver::{ReportResolver, Resolution};
