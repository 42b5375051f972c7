//! Maintenance commands run from the command line.

pub mod report;
pub mod seed;

pub use report::{ReportOptions, ReportSummary};
pub use seed::{SeedOptions, SeedSummary};
