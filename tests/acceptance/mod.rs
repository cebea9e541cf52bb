//! Integration tests for qenc acceptance testing.
//!
//! - Position reconstruction over long multi-wrap motions
//! - Driver behavior with well-behaved and faulty counter sources
//! - Configuration files and sampling-rate checks

mod config_test;
mod driver_test;
