//! Integration test harness

mod catalog_flow_tests;
mod report_tests;
mod storage_tests;
