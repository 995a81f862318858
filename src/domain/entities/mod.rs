pub mod catalog_record;
pub mod query_match;
pub mod run_report;
