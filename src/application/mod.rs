pub mod batch_run;
pub mod query_similar;
pub mod register_item;
