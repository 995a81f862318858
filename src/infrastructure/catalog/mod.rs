pub mod json_catalog;
