pub mod config;
pub mod csv;
pub mod record_store;
pub mod storage;
