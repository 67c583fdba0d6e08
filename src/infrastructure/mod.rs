pub mod clock;
pub mod log_sink;
pub mod memory_store;
pub mod sqlite_store;
