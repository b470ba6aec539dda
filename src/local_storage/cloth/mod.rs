pub mod cloth_local_storage;
pub mod cloth_tables;
