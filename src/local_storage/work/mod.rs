pub mod work_local_storage;
pub mod work_tables;
