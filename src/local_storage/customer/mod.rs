pub mod customer_local_storage;
pub mod customer_tables;
