pub mod core_local_storage;
pub mod schema_registry;

pub mod cloth;
pub mod customer;
pub mod work;

pub use core_local_storage::CoreLocalStorage;
pub use schema_registry::SchemaRegistry;
