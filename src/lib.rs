pub mod config;
pub mod error;
pub mod local_storage;

#[cfg(test)]
pub mod test;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use error::Result;
use local_storage::cloth::cloth_tables::ClothTable;
use local_storage::customer::customer_tables::CustomerTable;
use local_storage::work::work_tables::WorkTable;
use local_storage::{CoreLocalStorage, SchemaRegistry};

/// Creates the database file and the three well-known tables.
pub fn initialize_database(db_path: &str) -> Result<()> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let conn = rusqlite::Connection::open(db_path)?;

    conn.execute(&CustomerTable::create_table(), [])?;
    conn.execute(&ClothTable::create_table(), [])?;
    conn.execute(&WorkTable::create_table(), [])?;

    Ok(())
}

/// Builds the schema registry over an open database, seeded with the
/// well-known tables and refreshed from the live schema so the cache
/// starts out matching reality.
pub fn initialize_registry(core_storage: Arc<CoreLocalStorage>) -> Result<SchemaRegistry> {
    let registry = SchemaRegistry::new(core_storage.clone());

    registry.register(CustomerTable::TABLE_NAME, CustomerTable::column_map());
    registry.register(ClothTable::TABLE_NAME, ClothTable::column_map());
    registry.register(WorkTable::TABLE_NAME, WorkTable::column_map());

    for table in [
        CustomerTable::TABLE_NAME,
        ClothTable::TABLE_NAME,
        WorkTable::TABLE_NAME,
    ] {
        if core_storage.table_exists(table)? {
            registry.refresh(table)?;
        }
    }

    Ok(registry)
}
