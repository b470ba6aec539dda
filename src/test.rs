use crate::error::Result;
use crate::local_storage::cloth::cloth_local_storage::ClothLocalStorage;
use crate::local_storage::cloth::cloth_tables::{ClothTable, MeasureTable};
use crate::local_storage::core_local_storage::CoreLocalStorage;
use crate::local_storage::customer::customer_local_storage::CustomerLocalStorage;
use crate::local_storage::customer::customer_tables::CustomerTable;
use crate::local_storage::schema_registry::SchemaRegistry;
use crate::local_storage::work::work_local_storage::{Work, WorkLocalStorage};

use std::fs;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

// Helper function to setup a test database
fn setup_test_db() -> (String, Arc<CoreLocalStorage>) {
    let test_id = Uuid::new_v4().to_string();
    let db_path = std::env::temp_dir()
        .join(format!("schneiderei_test_{}.db", test_id))
        .to_string_lossy()
        .into_owned();

    crate::initialize_database(&db_path).expect("Failed to initialize database");

    let core_storage =
        Arc::new(CoreLocalStorage::new(&db_path).expect("Failed to create core storage"));

    (db_path, core_storage)
}

// Helper function to clean up test database
fn teardown_test_db(db_path: &str) {
    if Path::new(db_path).exists() {
        fs::remove_file(db_path).expect("Failed to remove test database");
    }
}

fn setup_registry(core_storage: &Arc<CoreLocalStorage>) -> Arc<SchemaRegistry> {
    Arc::new(crate::initialize_registry(core_storage.clone()).expect("Failed to build registry"))
}

// Column names of a table, straight from the database.
fn pragma_columns(core_storage: &CoreLocalStorage, table_name: &str) -> Vec<String> {
    let conn = core_storage.get_connection();
    let query = format!("PRAGMA table_info({})", table_name);
    let mut stmt = conn.prepare(&query).expect("Failed to prepare pragma");
    let rows = stmt
        .query_map([], |row| row.get::<_, String>("name"))
        .expect("Failed to query pragma");

    let mut names: Vec<String> = rows.map(|r| r.expect("Failed to read pragma row")).collect();
    names.sort();
    names
}

fn sorted_registry_columns(registry: &SchemaRegistry, table_name: &str) -> Vec<String> {
    let mut names: Vec<String> = registry
        .columns(table_name)
        .expect("No registry entry")
        .into_keys()
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod core_storage_tests {
    use super::*;
    use serde_json::json;

    fn create_probe_table(core_storage: &CoreLocalStorage) {
        let conn = core_storage.get_connection();
        conn.execute(
            "CREATE TABLE IF NOT EXISTS probe (
                id INTEGER,
                name TEXT,
                value INTEGER
            )",
            [],
        )
        .expect("Failed to create probe table");
    }

    #[test]
    fn test_insert_and_get_by_column() -> Result<()> {
        let (db_path, core_storage) = setup_test_db();
        create_probe_table(&core_storage);

        core_storage.insert("probe", &json!({"id": 1, "name": "thread", "value": 42}))?;

        let rows = core_storage.get_by_column("probe", "id", &json!(1))?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name").and_then(|v| v.as_str()), Some("thread"));
        assert_eq!(rows[0].get("value").and_then(|v| v.as_i64()), Some(42));

        teardown_test_db(&db_path);
        Ok(())
    }

    #[test]
    fn test_update_changes_row() -> Result<()> {
        let (db_path, core_storage) = setup_test_db();
        create_probe_table(&core_storage);

        core_storage.insert("probe", &json!({"id": 1, "name": "thread", "value": 42}))?;
        let affected =
            core_storage.update("probe", "id", &json!({"id": 1, "name": "needle", "value": 7}))?;
        assert_eq!(affected, 1);

        let rows = core_storage.get_by_column("probe", "id", &json!(1))?;
        assert_eq!(rows[0].get("name").and_then(|v| v.as_str()), Some("needle"));
        assert_eq!(rows[0].get("value").and_then(|v| v.as_i64()), Some(7));

        teardown_test_db(&db_path);
        Ok(())
    }

    #[test]
    fn test_insert_or_update_does_not_duplicate() -> Result<()> {
        let (db_path, core_storage) = setup_test_db();
        create_probe_table(&core_storage);

        core_storage.insert_or_update("probe", "id", &json!({"id": 5, "name": "first"}))?;
        core_storage.insert_or_update("probe", "id", &json!({"id": 5, "name": "second"}))?;

        let rows = core_storage.get_all("probe")?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name").and_then(|v| v.as_str()), Some("second"));

        teardown_test_db(&db_path);
        Ok(())
    }

    #[test]
    fn test_delete_by_column_removes_row() -> Result<()> {
        let (db_path, core_storage) = setup_test_db();
        create_probe_table(&core_storage);

        core_storage.insert("probe", &json!({"id": 1, "name": "gone", "value": 0}))?;
        let deleted = core_storage.delete_by_column("probe", "id", &json!(1))?;
        assert_eq!(deleted, 1);

        let rows = core_storage.get_by_column("probe", "id", &json!(1))?;
        assert!(rows.is_empty());

        teardown_test_db(&db_path);
        Ok(())
    }

    #[test]
    fn test_select_columns_projection_and_headers() -> Result<()> {
        let (db_path, core_storage) = setup_test_db();
        create_probe_table(&core_storage);

        core_storage.insert("probe", &json!({"id": 1, "name": "silk", "value": null}))?;

        let (headers, rows) = core_storage.select_columns("probe", &[])?;
        assert_eq!(headers, vec!["id", "name", "value"]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], vec!["1", "silk", "NULL"]);

        let projection = vec!["name".to_string()];
        let (headers, rows) = core_storage.select_columns("probe", &projection)?;
        assert_eq!(headers, vec!["name"]);
        assert_eq!(rows[0], vec!["silk"]);

        teardown_test_db(&db_path);
        Ok(())
    }

    #[test]
    fn test_table_exists_and_filled() -> Result<()> {
        let (db_path, core_storage) = setup_test_db();
        create_probe_table(&core_storage);

        assert!(core_storage.table_exists("probe")?);
        assert!(!core_storage.table_exists("missing")?);

        assert!(!core_storage.table_filled("probe")?);
        core_storage.insert("probe", &json!({"id": 1, "name": "a", "value": 1}))?;
        assert!(core_storage.table_filled("probe")?);

        teardown_test_db(&db_path);
        Ok(())
    }

    #[test]
    fn test_max_id_casts_text_ids() -> Result<()> {
        let (db_path, core_storage) = setup_test_db();

        {
            let conn = core_storage.get_connection();
            conn.execute("CREATE TABLE text_ids (id TEXT)", [])
                .expect("Failed to create table");
        }
        assert_eq!(core_storage.max_id("text_ids", "id")?, 0);

        core_storage.insert("text_ids", &json!({"id": "7"}))?;
        core_storage.insert("text_ids", &json!({"id": "12"}))?;
        assert_eq!(core_storage.max_id("text_ids", "id")?, 12);

        teardown_test_db(&db_path);
        Ok(())
    }
}

#[cfg(test)]
mod schema_registry_tests {
    use super::*;
    use crate::local_storage::schema_registry::ColumnMap;
    use serde_json::json;

    #[test]
    fn test_create_table_registers_and_matches_pragma() -> Result<()> {
        let (db_path, core_storage) = setup_test_db();
        let registry = setup_registry(&core_storage);

        let mut columns = ColumnMap::new();
        columns.insert("id".to_string(), "INTEGER".to_string());
        columns.insert("amount".to_string(), "INTEGER".to_string());
        registry.create_table("inventory", &columns)?;

        assert!(core_storage.table_exists("inventory")?);
        assert_eq!(
            sorted_registry_columns(&registry, "inventory"),
            pragma_columns(&core_storage, "inventory")
        );

        teardown_test_db(&db_path);
        Ok(())
    }

    #[test]
    fn test_add_column_updates_registry_and_db() -> Result<()> {
        let (db_path, core_storage) = setup_test_db();
        let registry = setup_registry(&core_storage);

        registry.add_column(CustomerTable::TABLE_NAME, "address", "TEXT")?;

        let columns = registry.columns(CustomerTable::TABLE_NAME).unwrap();
        assert_eq!(columns.get("address").map(String::as_str), Some("TEXT"));
        assert_eq!(
            sorted_registry_columns(&registry, CustomerTable::TABLE_NAME),
            pragma_columns(&core_storage, CustomerTable::TABLE_NAME)
        );

        teardown_test_db(&db_path);
        Ok(())
    }

    #[test]
    fn test_drop_column_preserves_remaining_data() -> Result<()> {
        let (db_path, core_storage) = setup_test_db();
        let registry = setup_registry(&core_storage);

        let mut columns = ColumnMap::new();
        columns.insert("id".to_string(), "INTEGER".to_string());
        columns.insert("name".to_string(), "TEXT".to_string());
        columns.insert("scrap".to_string(), "TEXT".to_string());
        registry.create_table("bolts", &columns)?;

        core_storage.insert("bolts", &json!({"id": 1, "name": "linen", "scrap": "x"}))?;
        core_storage.insert("bolts", &json!({"id": 2, "name": "wool", "scrap": "y"}))?;

        registry.drop_column("bolts", "scrap")?;

        let pragma = pragma_columns(&core_storage, "bolts");
        assert!(!pragma.contains(&"scrap".to_string()));
        assert_eq!(sorted_registry_columns(&registry, "bolts"), pragma);

        let rows = core_storage.get_all("bolts")?;
        assert_eq!(rows.len(), 2);
        let mut names: Vec<&str> = rows
            .iter()
            .filter_map(|r| r.get("name").and_then(|v| v.as_str()))
            .collect();
        names.sort();
        assert_eq!(names, vec!["linen", "wool"]);

        teardown_test_db(&db_path);
        Ok(())
    }

    #[test]
    fn test_rename_column_keeps_data() -> Result<()> {
        let (db_path, core_storage) = setup_test_db();
        let registry = setup_registry(&core_storage);

        core_storage.insert(
            CustomerTable::TABLE_NAME,
            &json!({"customer_id": 1, "customer_name": "Mira", "phone_no": 5551234, "age": "31"}),
        )?;

        registry.rename_column(CustomerTable::TABLE_NAME, "phone_no", "telephone")?;

        let pragma = pragma_columns(&core_storage, CustomerTable::TABLE_NAME);
        assert!(pragma.contains(&"telephone".to_string()));
        assert!(!pragma.contains(&"phone_no".to_string()));
        assert_eq!(
            sorted_registry_columns(&registry, CustomerTable::TABLE_NAME),
            pragma
        );

        let rows = core_storage.get_by_column(CustomerTable::TABLE_NAME, "customer_id", &json!(1))?;
        assert_eq!(
            rows[0].get("telephone").and_then(|v| v.as_i64()),
            Some(5551234)
        );

        teardown_test_db(&db_path);
        Ok(())
    }

    #[test]
    fn test_rename_table_moves_registry_entry() -> Result<()> {
        let (db_path, core_storage) = setup_test_db();
        let registry = setup_registry(&core_storage);

        registry.rename_table(ClothTable::TABLE_NAME, "fabrics")?;

        assert!(core_storage.table_exists("fabrics")?);
        assert!(!core_storage.table_exists(ClothTable::TABLE_NAME)?);
        assert!(registry.contains("fabrics"));
        assert!(!registry.contains(ClothTable::TABLE_NAME));

        teardown_test_db(&db_path);
        Ok(())
    }

    #[test]
    fn test_rename_missing_table_is_an_error() {
        let (db_path, core_storage) = setup_test_db();
        let registry = setup_registry(&core_storage);

        assert!(registry.rename_table("no_such_table", "whatever").is_err());

        teardown_test_db(&db_path);
    }

    #[test]
    fn test_refresh_reflects_out_of_band_change() -> Result<()> {
        let (db_path, core_storage) = setup_test_db();
        let registry = setup_registry(&core_storage);

        {
            let conn = core_storage.get_connection();
            conn.execute("ALTER TABLE customer ADD COLUMN note TEXT", [])
                .expect("Failed to alter table");
        }

        // The registry has not seen the change yet.
        let columns = registry.columns(CustomerTable::TABLE_NAME).unwrap();
        assert!(!columns.contains_key("note"));

        registry.refresh(CustomerTable::TABLE_NAME)?;
        let columns = registry.columns(CustomerTable::TABLE_NAME).unwrap();
        assert_eq!(columns.get("note").map(String::as_str), Some("TEXT"));

        teardown_test_db(&db_path);
        Ok(())
    }
}

#[cfg(test)]
mod customer_tests {
    use super::*;

    #[test]
    fn test_add_and_get_customer() -> Result<()> {
        let (db_path, core_storage) = setup_test_db();
        let storage = CustomerLocalStorage::new(core_storage.clone())?;

        let added = storage.add_customer("Amara Osei", 5559001, "42")?;
        assert_eq!(added.customer_id, 1);

        let fetched = storage
            .get_customer_by_id(added.customer_id)?
            .expect("Customer missing");
        assert_eq!(fetched.customer_name, "Amara Osei");
        assert_eq!(fetched.phone_no, 5559001);
        assert_eq!(fetched.age, "42");

        teardown_test_db(&db_path);
        Ok(())
    }

    #[test]
    fn test_ids_are_sequential() -> Result<()> {
        let (db_path, core_storage) = setup_test_db();
        let storage = CustomerLocalStorage::new(core_storage.clone())?;

        let first = storage.add_customer("First", 1, "20")?;
        let second = storage.add_customer("Second", 2, "30")?;
        let third = storage.add_customer("Third", 3, "40")?;

        assert_eq!(
            (first.customer_id, second.customer_id, third.customer_id),
            (1, 2, 3)
        );

        teardown_test_db(&db_path);
        Ok(())
    }

    #[test]
    fn test_update_customer() -> Result<()> {
        let (db_path, core_storage) = setup_test_db();
        let storage = CustomerLocalStorage::new(core_storage.clone())?;

        let mut customer = storage.add_customer("Old Name", 100, "50")?;
        customer.customer_name = "New Name".to_string();
        customer.age = "51".to_string();
        storage.save_customer(&customer)?;

        let fetched = storage
            .get_customer_by_id(customer.customer_id)?
            .expect("Customer missing");
        assert_eq!(fetched.customer_name, "New Name");
        assert_eq!(fetched.age, "51");

        let all = storage.get_customers()?;
        assert_eq!(all.len(), 1);

        teardown_test_db(&db_path);
        Ok(())
    }

    #[test]
    fn test_delete_customer() -> Result<()> {
        let (db_path, core_storage) = setup_test_db();
        let storage = CustomerLocalStorage::new(core_storage.clone())?;

        let customer = storage.add_customer("To Remove", 7, "28")?;
        let deleted = storage.delete_customer(customer.customer_id)?;
        assert_eq!(deleted, 1);

        assert!(storage.get_customer_by_id(customer.customer_id)?.is_none());
        assert!(storage.get_customers()?.is_empty());

        teardown_test_db(&db_path);
        Ok(())
    }
}

#[cfg(test)]
mod cloth_tests {
    use super::*;

    fn setup_cloth_storage() -> (String, Arc<CoreLocalStorage>, ClothLocalStorage) {
        let (db_path, core_storage) = setup_test_db();
        let registry = setup_registry(&core_storage);
        let storage = ClothLocalStorage::new(core_storage.clone(), registry)
            .expect("Failed to create cloth storage");
        (db_path, core_storage, storage)
    }

    #[test]
    fn test_add_cloth_creates_measurement_table() -> Result<()> {
        let (db_path, core_storage, storage) = setup_cloth_storage();

        let cloth = storage.add_cloth("Silk")?;
        assert_eq!(cloth.cloth_id, 1);
        assert_eq!(cloth.measure_table(), "measure_silk");
        assert!(core_storage.table_exists("measure_silk")?);

        teardown_test_db(&db_path);
        Ok(())
    }

    #[test]
    fn test_measurements_roundtrip() -> Result<()> {
        let (db_path, _core_storage, storage) = setup_cloth_storage();

        let cloth = storage.add_cloth("Cotton")?;
        storage.add_measurement(cloth.cloth_id, "34.5", Some("12.7"))?;
        storage.add_measurement(cloth.cloth_id, "36.0", None)?;

        let measurements = storage.get_measurements(cloth.cloth_id)?;
        assert_eq!(measurements.len(), 2);
        assert_eq!(measurements[0].id, 1);
        assert_eq!(measurements[0].measure_one, "34.5");
        assert_eq!(measurements[0].measure_two.as_deref(), Some("12.7"));
        assert_eq!(measurements[1].id, 2);
        assert!(measurements[1].measure_two.is_none());

        teardown_test_db(&db_path);
        Ok(())
    }

    #[test]
    fn test_rename_cloth_carries_measurement_table() -> Result<()> {
        let (db_path, core_storage, storage) = setup_cloth_storage();

        let cloth = storage.add_cloth("Cotton")?;
        storage.add_measurement(cloth.cloth_id, "34.5", None)?;

        let renamed = storage.rename_cloth(cloth.cloth_id, "Denim")?;
        assert_eq!(renamed.cloth_name, "Denim");
        assert!(core_storage.table_exists("measure_denim")?);
        assert!(!core_storage.table_exists("measure_cotton")?);

        let measurements = storage.get_measurements(cloth.cloth_id)?;
        assert_eq!(measurements.len(), 1);
        assert_eq!(measurements[0].measure_one, "34.5");

        teardown_test_db(&db_path);
        Ok(())
    }

    #[test]
    fn test_delete_cloth_drops_measurement_table() -> Result<()> {
        let (db_path, core_storage, storage) = setup_cloth_storage();

        let cloth = storage.add_cloth("Velvet")?;
        assert!(core_storage.table_exists("measure_velvet")?);

        storage.delete_cloth(cloth.cloth_id)?;
        assert!(storage.get_cloth_by_id(cloth.cloth_id)?.is_none());
        assert!(!core_storage.table_exists("measure_velvet")?);

        teardown_test_db(&db_path);
        Ok(())
    }

    #[test]
    fn test_measure_table_name_is_sanitized() {
        assert_eq!(MeasureTable::table_name("Raw Silk 2"), "measure_raw_silk_2");
        assert_eq!(MeasureTable::table_name("  Wool  "), "measure_wool");
    }
}

#[cfg(test)]
mod work_tests {
    use super::*;

    fn add_order(storage: &WorkLocalStorage) -> Work {
        storage
            .add_work(1, 1, "2024-03-01", "sherwani", "2024-03-20", 1500)
            .expect("Failed to add work order")
    }

    #[test]
    fn test_add_work_defaults() -> Result<()> {
        let (db_path, core_storage) = setup_test_db();
        let storage = WorkLocalStorage::new(core_storage.clone())?;

        let work = add_order(&storage);
        assert_eq!(work.work_id, 1);
        assert!(!work.work_done);
        assert!(!work.paid);
        assert!(work.fin_date.is_none());

        let fetched = storage.get_work_by_id(work.work_id)?.expect("Work missing");
        assert_eq!(fetched.fashion, "sherwani");
        assert_eq!(fetched.pay_amt, 1500);
        assert!(fetched.fin_date.is_none());

        teardown_test_db(&db_path);
        Ok(())
    }

    #[test]
    fn test_open_orders_filter() -> Result<()> {
        let (db_path, core_storage) = setup_test_db();
        let storage = WorkLocalStorage::new(core_storage.clone())?;

        let first = add_order(&storage);
        let second = add_order(&storage);

        storage.mark_done(first.work_id, "2024-03-15")?;

        let open = storage.get_open_work_orders()?;
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].work_id, second.work_id);

        teardown_test_db(&db_path);
        Ok(())
    }

    #[test]
    fn test_mark_done_sets_final_date() -> Result<()> {
        let (db_path, core_storage) = setup_test_db();
        let storage = WorkLocalStorage::new(core_storage.clone())?;

        let work = add_order(&storage);
        storage.mark_done(work.work_id, "2024-03-15")?;

        let fetched = storage.get_work_by_id(work.work_id)?.expect("Work missing");
        assert!(fetched.work_done);
        assert_eq!(fetched.fin_date.as_deref(), Some("2024-03-15"));
        assert!(!fetched.paid);

        teardown_test_db(&db_path);
        Ok(())
    }

    #[test]
    fn test_mark_paid() -> Result<()> {
        let (db_path, core_storage) = setup_test_db();
        let storage = WorkLocalStorage::new(core_storage.clone())?;

        let work = add_order(&storage);
        storage.mark_paid(work.work_id)?;

        let fetched = storage.get_work_by_id(work.work_id)?.expect("Work missing");
        assert!(fetched.paid);
        assert!(!fetched.work_done);

        teardown_test_db(&db_path);
        Ok(())
    }

    #[test]
    fn test_update_work_fields() -> Result<()> {
        let (db_path, core_storage) = setup_test_db();
        let storage = WorkLocalStorage::new(core_storage.clone())?;

        let mut work = add_order(&storage);
        work.fashion = "kurta".to_string();
        work.pay_amt = 900;
        storage.save_work(&work)?;

        let fetched = storage.get_work_by_id(work.work_id)?.expect("Work missing");
        assert_eq!(fetched.fashion, "kurta");
        assert_eq!(fetched.pay_amt, 900);

        let all = storage.get_work_orders()?;
        assert_eq!(all.len(), 1);

        teardown_test_db(&db_path);
        Ok(())
    }

    #[test]
    fn test_delete_work() -> Result<()> {
        let (db_path, core_storage) = setup_test_db();
        let storage = WorkLocalStorage::new(core_storage.clone())?;

        let work = add_order(&storage);
        let deleted = storage.delete_work(work.work_id)?;
        assert_eq!(deleted, 1);
        assert!(storage.get_work_by_id(work.work_id)?.is_none());

        teardown_test_db(&db_path);
        Ok(())
    }
}
