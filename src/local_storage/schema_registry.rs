use crate::error::{AppError, Result};
use crate::local_storage::core_local_storage::CoreLocalStorage;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Column name to declared type, one entry per table.
pub type ColumnMap = HashMap<String, String>;

/// In-memory mirror of the database schema. Every schema-altering
/// operation goes through here so the cached column maps stay in step
/// with the real tables. The cache is overwritten after a statement
/// succeeds; a partially failed alteration leaves whatever state the
/// database reached.
pub struct SchemaRegistry {
    core_storage: Arc<CoreLocalStorage>,
    tables: Mutex<HashMap<String, ColumnMap>>,
}

impl SchemaRegistry {
    pub fn new(core_storage: Arc<CoreLocalStorage>) -> Self {
        SchemaRegistry {
            core_storage,
            tables: Mutex::new(HashMap::new()),
        }
    }

    /// Seeds a cache entry without touching the database. Used at
    /// startup for the well-known tables.
    pub fn register(&self, table_name: &str, columns: ColumnMap) {
        let mut tables = self.tables.lock().unwrap();
        tables.insert(table_name.to_string(), columns);
    }

    pub fn contains(&self, table_name: &str) -> bool {
        let tables = self.tables.lock().unwrap();
        tables.contains_key(table_name)
    }

    pub fn columns(&self, table_name: &str) -> Option<ColumnMap> {
        let tables = self.tables.lock().unwrap();
        tables.get(table_name).cloned()
    }

    pub fn snapshot(&self) -> HashMap<String, ColumnMap> {
        let tables = self.tables.lock().unwrap();
        tables.clone()
    }

    /// Creates the table from the given column map, unless it already
    /// exists. The cache entry is refreshed from the live schema
    /// afterwards either way.
    pub fn create_table(&self, table_name: &str, columns: &ColumnMap) -> Result<()> {
        if self.core_storage.table_exists(table_name)? {
            debug!(table = table_name, "table already exists, skipping create");
            return self.refresh(table_name);
        }

        let mut column_names: Vec<&String> = columns.keys().collect();
        column_names.sort();
        let column_defs: Vec<String> = column_names
            .iter()
            .map(|name| format!("{} {}", name, columns[*name]))
            .collect();

        let query = format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            table_name,
            column_defs.join(", ")
        );

        {
            let conn = self.core_storage.get_connection();
            conn.execute(&query, [])?;
        }
        info!(table = table_name, "table created");

        self.register(table_name, columns.clone());
        self.refresh(table_name)
    }

    /// Drops the table and forgets its cache entry.
    pub fn delete_table(&self, table_name: &str) -> Result<()> {
        let query = format!("DROP TABLE IF EXISTS {}", table_name);
        {
            let conn = self.core_storage.get_connection();
            conn.execute(&query, [])?;
        }

        let mut tables = self.tables.lock().unwrap();
        tables.remove(table_name);
        info!(table = table_name, "table dropped");
        Ok(())
    }

    /// Renames the table and moves its cache entry under the new key.
    /// When no entry existed the new table is read back from the
    /// database instead.
    pub fn rename_table(&self, old_name: &str, new_name: &str) -> Result<()> {
        if !self.core_storage.table_exists(old_name)? {
            return Err(AppError::NotFound(format!("table {}", old_name)));
        }

        let query = format!("ALTER TABLE {} RENAME TO {}", old_name, new_name);
        {
            let conn = self.core_storage.get_connection();
            conn.execute(&query, [])?;
        }
        info!(old = old_name, new = new_name, "table renamed");

        let moved = {
            let mut tables = self.tables.lock().unwrap();
            match tables.remove(old_name) {
                Some(columns) => {
                    tables.insert(new_name.to_string(), columns);
                    true
                }
                None => false,
            }
        };

        if !moved {
            warn!(table = old_name, "no cached schema entry, reading back");
            self.refresh(new_name)?;
        }
        Ok(())
    }

    /// Adds a column and records it in the cache entry.
    pub fn add_column(&self, table_name: &str, column_name: &str, column_type: &str) -> Result<()> {
        let query = format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            table_name, column_name, column_type
        );
        {
            let conn = self.core_storage.get_connection();
            conn.execute(&query, [])?;
        }
        info!(table = table_name, column = column_name, "column added");

        let mut tables = self.tables.lock().unwrap();
        if let Some(columns) = tables.get_mut(table_name) {
            columns.insert(column_name.to_string(), column_type.to_string());
        }
        Ok(())
    }

    /// Removes a column by rebuilding the table: copy everything into
    /// a temporary table, drop the original, recreate it from a SELECT
    /// whose column list comes from the cache minus the dropped
    /// column, then drop the copy.
    pub fn drop_column(&self, table_name: &str, column_name: &str) -> Result<()> {
        if !self.contains(table_name) {
            self.refresh(table_name)?;
        }

        let kept: Vec<String> = {
            let tables = self.tables.lock().unwrap();
            let columns = tables
                .get(table_name)
                .ok_or_else(|| AppError::NotFound(format!("schema entry for {}", table_name)))?;
            let mut names: Vec<String> = columns
                .keys()
                .filter(|name| name.as_str() != column_name)
                .cloned()
                .collect();
            names.sort();
            names
        };

        if kept.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "cannot drop the last column of {}",
                table_name
            )));
        }

        let temp_table_name = format!("{}_temp", table_name);
        {
            let conn = self.core_storage.get_connection();
            conn.execute(
                &format!(
                    "CREATE TABLE {} AS SELECT * FROM {}",
                    temp_table_name, table_name
                ),
                [],
            )?;
            conn.execute(&format!("DROP TABLE {}", table_name), [])?;
            conn.execute(
                &format!(
                    "CREATE TABLE {} AS SELECT {} FROM {}",
                    table_name,
                    kept.join(", "),
                    temp_table_name
                ),
                [],
            )?;
            conn.execute(&format!("DROP TABLE {}", temp_table_name), [])?;
        }
        info!(table = table_name, column = column_name, "column dropped");

        let mut tables = self.tables.lock().unwrap();
        if let Some(columns) = tables.get_mut(table_name) {
            columns.remove(column_name);
        }
        Ok(())
    }

    /// Renames a column with the same rebuild, aliasing the old name
    /// to the new one in the SELECT list. The cache entry is read back
    /// from the rebuilt table afterwards.
    pub fn rename_column(
        &self,
        table_name: &str,
        old_column_name: &str,
        new_column_name: &str,
    ) -> Result<()> {
        self.refresh(table_name)?;

        let select_list: Vec<String> = {
            let tables = self.tables.lock().unwrap();
            let columns = tables
                .get(table_name)
                .ok_or_else(|| AppError::NotFound(format!("schema entry for {}", table_name)))?;

            if !columns.contains_key(old_column_name) {
                return Err(AppError::NotFound(format!(
                    "column {} in {}",
                    old_column_name, table_name
                )));
            }

            let mut names: Vec<&String> = columns.keys().collect();
            names.sort();
            names
                .into_iter()
                .map(|name| {
                    if name == old_column_name {
                        format!("{} AS \"{}\"", old_column_name, new_column_name)
                    } else {
                        name.clone()
                    }
                })
                .collect()
        };

        let temp_table_name = format!("{}_temp", table_name);
        {
            let conn = self.core_storage.get_connection();
            conn.execute(
                &format!(
                    "CREATE TABLE {} AS SELECT {} FROM {}",
                    temp_table_name,
                    select_list.join(", "),
                    table_name
                ),
                [],
            )?;
            conn.execute(&format!("DROP TABLE {}", table_name), [])?;
            conn.execute(
                &format!("ALTER TABLE {} RENAME TO {}", temp_table_name, table_name),
                [],
            )?;
        }
        info!(
            table = table_name,
            old = old_column_name,
            new = new_column_name,
            "column renamed"
        );

        self.refresh(table_name)
    }

    /// Overwrites the cache entry with the actual columns of the
    /// table, straight from `PRAGMA table_info`.
    pub fn refresh(&self, table_name: &str) -> Result<()> {
        let columns = {
            let conn = self.core_storage.get_connection();
            let query = format!("PRAGMA table_info({})", table_name);
            let mut stmt = conn.prepare(&query)?;

            let rows = stmt.query_map([], |row| {
                let name: String = row.get("name")?;
                let column_type: String = row.get("type")?;
                Ok((name, column_type))
            })?;

            let mut columns = ColumnMap::new();
            for row in rows {
                let (name, column_type) = row?;
                columns.insert(name, column_type);
            }
            columns
        };

        debug!(
            table = table_name,
            columns = columns.len(),
            "schema entry refreshed"
        );
        let mut tables = self.tables.lock().unwrap();
        tables.insert(table_name.to_string(), columns);
        Ok(())
    }
}
