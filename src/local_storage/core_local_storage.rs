use base64::prelude::*;
use rusqlite::{Connection, Result, params};
use std::sync::{Mutex, MutexGuard};

/// Shared synchronous access to the shop database. One connection,
/// guarded by a mutex because the storage structs are handed around
/// behind `Arc`s.
pub struct CoreLocalStorage {
    connection: Mutex<Connection>,
}

impl CoreLocalStorage {
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Ok(CoreLocalStorage {
            connection: Mutex::new(conn),
        })
    }

    pub fn get_connection(&self) -> MutexGuard<'_, Connection> {
        self.connection.lock().unwrap()
    }

    /// Checks the catalog for a table with the given name.
    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        let conn = self.get_connection();
        let mut stmt =
            conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
        stmt.exists(params![table_name])
    }

    /// Probes whether the table holds at least one row.
    pub fn table_filled(&self, table_name: &str) -> Result<bool> {
        let conn = self.get_connection();
        let query = format!("SELECT 1 FROM {} LIMIT 1", table_name);
        let mut stmt = conn.prepare(&query)?;
        stmt.exists([])
    }

    pub fn get_all(&self, table_name: &str) -> Result<Vec<serde_json::Value>> {
        let query = format!("SELECT * FROM {}", table_name);
        self.query_rows(&query, &[])
    }

    pub fn get_by_column(
        &self,
        table_name: &str,
        column_name: &str,
        value: &serde_json::Value,
    ) -> Result<Vec<serde_json::Value>> {
        let query = format!("SELECT * FROM {} WHERE {} = ?1", table_name, column_name);
        self.query_rows(&query, &[json_to_param(value)])
    }

    fn query_rows(
        &self,
        query: &str,
        param_values: &[Box<dyn rusqlite::ToSql>],
    ) -> Result<Vec<serde_json::Value>> {
        let conn = self.get_connection();
        let mut stmt = conn.prepare(query)?;

        let column_names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect();

        let rows = stmt.query_map(rusqlite::params_from_iter(param_values), |row| {
            let mut map = serde_json::Map::new();
            for (i, column_name) in column_names.iter().enumerate() {
                let value = get_value_from_row(row, i)?;
                map.insert(column_name.to_string(), value);
            }
            Ok(serde_json::Value::Object(map))
        })?;

        let mut results = Vec::new();
        for row_result in rows {
            results.push(row_result?);
        }

        Ok(results)
    }

    /// Projection query used by the list screens. Selects the given
    /// columns (all columns when the slice is empty) and returns the
    /// header row plus every row stringified for display.
    pub fn select_columns(
        &self,
        table_name: &str,
        column_names: &[String],
    ) -> Result<(Vec<String>, Vec<Vec<String>>)> {
        let projection = if column_names.is_empty() {
            "*".to_string()
        } else {
            column_names.join(", ")
        };
        let query = format!("SELECT {} FROM {}", projection, table_name);

        let conn = self.get_connection();
        let mut stmt = conn.prepare(&query)?;

        let headers: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect();

        let column_count = headers.len();
        let rows = stmt.query_map([], |row| {
            let mut cells = Vec::with_capacity(column_count);
            for i in 0..column_count {
                cells.push(get_display_value(row, i)?);
            }
            Ok(cells)
        })?;

        let mut results = Vec::new();
        for row_result in rows {
            results.push(row_result?);
        }

        Ok((headers, results))
    }

    pub fn insert(&self, table_name: &str, data: &serde_json::Value) -> Result<i64> {
        if let serde_json::Value::Object(map) = data {
            let conn = self.get_connection();
            let columns: Vec<String> = map.keys().cloned().collect();
            let placeholders: Vec<String> = (0..columns.len()).map(|_| "?".to_string()).collect();

            let query = format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table_name,
                columns.join(", "),
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&query)?;
            let mut param_values = Vec::new();

            for col in &columns {
                if let Some(value) = map.get(col) {
                    param_values.push(json_to_param(value));
                }
            }

            stmt.execute(rusqlite::params_from_iter(param_values))?;
            Ok(conn.last_insert_rowid())
        } else {
            Err(rusqlite::Error::InvalidParameterName(
                "Data must be a JSON object".to_string(),
            ))
        }
    }

    /// Updates the row whose `id_column` matches the id in `data`.
    /// Every other key in the object becomes a SET assignment.
    pub fn update(
        &self,
        table_name: &str,
        id_column: &str,
        data: &serde_json::Value,
    ) -> Result<usize> {
        if let serde_json::Value::Object(map) = data {
            let conn = self.get_connection();
            let Some(id) = map.get(id_column) else {
                return Err(rusqlite::Error::InvalidParameterName(format!(
                    "Data must contain an '{}' field",
                    id_column
                )));
            };

            let mut updates = Vec::new();
            let mut param_values = Vec::new();

            for (key, value) in map {
                if key != id_column {
                    updates.push(format!("{} = ?", key));
                    param_values.push(json_to_param(value));
                }
            }

            param_values.push(json_to_param(id));

            let query = format!(
                "UPDATE {} SET {} WHERE {} = ?",
                table_name,
                updates.join(", "),
                id_column
            );

            let mut stmt = conn.prepare(&query)?;
            let rows_affected = stmt.execute(rusqlite::params_from_iter(param_values))?;
            Ok(rows_affected)
        } else {
            Err(rusqlite::Error::InvalidParameterName(
                "Data must be a JSON object".to_string(),
            ))
        }
    }

    pub fn insert_or_update(
        &self,
        table_name: &str,
        id_column: &str,
        data: &serde_json::Value,
    ) -> Result<i64> {
        if let serde_json::Value::Object(map) = data {
            let Some(id) = map.get(id_column) else {
                return Err(rusqlite::Error::InvalidParameterName(format!(
                    "Data must contain an '{}' field",
                    id_column
                )));
            };

            let existing = self.get_by_column(table_name, id_column, id)?;

            if !existing.is_empty() {
                self.update(table_name, id_column, data)?;
                Ok(0)
            } else {
                self.insert(table_name, data)
            }
        } else {
            Err(rusqlite::Error::InvalidParameterName(
                "Data must be a JSON object".to_string(),
            ))
        }
    }

    pub fn delete_by_column(
        &self,
        table_name: &str,
        column_name: &str,
        value: &serde_json::Value,
    ) -> Result<usize> {
        let conn = self.get_connection();
        let query = format!("DELETE FROM {} WHERE {} = ?1", table_name, column_name);
        conn.execute(&query, [json_to_param(value)])
    }

    /// Largest numeric value in the column, used for id allocation.
    /// The cast keeps text ids with numeric content comparable. An
    /// empty table yields 0.
    pub fn max_id(&self, table_name: &str, column_name: &str) -> Result<i64> {
        let conn = self.get_connection();
        let query = format!(
            "SELECT MAX(CAST({} AS INTEGER)) FROM {}",
            column_name, table_name
        );
        let max: Option<i64> = conn.query_row(&query, [], |row| row.get(0))?;
        Ok(max.unwrap_or(0))
    }
}

fn get_value_from_row(row: &rusqlite::Row, index: usize) -> Result<serde_json::Value> {
    let column_type = row.get_ref(index)?.data_type();

    match column_type {
        rusqlite::types::Type::Null => Ok(serde_json::Value::Null),
        rusqlite::types::Type::Integer => {
            let val: i64 = row.get(index)?;
            Ok(serde_json::Value::Number(val.into()))
        }
        rusqlite::types::Type::Real => {
            let val: f64 = row.get(index)?;
            if let Some(n) = serde_json::Number::from_f64(val) {
                Ok(serde_json::Value::Number(n))
            } else {
                Ok(serde_json::Value::Null)
            }
        }
        rusqlite::types::Type::Text => {
            let val: String = row.get(index)?;
            Ok(serde_json::Value::String(val))
        }
        rusqlite::types::Type::Blob => {
            let val: Vec<u8> = row.get(index)?;
            let encoded = BASE64_STANDARD.encode(&val);
            Ok(serde_json::Value::String(encoded))
        }
    }
}

fn get_display_value(row: &rusqlite::Row, index: usize) -> Result<String> {
    let value = get_value_from_row(row, index)?;
    Ok(match value {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

fn json_to_param(value: &serde_json::Value) -> Box<dyn rusqlite::ToSql> {
    match value {
        serde_json::Value::Null => Box::new(Option::<String>::None),
        serde_json::Value::Bool(b) => Box::new(*b),
        serde_json::Value::Number(n) => {
            if n.is_i64() {
                Box::new(n.as_i64().unwrap())
            } else if n.is_f64() {
                Box::new(n.as_f64().unwrap())
            } else {
                Box::new(Option::<String>::None)
            }
        }
        serde_json::Value::String(s) => Box::new(s.clone()),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            Box::new(serde_json::to_string(value).unwrap_or_default())
        }
    }
}
