use crate::error::{AppError, Result};
use crate::local_storage::cloth::cloth_tables::{ClothTable, MeasureTable};
use crate::local_storage::core_local_storage::CoreLocalStorage;
use crate::local_storage::schema_registry::SchemaRegistry;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cloth {
    pub cloth_id: i64,
    pub cloth_name: String,
}

impl Cloth {
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "cloth_id": self.cloth_id,
            "cloth_name": self.cloth_name,
        })
    }

    pub fn from_json(json: &serde_json::Value) -> Self {
        Cloth {
            cloth_id: json.get("cloth_id").and_then(|v| v.as_i64()).unwrap_or(0),
            cloth_name: json
                .get("cloth_name")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
        }
    }

    /// Name of this cloth's measurement table.
    pub fn measure_table(&self) -> String {
        MeasureTable::table_name(&self.cloth_name)
    }
}

/// One free-text measurement pair recorded for a cloth type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    pub id: i64,
    pub measure_one: String,
    pub measure_two: Option<String>,
}

impl Measurement {
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "id": self.id,
            "measure_one": self.measure_one,
            "measure_two": self.measure_two,
        })
    }

    pub fn from_json(json: &serde_json::Value) -> Self {
        Measurement {
            id: json.get("id").and_then(|v| v.as_i64()).unwrap_or(0),
            measure_one: json
                .get("measure_one")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            measure_two: json
                .get("measure_two")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
        }
    }
}

/// Cloth storage also owns the per-cloth measurement tables, keeping
/// the schema registry in step whenever a cloth appears, is renamed
/// or disappears.
pub struct ClothLocalStorage {
    core_storage: Arc<CoreLocalStorage>,
    registry: Arc<SchemaRegistry>,
}

impl ClothLocalStorage {
    pub fn new(core_storage: Arc<CoreLocalStorage>, registry: Arc<SchemaRegistry>) -> Result<Self> {
        let storage = ClothLocalStorage {
            core_storage,
            registry,
        };

        storage.init()?;

        Ok(storage)
    }

    /// Makes sure every stored cloth has its measurement table and a
    /// registry entry for it.
    fn init(&self) -> Result<()> {
        for cloth in self.get_cloths()? {
            self.registry
                .create_table(&cloth.measure_table(), &MeasureTable::column_map())?;
        }
        Ok(())
    }

    /// Adds a cloth under the next free id and creates its
    /// measurement table.
    pub fn add_cloth(&self, name: &str) -> Result<Cloth> {
        let next_id = self
            .core_storage
            .max_id(ClothTable::TABLE_NAME, ClothTable::COLUMN_ID)?
            + 1;

        let cloth = Cloth {
            cloth_id: next_id,
            cloth_name: name.to_string(),
        };

        self.core_storage
            .insert(ClothTable::TABLE_NAME, &cloth.to_json())?;
        self.registry
            .create_table(&cloth.measure_table(), &MeasureTable::column_map())?;
        Ok(cloth)
    }

    /// Renames a cloth and carries its measurement table along.
    pub fn rename_cloth(&self, cloth_id: i64, new_name: &str) -> Result<Cloth> {
        let cloth = self
            .get_cloth_by_id(cloth_id)?
            .ok_or_else(|| AppError::NotFound(format!("cloth {}", cloth_id)))?;

        let old_table = cloth.measure_table();
        let renamed = Cloth {
            cloth_id,
            cloth_name: new_name.to_string(),
        };
        let new_table = renamed.measure_table();

        self.core_storage.update(
            ClothTable::TABLE_NAME,
            ClothTable::COLUMN_ID,
            &renamed.to_json(),
        )?;

        if old_table != new_table {
            if self.core_storage.table_exists(&old_table)? {
                self.registry.rename_table(&old_table, &new_table)?;
            } else {
                self.registry
                    .create_table(&new_table, &MeasureTable::column_map())?;
            }
        }
        Ok(renamed)
    }

    /// Deletes a cloth and drops its measurement table.
    pub fn delete_cloth(&self, cloth_id: i64) -> Result<usize> {
        let cloth = self
            .get_cloth_by_id(cloth_id)?
            .ok_or_else(|| AppError::NotFound(format!("cloth {}", cloth_id)))?;

        let result = self.core_storage.delete_by_column(
            ClothTable::TABLE_NAME,
            ClothTable::COLUMN_ID,
            &json!(cloth_id),
        )?;
        self.registry.delete_table(&cloth.measure_table())?;
        Ok(result)
    }

    pub fn get_cloths(&self) -> Result<Vec<Cloth>> {
        let rows = self.core_storage.get_all(ClothTable::TABLE_NAME)?;
        Ok(rows.iter().map(Cloth::from_json).collect())
    }

    pub fn get_cloth_by_id(&self, cloth_id: i64) -> Result<Option<Cloth>> {
        let rows = self.core_storage.get_by_column(
            ClothTable::TABLE_NAME,
            ClothTable::COLUMN_ID,
            &json!(cloth_id),
        )?;
        Ok(rows.first().map(Cloth::from_json))
    }

    /// Records a measurement pair in the cloth's measurement table.
    pub fn add_measurement(
        &self,
        cloth_id: i64,
        measure_one: &str,
        measure_two: Option<&str>,
    ) -> Result<Measurement> {
        let cloth = self
            .get_cloth_by_id(cloth_id)?
            .ok_or_else(|| AppError::NotFound(format!("cloth {}", cloth_id)))?;
        let table = cloth.measure_table();

        let next_id = self.core_storage.max_id(&table, MeasureTable::COLUMN_ID)? + 1;
        let measurement = Measurement {
            id: next_id,
            measure_one: measure_one.to_string(),
            measure_two: measure_two.map(|s| s.to_string()),
        };

        self.core_storage.insert(&table, &measurement.to_json())?;
        Ok(measurement)
    }

    pub fn get_measurements(&self, cloth_id: i64) -> Result<Vec<Measurement>> {
        let cloth = self
            .get_cloth_by_id(cloth_id)?
            .ok_or_else(|| AppError::NotFound(format!("cloth {}", cloth_id)))?;

        let rows = self.core_storage.get_all(&cloth.measure_table())?;
        Ok(rows.iter().map(Measurement::from_json).collect())
    }
}
