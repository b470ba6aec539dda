use crate::local_storage::schema_registry::ColumnMap;

/// Provides constants and utilities for working with
/// the "cloths" database table.
pub struct ClothTable;

impl ClothTable {
    /// The name of the database table
    pub const TABLE_NAME: &'static str = "cloths";

    /// The column name for the primary key identifier of a cloth.
    pub const COLUMN_ID: &'static str = "cloth_id";

    /// The column name for storing the name of the cloth type.
    pub const COLUMN_NAME: &'static str = "cloth_name";

    /// SQL statement for creating the cloths table with the defined schema.
    pub fn create_table() -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                {} INTEGER PRIMARY KEY,
                {} TEXT
            )",
            Self::TABLE_NAME,
            Self::COLUMN_ID,
            Self::COLUMN_NAME
        )
    }

    /// The column map used to seed the schema registry.
    pub fn column_map() -> ColumnMap {
        let mut columns = ColumnMap::new();
        columns.insert(Self::COLUMN_ID.to_string(), "INTEGER".to_string());
        columns.insert(Self::COLUMN_NAME.to_string(), "TEXT".to_string());
        columns
    }
}

/// Each cloth type gets its own measurement table, named after the
/// cloth and created when the cloth is added.
pub struct MeasureTable;

impl MeasureTable {
    /// The column name for the primary key identifier of a measurement.
    pub const COLUMN_ID: &'static str = "id";

    /// The column name for the first free-text measurement.
    pub const COLUMN_MEASURE_ONE: &'static str = "measure_one";

    /// The column name for the second free-text measurement.
    pub const COLUMN_MEASURE_TWO: &'static str = "measure_two";

    /// Table name for a cloth's measurements. Cloth names are typed
    /// by the shop staff, so anything that is not safe in an SQL
    /// identifier is folded to an underscore.
    pub fn table_name(cloth_name: &str) -> String {
        let sanitized: String = cloth_name
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("measure_{}", sanitized)
    }

    /// The column map used to create and register a measurement table.
    pub fn column_map() -> ColumnMap {
        let mut columns = ColumnMap::new();
        columns.insert(
            Self::COLUMN_ID.to_string(),
            "INTEGER PRIMARY KEY".to_string(),
        );
        columns.insert(
            Self::COLUMN_MEASURE_ONE.to_string(),
            "TEXT NOT NULL".to_string(),
        );
        columns.insert(Self::COLUMN_MEASURE_TWO.to_string(), "TEXT".to_string());
        columns
    }
}
