use crate::local_storage::schema_registry::ColumnMap;

/// Provides constants and utilities for working with
/// the "customer" database table.
pub struct CustomerTable;

impl CustomerTable {
    /// The name of the database table
    pub const TABLE_NAME: &'static str = "customer";

    /// The column name for the primary key identifier of a customer.
    pub const COLUMN_ID: &'static str = "customer_id";

    /// The column name for storing the customer's name.
    pub const COLUMN_NAME: &'static str = "customer_name";

    /// The column name for storing the customer's phone number.
    pub const COLUMN_PHONE_NO: &'static str = "phone_no";

    /// The column name for storing the customer's age.
    pub const COLUMN_AGE: &'static str = "age";

    /// SQL statement for creating the customer table with the defined schema.
    pub fn create_table() -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                {} INTEGER PRIMARY KEY,
                {} TEXT,
                {} INTEGER,
                {} TEXT
            )",
            Self::TABLE_NAME,
            Self::COLUMN_ID,
            Self::COLUMN_NAME,
            Self::COLUMN_PHONE_NO,
            Self::COLUMN_AGE
        )
    }

    /// The column map used to seed the schema registry.
    pub fn column_map() -> ColumnMap {
        let mut columns = ColumnMap::new();
        columns.insert(Self::COLUMN_ID.to_string(), "INTEGER".to_string());
        columns.insert(Self::COLUMN_NAME.to_string(), "TEXT".to_string());
        columns.insert(Self::COLUMN_PHONE_NO.to_string(), "INTEGER".to_string());
        columns.insert(Self::COLUMN_AGE.to_string(), "TEXT".to_string());
        columns
    }
}
