use crate::local_storage::schema_registry::ColumnMap;

/// Provides constants and utilities for working with
/// the "work" database table.
pub struct WorkTable;

impl WorkTable {
    /// The name of the database table
    pub const TABLE_NAME: &'static str = "work";

    /// The column name for the primary key identifier of a work order.
    pub const COLUMN_ID: &'static str = "work_id";

    /// The column name for the id of the ordering customer.
    pub const COLUMN_CUSTOMER_ID: &'static str = "customer_id";

    /// The column name for the id of the cloth the order is made from.
    pub const COLUMN_CLOTH_ID: &'static str = "cloth_id";

    /// The column name for the date the order was taken in.
    pub const COLUMN_INPUT_DATE: &'static str = "input_date";

    /// The column name for the free-text fashion description.
    pub const COLUMN_FASHION: &'static str = "fashion";

    /// The column name for the expected completion date.
    pub const COLUMN_EXP_OP_DATE: &'static str = "exp_op_date";

    /// The column name for the agreed pay amount.
    pub const COLUMN_PAY_AMT: &'static str = "pay_amt";

    /// The column name for the work-done flag.
    pub const COLUMN_WORK_DONE: &'static str = "work_done";

    /// The column name for the paid flag.
    pub const COLUMN_PAID: &'static str = "paid";

    /// The column name for the date the order was actually finished.
    pub const COLUMN_FIN_DATE: &'static str = "fin_date";

    /// SQL statement for creating the work table with the defined schema.
    pub fn create_table() -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                {} INTEGER PRIMARY KEY,
                {} INTEGER,
                {} INTEGER,
                {} DATE,
                {} TEXT,
                {} DATE,
                {} INTEGER,
                {} INTEGER,
                {} INTEGER,
                {} DATE
            )",
            Self::TABLE_NAME,
            Self::COLUMN_ID,
            Self::COLUMN_CUSTOMER_ID,
            Self::COLUMN_CLOTH_ID,
            Self::COLUMN_INPUT_DATE,
            Self::COLUMN_FASHION,
            Self::COLUMN_EXP_OP_DATE,
            Self::COLUMN_PAY_AMT,
            Self::COLUMN_WORK_DONE,
            Self::COLUMN_PAID,
            Self::COLUMN_FIN_DATE
        )
    }

    /// The column map used to seed the schema registry.
    pub fn column_map() -> ColumnMap {
        let mut columns = ColumnMap::new();
        columns.insert(Self::COLUMN_ID.to_string(), "INTEGER".to_string());
        columns.insert(Self::COLUMN_CUSTOMER_ID.to_string(), "INTEGER".to_string());
        columns.insert(Self::COLUMN_CLOTH_ID.to_string(), "INTEGER".to_string());
        columns.insert(Self::COLUMN_INPUT_DATE.to_string(), "DATE".to_string());
        columns.insert(Self::COLUMN_FASHION.to_string(), "TEXT".to_string());
        columns.insert(Self::COLUMN_EXP_OP_DATE.to_string(), "DATE".to_string());
        columns.insert(Self::COLUMN_PAY_AMT.to_string(), "INTEGER".to_string());
        columns.insert(Self::COLUMN_WORK_DONE.to_string(), "INTEGER".to_string());
        columns.insert(Self::COLUMN_PAID.to_string(), "INTEGER".to_string());
        columns.insert(Self::COLUMN_FIN_DATE.to_string(), "DATE".to_string());
        columns
    }
}
