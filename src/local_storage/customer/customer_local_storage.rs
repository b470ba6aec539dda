use crate::error::Result;
use crate::local_storage::core_local_storage::CoreLocalStorage;
use crate::local_storage::customer::customer_tables::CustomerTable;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: i64,
    pub customer_name: String,
    pub phone_no: i64,
    pub age: String,
}

impl Customer {
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "customer_id": self.customer_id,
            "customer_name": self.customer_name,
            "phone_no": self.phone_no,
            "age": self.age,
        })
    }

    pub fn from_json(json: &serde_json::Value) -> Self {
        Customer {
            customer_id: json.get("customer_id").and_then(|v| v.as_i64()).unwrap_or(0),
            customer_name: json
                .get("customer_name")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            phone_no: json.get("phone_no").and_then(|v| v.as_i64()).unwrap_or(0),
            age: json
                .get("age")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
        }
    }
}

pub struct CustomerLocalStorage {
    core_storage: Arc<CoreLocalStorage>,
}

impl CustomerLocalStorage {
    pub fn new(core_storage: Arc<CoreLocalStorage>) -> Result<Self> {
        Ok(CustomerLocalStorage { core_storage })
    }

    /// Adds a customer under the next free id.
    pub fn add_customer(&self, name: &str, phone_no: i64, age: &str) -> Result<Customer> {
        let next_id = self
            .core_storage
            .max_id(CustomerTable::TABLE_NAME, CustomerTable::COLUMN_ID)?
            + 1;

        let customer = Customer {
            customer_id: next_id,
            customer_name: name.to_string(),
            phone_no,
            age: age.to_string(),
        };

        self.core_storage
            .insert(CustomerTable::TABLE_NAME, &customer.to_json())?;
        Ok(customer)
    }

    pub fn save_customer(&self, customer: &Customer) -> Result<i64> {
        let result = self.core_storage.insert_or_update(
            CustomerTable::TABLE_NAME,
            CustomerTable::COLUMN_ID,
            &customer.to_json(),
        )?;
        Ok(result)
    }

    pub fn get_customers(&self) -> Result<Vec<Customer>> {
        let rows = self.core_storage.get_all(CustomerTable::TABLE_NAME)?;
        Ok(rows.iter().map(Customer::from_json).collect())
    }

    pub fn get_customer_by_id(&self, customer_id: i64) -> Result<Option<Customer>> {
        let rows = self.core_storage.get_by_column(
            CustomerTable::TABLE_NAME,
            CustomerTable::COLUMN_ID,
            &json!(customer_id),
        )?;
        Ok(rows.first().map(Customer::from_json))
    }

    pub fn delete_customer(&self, customer_id: i64) -> Result<usize> {
        let result = self.core_storage.delete_by_column(
            CustomerTable::TABLE_NAME,
            CustomerTable::COLUMN_ID,
            &json!(customer_id),
        )?;
        Ok(result)
    }
}
