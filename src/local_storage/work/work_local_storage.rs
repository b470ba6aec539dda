use crate::error::{AppError, Result};
use crate::local_storage::core_local_storage::CoreLocalStorage;
use crate::local_storage::work::work_tables::WorkTable;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Work {
    pub work_id: i64,
    pub customer_id: i64,
    pub cloth_id: i64,
    pub input_date: String,
    pub fashion: String,
    pub exp_op_date: String,
    pub pay_amt: i64,
    pub work_done: bool,
    pub paid: bool,
    pub fin_date: Option<String>,
}

impl Work {
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "work_id": self.work_id,
            "customer_id": self.customer_id,
            "cloth_id": self.cloth_id,
            "input_date": self.input_date,
            "fashion": self.fashion,
            "exp_op_date": self.exp_op_date,
            "pay_amt": self.pay_amt,
            "work_done": if self.work_done { 1 } else { 0 },
            "paid": if self.paid { 1 } else { 0 },
            "fin_date": self.fin_date,
        })
    }

    pub fn from_json(json: &serde_json::Value) -> Self {
        let work_done = json.get("work_done").and_then(|v| v.as_i64()).unwrap_or(0);
        let paid = json.get("paid").and_then(|v| v.as_i64()).unwrap_or(0);

        Work {
            work_id: json.get("work_id").and_then(|v| v.as_i64()).unwrap_or(0),
            customer_id: json.get("customer_id").and_then(|v| v.as_i64()).unwrap_or(0),
            cloth_id: json.get("cloth_id").and_then(|v| v.as_i64()).unwrap_or(0),
            input_date: json
                .get("input_date")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            fashion: json
                .get("fashion")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            exp_op_date: json
                .get("exp_op_date")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            pay_amt: json.get("pay_amt").and_then(|v| v.as_i64()).unwrap_or(0),
            work_done: work_done != 0,
            paid: paid != 0,
            fin_date: json
                .get("fin_date")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
        }
    }
}

pub struct WorkLocalStorage {
    core_storage: Arc<CoreLocalStorage>,
}

impl WorkLocalStorage {
    pub fn new(core_storage: Arc<CoreLocalStorage>) -> Result<Self> {
        Ok(WorkLocalStorage { core_storage })
    }

    /// Takes in a new order under the next free id. Customer and cloth
    /// ids are recorded as given; nothing checks that they exist.
    pub fn add_work(
        &self,
        customer_id: i64,
        cloth_id: i64,
        input_date: &str,
        fashion: &str,
        exp_op_date: &str,
        pay_amt: i64,
    ) -> Result<Work> {
        let next_id = self
            .core_storage
            .max_id(WorkTable::TABLE_NAME, WorkTable::COLUMN_ID)?
            + 1;

        let work = Work {
            work_id: next_id,
            customer_id,
            cloth_id,
            input_date: input_date.to_string(),
            fashion: fashion.to_string(),
            exp_op_date: exp_op_date.to_string(),
            pay_amt,
            work_done: false,
            paid: false,
            fin_date: None,
        };

        self.core_storage
            .insert(WorkTable::TABLE_NAME, &work.to_json())?;
        Ok(work)
    }

    pub fn save_work(&self, work: &Work) -> Result<i64> {
        let result = self.core_storage.insert_or_update(
            WorkTable::TABLE_NAME,
            WorkTable::COLUMN_ID,
            &work.to_json(),
        )?;
        Ok(result)
    }

    pub fn get_work_orders(&self) -> Result<Vec<Work>> {
        let rows = self.core_storage.get_all(WorkTable::TABLE_NAME)?;
        Ok(rows.iter().map(Work::from_json).collect())
    }

    /// Orders that are still on the rack.
    pub fn get_open_work_orders(&self) -> Result<Vec<Work>> {
        let rows = self.core_storage.get_by_column(
            WorkTable::TABLE_NAME,
            WorkTable::COLUMN_WORK_DONE,
            &json!(0),
        )?;
        Ok(rows.iter().map(Work::from_json).collect())
    }

    pub fn get_work_by_id(&self, work_id: i64) -> Result<Option<Work>> {
        let rows = self.core_storage.get_by_column(
            WorkTable::TABLE_NAME,
            WorkTable::COLUMN_ID,
            &json!(work_id),
        )?;
        Ok(rows.first().map(Work::from_json))
    }

    /// Marks the order finished on the given date.
    pub fn mark_done(&self, work_id: i64, fin_date: &str) -> Result<Work> {
        let mut work = self
            .get_work_by_id(work_id)?
            .ok_or_else(|| AppError::NotFound(format!("work order {}", work_id)))?;

        work.work_done = true;
        work.fin_date = Some(fin_date.to_string());
        self.save_work(&work)?;
        Ok(work)
    }

    /// Marks the order as settled.
    pub fn mark_paid(&self, work_id: i64) -> Result<Work> {
        let mut work = self
            .get_work_by_id(work_id)?
            .ok_or_else(|| AppError::NotFound(format!("work order {}", work_id)))?;

        work.paid = true;
        self.save_work(&work)?;
        Ok(work)
    }

    pub fn delete_work(&self, work_id: i64) -> Result<usize> {
        let result = self.core_storage.delete_by_column(
            WorkTable::TABLE_NAME,
            WorkTable::COLUMN_ID,
            &json!(work_id),
        )?;
        Ok(result)
    }
}
