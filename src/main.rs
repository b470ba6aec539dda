use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use schneiderei::config::CONFIG;
use schneiderei::error::Result as AppResult;
use schneiderei::local_storage::cloth::cloth_local_storage::ClothLocalStorage;
use schneiderei::local_storage::cloth::cloth_tables::ClothTable;
use schneiderei::local_storage::customer::customer_local_storage::CustomerLocalStorage;
use schneiderei::local_storage::customer::customer_tables::CustomerTable;
use schneiderei::local_storage::work::work_local_storage::WorkLocalStorage;
use schneiderei::local_storage::work::work_tables::WorkTable;
use schneiderei::local_storage::{CoreLocalStorage, SchemaRegistry};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let db_path = CONFIG.database_path.clone();
    schneiderei::initialize_database(&db_path).context("failed to initialize the database")?;

    let core_storage =
        Arc::new(CoreLocalStorage::new(&db_path).context("failed to open the database")?);
    let registry = Arc::new(
        schneiderei::initialize_registry(core_storage.clone())
            .context("failed to build the schema registry")?,
    );

    let customer_storage = CustomerLocalStorage::new(core_storage.clone())?;
    let cloth_storage = ClothLocalStorage::new(core_storage.clone(), registry.clone())?;
    let work_storage = WorkLocalStorage::new(core_storage.clone())?;

    info!(path = db_path.as_str(), "shop database ready");
    println!("Connection to the shop database has been established.\n");

    loop {
        println!("Operation Menu:");
        println!("1. Customer");
        println!("2. Cloths");
        println!("3. Work");
        println!("4. Schema tools");
        println!("5. Exit");

        let Some(choice) = read_choice("Enter your choice: ") else {
            break;
        };

        match choice {
            1 => customer_menu(&customer_storage, &core_storage),
            2 => cloth_menu(&cloth_storage, &core_storage),
            3 => work_menu(&work_storage, &core_storage),
            4 => schema_menu(&registry),
            5 => {
                println!("Exiting...");
                break;
            }
            _ => println!("Invalid choice. Please enter a number between 1 and 5."),
        }
    }

    Ok(())
}

fn customer_menu(storage: &CustomerLocalStorage, core_storage: &CoreLocalStorage) {
    loop {
        println!("Customer Operations:");
        println!("1. Show customer list");
        println!("2. Update existing customer");
        println!("3. Delete existing customer");
        println!("4. Add new customer");
        println!("5. Back to main menu");

        let Some(choice) = read_choice("Enter your choice: ") else {
            return;
        };

        let result = match choice {
            1 => show_table(core_storage, CustomerTable::TABLE_NAME),
            2 => update_customer(storage),
            3 => delete_customer(storage),
            4 => add_customer(storage),
            5 => {
                println!("Returning to main menu...");
                return;
            }
            _ => {
                println!("Invalid choice. Please enter a number between 1 and 5.");
                Ok(())
            }
        };

        report(result);
    }
}

fn add_customer(storage: &CustomerLocalStorage) -> AppResult<()> {
    let Some(name) = read_line("Customer name: ") else {
        return Ok(());
    };
    let Some(phone_no) = read_number("Phone number: ") else {
        return Ok(());
    };
    let Some(age) = read_line("Age: ") else {
        return Ok(());
    };

    let customer = storage.add_customer(&name, phone_no, &age)?;
    println!("Customer added with id {}.\n", customer.customer_id);
    Ok(())
}

fn update_customer(storage: &CustomerLocalStorage) -> AppResult<()> {
    let Some(id) = read_number("Customer id: ") else {
        return Ok(());
    };
    let Some(mut customer) = storage.get_customer_by_id(id)? else {
        println!("Customer {} not found.\n", id);
        return Ok(());
    };

    if let Some(name) = read_optional(&format!("Name [{}]: ", customer.customer_name)) {
        customer.customer_name = name;
    }
    if let Some(phone) = read_optional(&format!("Phone number [{}]: ", customer.phone_no)) {
        match phone.parse() {
            Ok(parsed) => customer.phone_no = parsed,
            Err(_) => {
                println!("Not a number, keeping {}.", customer.phone_no);
            }
        }
    }
    if let Some(age) = read_optional(&format!("Age [{}]: ", customer.age)) {
        customer.age = age;
    }

    storage.save_customer(&customer)?;
    println!("Customer {} updated.\n", customer.customer_id);
    Ok(())
}

fn delete_customer(storage: &CustomerLocalStorage) -> AppResult<()> {
    let Some(id) = read_number("Customer id: ") else {
        return Ok(());
    };
    let deleted = storage.delete_customer(id)?;
    if deleted == 0 {
        println!("Customer {} not found.\n", id);
    } else {
        println!("Customer {} deleted.\n", id);
    }
    Ok(())
}

fn cloth_menu(storage: &ClothLocalStorage, core_storage: &CoreLocalStorage) {
    loop {
        println!("Cloths Operations:");
        println!("1. Show cloth list");
        println!("2. Update existing cloth item");
        println!("3. Delete existing cloth");
        println!("4. Add new cloth");
        println!("5. Record measurements");
        println!("6. Show measurements");
        println!("7. Back to main menu");

        let Some(choice) = read_choice("Enter your choice: ") else {
            return;
        };

        let result = match choice {
            1 => show_table(core_storage, ClothTable::TABLE_NAME),
            2 => rename_cloth(storage),
            3 => delete_cloth(storage),
            4 => add_cloth(storage),
            5 => record_measurements(storage),
            6 => show_measurements(storage),
            7 => {
                println!("Returning to main menu...");
                return;
            }
            _ => {
                println!("Invalid choice. Please enter a number between 1 and 7.");
                Ok(())
            }
        };

        report(result);
    }
}

fn add_cloth(storage: &ClothLocalStorage) -> AppResult<()> {
    let Some(name) = read_line("Cloth name: ") else {
        return Ok(());
    };
    let cloth = storage.add_cloth(&name)?;
    println!(
        "Cloth added with id {} (measurement table {}).\n",
        cloth.cloth_id,
        cloth.measure_table()
    );
    Ok(())
}

fn rename_cloth(storage: &ClothLocalStorage) -> AppResult<()> {
    let Some(id) = read_number("Cloth id: ") else {
        return Ok(());
    };
    let Some(name) = read_line("New cloth name: ") else {
        return Ok(());
    };
    let cloth = storage.rename_cloth(id, &name)?;
    println!("Cloth {} renamed to {}.\n", cloth.cloth_id, cloth.cloth_name);
    Ok(())
}

fn delete_cloth(storage: &ClothLocalStorage) -> AppResult<()> {
    let Some(id) = read_number("Cloth id: ") else {
        return Ok(());
    };
    storage.delete_cloth(id)?;
    println!("Cloth {} deleted.\n", id);
    Ok(())
}

fn record_measurements(storage: &ClothLocalStorage) -> AppResult<()> {
    let Some(id) = read_number("Cloth id: ") else {
        return Ok(());
    };
    let Some(measure_one) = read_line("First measure: ") else {
        return Ok(());
    };
    let measure_two = read_optional("Second measure (optional): ");

    let measurement = storage.add_measurement(id, &measure_one, measure_two.as_deref())?;
    println!("Measurement {} recorded.\n", measurement.id);
    Ok(())
}

fn show_measurements(storage: &ClothLocalStorage) -> AppResult<()> {
    let Some(id) = read_number("Cloth id: ") else {
        return Ok(());
    };
    let measurements = storage.get_measurements(id)?;
    if measurements.is_empty() {
        println!("No measurements recorded.\n");
        return Ok(());
    }

    println!("id\tmeasure_one\tmeasure_two");
    for m in measurements {
        println!(
            "{}\t{}\t{}",
            m.id,
            m.measure_one,
            m.measure_two.unwrap_or_else(|| "NULL".to_string())
        );
    }
    println!();
    Ok(())
}

fn work_menu(storage: &WorkLocalStorage, core_storage: &CoreLocalStorage) {
    loop {
        println!("Work Operations:");
        println!("1. Show work list");
        println!("2. Update existing work item");
        println!("3. Delete existing work");
        println!("4. Add new work");
        println!("5. Show open work");
        println!("6. Mark work done");
        println!("7. Mark work paid");
        println!("8. Back to main menu");

        let Some(choice) = read_choice("Enter your choice: ") else {
            return;
        };

        let result = match choice {
            1 => show_table(core_storage, WorkTable::TABLE_NAME),
            2 => update_work(storage),
            3 => delete_work(storage),
            4 => add_work(storage),
            5 => show_open_work(storage),
            6 => mark_work_done(storage),
            7 => mark_work_paid(storage),
            8 => {
                println!("Returning to main menu...");
                return;
            }
            _ => {
                println!("Invalid choice. Please enter a number between 1 and 8.");
                Ok(())
            }
        };

        report(result);
    }
}

fn add_work(storage: &WorkLocalStorage) -> AppResult<()> {
    let Some(customer_id) = read_number("Customer id: ") else {
        return Ok(());
    };
    let Some(cloth_id) = read_number("Cloth id: ") else {
        return Ok(());
    };
    let Some(input_date) = read_date("Input date (YYYY-MM-DD, empty for today): ") else {
        return Ok(());
    };
    let Some(fashion) = read_line("Fashion description: ") else {
        return Ok(());
    };
    let Some(exp_op_date) = read_date("Expected completion date (YYYY-MM-DD, empty for today): ")
    else {
        return Ok(());
    };
    let Some(pay_amt) = read_number("Pay amount: ") else {
        return Ok(());
    };

    let work = storage.add_work(
        customer_id,
        cloth_id,
        &input_date,
        &fashion,
        &exp_op_date,
        pay_amt,
    )?;
    println!("Work order added with id {}.\n", work.work_id);
    Ok(())
}

fn update_work(storage: &WorkLocalStorage) -> AppResult<()> {
    let Some(id) = read_number("Work id: ") else {
        return Ok(());
    };
    let Some(mut work) = storage.get_work_by_id(id)? else {
        println!("Work order {} not found.\n", id);
        return Ok(());
    };

    if let Some(fashion) = read_optional(&format!("Fashion [{}]: ", work.fashion)) {
        work.fashion = fashion;
    }
    if let Some(exp) = read_optional(&format!("Expected completion [{}]: ", work.exp_op_date)) {
        match NaiveDate::parse_from_str(&exp, "%Y-%m-%d") {
            Ok(_) => work.exp_op_date = exp,
            Err(_) => println!("Not a date, keeping {}.", work.exp_op_date),
        }
    }
    if let Some(pay) = read_optional(&format!("Pay amount [{}]: ", work.pay_amt)) {
        match pay.parse() {
            Ok(parsed) => work.pay_amt = parsed,
            Err(_) => println!("Not a number, keeping {}.", work.pay_amt),
        }
    }

    storage.save_work(&work)?;
    println!("Work order {} updated.\n", work.work_id);
    Ok(())
}

fn delete_work(storage: &WorkLocalStorage) -> AppResult<()> {
    let Some(id) = read_number("Work id: ") else {
        return Ok(());
    };
    let deleted = storage.delete_work(id)?;
    if deleted == 0 {
        println!("Work order {} not found.\n", id);
    } else {
        println!("Work order {} deleted.\n", id);
    }
    Ok(())
}

fn show_open_work(storage: &WorkLocalStorage) -> AppResult<()> {
    let open = storage.get_open_work_orders()?;
    if open.is_empty() {
        println!("No open work orders.\n");
        return Ok(());
    }

    println!("work_id\tcustomer_id\tcloth_id\texp_op_date\tpay_amt\tpaid");
    for work in open {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            work.work_id,
            work.customer_id,
            work.cloth_id,
            work.exp_op_date,
            work.pay_amt,
            if work.paid { 1 } else { 0 }
        );
    }
    println!();
    Ok(())
}

fn mark_work_done(storage: &WorkLocalStorage) -> AppResult<()> {
    let Some(id) = read_number("Work id: ") else {
        return Ok(());
    };
    let Some(fin_date) = read_date("Final date (YYYY-MM-DD, empty for today): ") else {
        return Ok(());
    };
    let work = storage.mark_done(id, &fin_date)?;
    println!("Work order {} marked done on {}.\n", work.work_id, fin_date);
    Ok(())
}

fn mark_work_paid(storage: &WorkLocalStorage) -> AppResult<()> {
    let Some(id) = read_number("Work id: ") else {
        return Ok(());
    };
    let work = storage.mark_paid(id)?;
    println!("Work order {} marked paid.\n", work.work_id);
    Ok(())
}

fn schema_menu(registry: &SchemaRegistry) {
    loop {
        println!("Schema Tools:");
        println!("1. Show schema registry");
        println!("2. Add column");
        println!("3. Drop column");
        println!("4. Rename column");
        println!("5. Rename table");
        println!("6. Refresh table entry");
        println!("7. Back to main menu");

        let Some(choice) = read_choice("Enter your choice: ") else {
            return;
        };

        let result = match choice {
            1 => {
                show_registry(registry);
                Ok(())
            }
            2 => add_column(registry),
            3 => drop_column(registry),
            4 => rename_column(registry),
            5 => rename_table(registry),
            6 => refresh_entry(registry),
            7 => {
                println!("Returning to main menu...");
                return;
            }
            _ => {
                println!("Invalid choice. Please enter a number between 1 and 7.");
                Ok(())
            }
        };

        report(result);
    }
}

fn show_registry(registry: &SchemaRegistry) {
    let snapshot = registry.snapshot();
    let mut table_names: Vec<&String> = snapshot.keys().collect();
    table_names.sort();

    for table_name in table_names {
        println!("{}:", table_name);
        let columns = &snapshot[table_name];
        let mut column_names: Vec<&String> = columns.keys().collect();
        column_names.sort();
        for column_name in column_names {
            println!("  {}\t{}", column_name, columns[column_name]);
        }
    }
    println!();
}

fn add_column(registry: &SchemaRegistry) -> AppResult<()> {
    let Some(table) = read_line("Table name: ") else {
        return Ok(());
    };
    let Some(column) = read_line("Column name: ") else {
        return Ok(());
    };
    let Some(column_type) = read_line("Column type: ") else {
        return Ok(());
    };
    registry.add_column(&table, &column, &column_type)?;
    println!("Added column {} to {} table.\n", column, table);
    Ok(())
}

fn drop_column(registry: &SchemaRegistry) -> AppResult<()> {
    let Some(table) = read_line("Table name: ") else {
        return Ok(());
    };
    let Some(column) = read_line("Column name: ") else {
        return Ok(());
    };
    registry.drop_column(&table, &column)?;
    println!("Dropped column {} from {} table.\n", column, table);
    Ok(())
}

fn rename_column(registry: &SchemaRegistry) -> AppResult<()> {
    let Some(table) = read_line("Table name: ") else {
        return Ok(());
    };
    let Some(old_name) = read_line("Column to rename: ") else {
        return Ok(());
    };
    let Some(new_name) = read_line("New column name: ") else {
        return Ok(());
    };
    registry.rename_column(&table, &old_name, &new_name)?;
    println!(
        "Column {} renamed to {} in table {}.\n",
        old_name, new_name, table
    );
    Ok(())
}

fn rename_table(registry: &SchemaRegistry) -> AppResult<()> {
    let Some(old_name) = read_line("Table to rename: ") else {
        return Ok(());
    };
    let Some(new_name) = read_line("New table name: ") else {
        return Ok(());
    };
    registry.rename_table(&old_name, &new_name)?;
    println!("{} table renamed to {}.\n", old_name, new_name);
    Ok(())
}

fn refresh_entry(registry: &SchemaRegistry) -> AppResult<()> {
    let Some(table) = read_line("Table name: ") else {
        return Ok(());
    };
    registry.refresh(&table)?;
    println!("Schema entry for {} refreshed.\n", table);
    Ok(())
}

/// Prints a whole table with its header row, tab separated.
fn show_table(core_storage: &CoreLocalStorage, table_name: &str) -> AppResult<()> {
    if !core_storage.table_filled(table_name)? {
        println!("{} does not have any entry.\n", table_name);
        return Ok(());
    }

    let (headers, rows) = core_storage.select_columns(table_name, &[])?;

    println!("\n{} :", table_name);
    println!("{}", headers.join("\t"));
    for row in rows {
        println!("{}", row.join("\t"));
    }
    println!();
    Ok(())
}

/// Menu actions never break the loop: failures are logged and shown.
fn report(result: AppResult<()>) {
    if let Err(e) = result {
        error!(error = %e, "operation failed");
        println!("Error: {}\n", e);
    }
}

fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line.trim().to_string()),
        Err(e) => {
            error!(error = %e, "failed to read from stdin");
            None
        }
    }
}

/// Empty input means "keep the current value" and comes back as None.
fn read_optional(prompt: &str) -> Option<String> {
    match read_line(prompt) {
        Some(line) if line.is_empty() => None,
        other => other,
    }
}

fn read_choice(prompt: &str) -> Option<i64> {
    read_number(prompt)
}

fn read_number(prompt: &str) -> Option<i64> {
    loop {
        let line = read_line(prompt)?;
        match line.parse() {
            Ok(value) => return Some(value),
            Err(_) => println!("Please enter a number."),
        }
    }
}

fn read_date(prompt: &str) -> Option<String> {
    loop {
        let line = read_line(prompt)?;
        if line.is_empty() {
            return Some(Utc::now().date_naive().to_string());
        }
        match NaiveDate::parse_from_str(&line, "%Y-%m-%d") {
            Ok(date) => return Some(date.to_string()),
            Err(_) => println!("Please enter a date as YYYY-MM-DD."),
        }
    }
}
