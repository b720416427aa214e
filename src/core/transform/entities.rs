//! Built-in entity derivations
//!
//! Column derivations for the known banking entities. Each function takes the
//! validated, filtered batch and appends the entity's derived columns. Date
//! columns arrive already coerced to canonical `YYYY-MM-DD` strings by the
//! validator.

use crate::core::validate::parse_date;
use crate::domain::batch::Batch;
use crate::domain::errors::SiloError;
use crate::domain::result::Result;
use chrono::{Datelike, NaiveDate};
use serde_json::{json, Value};

/// Credit card billing derivations
///
/// Adds `fully_paid`, `debt`, `due_date` (the 1st of the billing month),
/// `late_days`, `fine` (5.15 per late day) and `total_amount`.
pub fn credit_cards_billing(mut batch: Batch, _today: NaiveDate) -> Result<Batch> {
    let mut fully_paid = Vec::with_capacity(batch.row_count());
    let mut debt = Vec::with_capacity(batch.row_count());
    let mut due_dates = Vec::with_capacity(batch.row_count());
    let mut late_days = Vec::with_capacity(batch.row_count());
    let mut fines = Vec::with_capacity(batch.row_count());
    let mut totals = Vec::with_capacity(batch.row_count());

    for row in 0..batch.row_count() {
        let amount_due = number(&batch, row, "amount_due")?;
        let amount_paid = number(&batch, row, "amount_paid")?;
        let payment_date = date(&batch, row, "payment_date")?;
        let month = text(&batch, row, "month")?;

        // Bills are due on the 1st of their billing month.
        let due_date = parse_date(&format!("{month}-01")).ok_or_else(|| {
            SiloError::Transform(format!("Invalid billing month '{month}' (row {row})"))
        })?;
        let late = (payment_date - due_date).num_days();
        let fine = late as f64 * 5.15;

        fully_paid.push(json!((amount_due - amount_paid).abs() < f64::EPSILON));
        debt.push(json!(amount_due - amount_paid));
        due_dates.push(json!(due_date.format("%Y-%m-%d").to_string()));
        late_days.push(json!(late));
        fines.push(json!(fine));
        totals.push(json!(amount_due + fine));
    }

    batch.add_column("fully_paid", fully_paid)?;
    batch.add_column("debt", debt)?;
    batch.add_column("due_date", due_dates)?;
    batch.add_column("late_days", late_days)?;
    batch.add_column("fine", fines)?;
    batch.add_column("total_amount", totals)?;
    Ok(batch)
}

/// Customer profile derivations
///
/// Adds `tenure` (whole years since account_open_date) and
/// `customer_segment` (Loyal / Newcomer / Normal).
pub fn customer_profiles(mut batch: Batch, today: NaiveDate) -> Result<Batch> {
    let mut tenures = Vec::with_capacity(batch.row_count());
    let mut segments = Vec::with_capacity(batch.row_count());

    for row in 0..batch.row_count() {
        let opened = date(&batch, row, "account_open_date")?;
        let tenure = i64::from(today.year() - opened.year());
        tenures.push(json!(tenure));
        segments.push(json!(categorize_tenure(tenure)));
    }

    batch.add_column("tenure", tenures)?;
    batch.add_column("customer_segment", segments)?;
    Ok(batch)
}

/// Classifies a customer by account tenure in years
fn categorize_tenure(tenure: i64) -> &'static str {
    if tenure > 5 {
        "Loyal"
    } else if tenure < 1 {
        "Newcomer"
    } else {
        "Normal"
    }
}

/// Support ticket derivations
///
/// Adds `age`, the number of days since the complaint date.
pub fn support_tickets(mut batch: Batch, today: NaiveDate) -> Result<Batch> {
    let mut ages = Vec::with_capacity(batch.row_count());
    for row in 0..batch.row_count() {
        let complaint = date(&batch, row, "complaint_date")?;
        ages.push(json!((today - complaint).num_days()));
    }
    batch.add_column("age", ages)?;
    Ok(batch)
}

/// Loan derivations
///
/// Adds `utilization_days` (days since utilization) and `total_cost`
/// (20% of the utilized amount plus a 1000 flat fee). The free-text
/// loan_reason column is obfuscated separately via the entity's declared
/// cipher column.
pub fn loans(mut batch: Batch, today: NaiveDate) -> Result<Batch> {
    let mut utilization_days = Vec::with_capacity(batch.row_count());
    let mut total_costs = Vec::with_capacity(batch.row_count());

    for row in 0..batch.row_count() {
        let utilized_on = date(&batch, row, "utilization_date")?;
        let amount = number(&batch, row, "amount_utilized")?;
        utilization_days.push(json!((today - utilized_on).num_days()));
        total_costs.push(json!(amount * 0.20 + 1000.0));
    }

    batch.add_column("utilization_days", utilization_days)?;
    batch.add_column("total_cost", total_costs)?;
    Ok(batch)
}

/// Money transfer derivations
///
/// Adds `cost` (50 cents plus 0.1% of the amount) and `total_amount`.
pub fn transactions(mut batch: Batch, _today: NaiveDate) -> Result<Batch> {
    let mut costs = Vec::with_capacity(batch.row_count());
    let mut totals = Vec::with_capacity(batch.row_count());

    for row in 0..batch.row_count() {
        let amount = number(&batch, row, "transaction_amount")?;
        let cost = 0.50 + amount * 0.001;
        costs.push(json!(cost));
        totals.push(json!(amount + cost));
    }

    batch.add_column("cost", costs)?;
    batch.add_column("total_amount", totals)?;
    Ok(batch)
}

fn number(batch: &Batch, row: usize, column: &str) -> Result<f64> {
    match batch.value(row, column) {
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| {
            SiloError::Transform(format!("Column {column} row {row} is not a finite number"))
        }),
        Some(other) => Err(SiloError::Transform(format!(
            "Column {column} row {row} is not numeric: {other}"
        ))),
        None => Err(SiloError::Transform(format!("Missing column: {column}"))),
    }
}

fn text(batch: &Batch, row: usize, column: &str) -> Result<String> {
    match batch.value(row, column) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(SiloError::Transform(format!(
            "Column {column} row {row} is not text: {other}"
        ))),
        None => Err(SiloError::Transform(format!("Missing column: {column}"))),
    }
}

fn date(batch: &Batch, row: usize, column: &str) -> Result<NaiveDate> {
    let value = text(batch, row, column)?;
    parse_date(&value).ok_or_else(|| {
        SiloError::Transform(format!(
            "Column {column} row {row} is not a canonical date: '{value}'"
        ))
    })
}
