//! Decimal amounts are stored as TEXT so SQLite never rounds them through a float.

use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::{Row, sqlite::SqliteRow};

pub fn decimal_column(row: &SqliteRow, column: &str) -> Result<Decimal, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    Decimal::from_str(raw.trim()).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

/// Round half away from zero and pin the scale to two places.
pub fn to_currency(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}
