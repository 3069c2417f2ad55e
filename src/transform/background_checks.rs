use crate::error::{PipelineError, Result};
use crate::schema::{
    BACKGROUND_CHECK_KEY_COLUMNS, BACKGROUND_CHECK_SCHEMA, STATE_NAME_ALLOW_LIST,
};
use crate::table::{DataTable, Value};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;
use tracing::debug;

/// Normalize a raw background-check extract into the fixed 14-column
/// yearly-aggregated table.
///
/// Rows outside the jurisdiction allow-list are dropped silently; retained
/// rows are grouped by (year, state) with every count column summed. A
/// declared count column that is entirely absent from the extract is
/// zero-filled, but a present column holding an unparseable or missing value
/// in a retained row fails the whole transform.
pub fn transform(raw: &DataTable) -> Result<DataTable> {
    let state_idx = raw
        .column_index("state")
        .ok_or_else(|| PipelineError::schema("state", "required column is missing"))?;
    let month_idx = raw
        .column_index("month")
        .ok_or_else(|| PipelineError::schema("month", "required column is missing"))?;

    // Declared count columns actually present in this extract. Extra source
    // columns outside the schema never make it into the output.
    let count_schema = &BACKGROUND_CHECK_SCHEMA.columns()[BACKGROUND_CHECK_KEY_COLUMNS..];
    let present: Vec<(&'static str, usize)> = count_schema
        .iter()
        .filter_map(|(name, _)| raw.column_index(name).map(|idx| (*name, idx)))
        .collect();

    // BTreeMap keeps the output sorted by (year, state), so repeated runs
    // over the same input are byte-identical.
    let mut groups: BTreeMap<(i64, String), Vec<i64>> = BTreeMap::new();
    let mut dropped = 0usize;

    for (row_no, row) in raw.rows().iter().enumerate() {
        let state = match row[state_idx].as_trimmed_text() {
            Some(s) => s.to_lowercase(),
            None => {
                dropped += 1;
                continue;
            }
        };
        if !STATE_NAME_ALLOW_LIST.contains(&state.as_str()) {
            dropped += 1;
            continue;
        }

        let year = derive_year(&row[month_idx], row_no)?;

        let sums = groups
            .entry((year, state))
            .or_insert_with(|| vec![0; present.len()]);
        for (slot, (name, src_idx)) in present.iter().enumerate() {
            let count = parse_count(&row[*src_idx])
                .map_err(|detail| PipelineError::schema(*name, format!("row {}: {detail}", row_no + 1)))?;
            sums[slot] += count;
        }
    }

    debug!(
        "Aggregated {} raw rows into {} groups ({} dropped by jurisdiction filter)",
        raw.row_count(),
        groups.len(),
        dropped
    );

    let mut out = DataTable::new(BACKGROUND_CHECK_SCHEMA.column_names());
    for ((year, state), sums) in groups {
        let mut row = Vec::with_capacity(BACKGROUND_CHECK_SCHEMA.len());
        row.push(Value::Int(year));
        row.push(Value::Text(state));
        for (name, _) in count_schema {
            let total = present
                .iter()
                .position(|(p, _)| p == name)
                .map(|slot| sums[slot])
                .unwrap_or(0);
            row.push(Value::Int(total));
        }
        out.push_row(row)?;
    }
    Ok(out)
}

/// Derive the calendar year from a month-granularity date cell.
/// Accepts `YYYY-MM` and full `YYYY-MM-DD` values.
fn derive_year(value: &Value, row_no: usize) -> Result<i64> {
    let text = value.as_trimmed_text().ok_or_else(|| {
        PipelineError::schema("month", format!("row {}: missing date value", row_no + 1))
    })?;
    let parsed = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d"));
    match parsed {
        Ok(date) => Ok(i64::from(date.year())),
        Err(_) => Err(PipelineError::schema(
            "month",
            format!("row {}: cannot parse '{text}' as a calendar date", row_no + 1),
        )),
    }
}

/// Strict coercion of one count cell. The transaction-count vocabulary is
/// integral, so a fractional value is a validation error, not a truncation.
fn parse_count(value: &Value) -> std::result::Result<i64, String> {
    match value {
        Value::Int(n) => Ok(*n),
        Value::Float(f) if f.fract() == 0.0 => Ok(*f as i64),
        Value::Float(f) => Err(format!("non-integral count {f}")),
        Value::Text(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .map_err(|_| format!("cannot parse '{trimmed}' as an integer count"))
        }
        Value::Null => Err("missing value in a declared count column".to_string()),
    }
}
