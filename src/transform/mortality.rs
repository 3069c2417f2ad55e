use crate::error::{PipelineError, Result};
use crate::schema::{MORTALITY_SCHEMA, STATE_CODE_ALLOW_LIST};
use crate::table::{DataTable, Value};
use tracing::debug;

/// Normalize a raw mortality extract into the fixed 3-column yearly table.
///
/// Rows outside the two-letter-code allow-list are dropped; everything else
/// passes through row for row, with `YEAR` parsed strictly as a four-digit
/// year and `DEATHS` stripped of thousands separators. Extraneous columns
/// such as the source `URL` fall away because output rows are built from the
/// schema columns only.
pub fn transform(raw: &DataTable) -> Result<DataTable> {
    let state_idx = raw
        .column_index("STATE")
        .ok_or_else(|| PipelineError::schema("STATE", "required column is missing"))?;
    let year_idx = raw
        .column_index("YEAR")
        .ok_or_else(|| PipelineError::schema("YEAR", "required column is missing"))?;
    let deaths_idx = raw
        .column_index("DEATHS")
        .ok_or_else(|| PipelineError::schema("DEATHS", "required column is missing"))?;

    let mut out = DataTable::new(MORTALITY_SCHEMA.column_names());
    let mut dropped = 0usize;

    for (row_no, row) in raw.rows().iter().enumerate() {
        let state = match row[state_idx].as_trimmed_text() {
            Some(code) => code.to_uppercase(),
            None => {
                dropped += 1;
                continue;
            }
        };
        if !STATE_CODE_ALLOW_LIST.contains(&state.as_str()) {
            dropped += 1;
            continue;
        }

        let year = parse_year(&row[year_idx], row_no)?;
        let deaths = parse_deaths(&row[deaths_idx], row_no)?;

        out.push_row(vec![Value::Int(year), Value::Text(state), Value::Int(deaths)])?;
    }

    debug!(
        "Retained {} of {} mortality rows ({} dropped by jurisdiction filter)",
        out.row_count(),
        raw.row_count(),
        dropped
    );
    Ok(out)
}

/// Strict four-digit calendar year. A single malformed retained row aborts
/// the transform; it is not dropped.
fn parse_year(value: &Value, row_no: usize) -> Result<i64> {
    let bad = |text: &str| {
        PipelineError::schema(
            "YEAR",
            format!(
                "row {}: cannot parse '{text}' as a four-digit year",
                row_no + 1
            ),
        )
    };
    match value {
        Value::Int(year) if (1000..=9999).contains(year) => Ok(*year),
        Value::Int(year) => Err(bad(&year.to_string())),
        Value::Text(s) => {
            let trimmed = s.trim();
            if trimmed.len() == 4 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
                trimmed.parse::<i64>().map_err(|_| bad(trimmed))
            } else {
                Err(bad(trimmed))
            }
        }
        _ => Err(bad("<null>")),
    }
}

/// Death count, possibly comma-formatted ("1,000"). Non-numeric residue
/// after stripping separators fails the transform.
fn parse_deaths(value: &Value, row_no: usize) -> Result<i64> {
    match value {
        Value::Int(n) => Ok(*n),
        Value::Text(s) => {
            let stripped: String = s.trim().chars().filter(|c| *c != ',').collect();
            stripped.parse::<i64>().map_err(|_| {
                PipelineError::schema(
                    "DEATHS",
                    format!(
                        "row {}: cannot parse '{}' as an integer count",
                        row_no + 1,
                        s.trim()
                    ),
                )
            })
        }
        _ => Err(PipelineError::schema(
            "DEATHS",
            format!("row {}: missing death count", row_no + 1),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[&str]]) -> DataTable {
        let mut t = DataTable::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            t.push_row(row.iter().map(|c| Value::Text(c.to_string())).collect())
                .unwrap();
        }
        t
    }

    #[test]
    fn strips_thousands_separators_and_drops_url() {
        let raw = table(
            &["YEAR", "STATE", "DEATHS", "URL"],
            &[&["2020", "CA", "1,000", "x"]],
        );
        let out = transform(&raw).unwrap();

        assert_eq!(out.columns(), &["YEAR", "STATE", "DEATHS"]);
        assert_eq!(
            out.rows()[0],
            vec![
                Value::Int(2020),
                Value::Text("CA".to_string()),
                Value::Int(1000)
            ]
        );
    }

    #[test]
    fn absent_url_column_is_not_an_error() {
        let raw = table(&["YEAR", "STATE", "DEATHS"], &[&["2019", "WY", "88"]]);
        let out = transform(&raw).unwrap();
        assert_eq!(out.row_count(), 1);
    }

    #[test]
    fn filters_codes_outside_allow_list() {
        let raw = table(
            &["YEAR", "STATE", "DEATHS"],
            &[
                &["2020", "OR", "500"],
                &["2020", "NY", "900"],
                &["2020", "AK", "120"],
            ],
        );
        let out = transform(&raw).unwrap();
        assert_eq!(out.row_count(), 2);
        assert_eq!(out.rows()[0][1], Value::Text("NY".to_string()));
        assert_eq!(out.rows()[1][1], Value::Text("AK".to_string()));
    }

    #[test]
    fn codes_are_case_normalized_before_comparison() {
        let raw = table(&["YEAR", "STATE", "DEATHS"], &[&["2020", " ma ", "700"]]);
        let out = transform(&raw).unwrap();
        assert_eq!(out.rows()[0][1], Value::Text("MA".to_string()));
    }

    #[test]
    fn no_aggregation_across_rows() {
        let raw = table(
            &["YEAR", "STATE", "DEATHS"],
            &[&["2020", "TX", "100"], &["2020", "TX", "200"]],
        );
        let out = transform(&raw).unwrap();
        assert_eq!(out.row_count(), 2);
    }

    #[test]
    fn invalid_year_aborts_even_when_other_rows_are_clean() {
        let raw = table(
            &["YEAR", "STATE", "DEATHS"],
            &[&["2020", "MA", "700"], &["invalid", "TX", "100"]],
        );
        let err = transform(&raw).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaValidation { ref column, .. } if column == "YEAR"));
    }

    #[test]
    fn six_digit_year_is_rejected() {
        let raw = table(&["YEAR", "STATE", "DEATHS"], &[&["202020", "MA", "1"]]);
        assert!(transform(&raw).is_err());
    }

    #[test]
    fn non_numeric_deaths_residue_fails() {
        let raw = table(&["YEAR", "STATE", "DEATHS"], &[&["2020", "NY", "1,0x0"]]);
        let err = transform(&raw).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaValidation { ref column, .. } if column == "DEATHS"));
    }

    #[test]
    fn bad_year_on_filtered_row_is_ignored() {
        let raw = table(
            &["YEAR", "STATE", "DEATHS"],
            &[&["invalid", "ZZ", "1"], &["2021", "CA", "2"]],
        );
        let out = transform(&raw).unwrap();
        assert_eq!(out.row_count(), 1);
    }
}
