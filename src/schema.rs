use crate::error::{PipelineError, Result};
use crate::table::DataTable;

/// Scalar type of one declared column; maps 1:1 onto SQLite column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }
}

/// Fixed, ordered column contract a normalized table must satisfy exactly.
///
/// The same descriptor drives the transformer's output construction and the
/// loader's CREATE TABLE / INSERT statements, so both ends enforce one
/// contract.
#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    columns: &'static [(&'static str, ColumnType)],
}

impl TableSchema {
    pub const fn new(columns: &'static [(&'static str, ColumnType)]) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &'static [(&'static str, ColumnType)] {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|(name, _)| name.to_string()).collect()
    }

    /// Checks that a table carries exactly these columns in this order.
    pub fn validate(&self, table: &DataTable) -> Result<()> {
        let actual = table.columns();
        if actual.len() != self.columns.len() {
            return Err(PipelineError::schema(
                "<table>",
                format!(
                    "expected {} columns, found {}",
                    self.columns.len(),
                    actual.len()
                ),
            ));
        }
        for ((expected, _), found) in self.columns.iter().zip(actual) {
            if expected != found {
                return Err(PipelineError::schema(
                    *expected,
                    format!("expected column '{expected}', found '{found}'"),
                ));
            }
        }
        Ok(())
    }

    pub fn create_table_sql(&self, relation: &str) -> String {
        let cols: Vec<String> = self
            .columns
            .iter()
            .map(|(name, ty)| format!("{} {}", quote_ident(name), ty.sql_type()))
            .collect();
        format!(
            "CREATE TABLE {} ({})",
            quote_ident(relation),
            cols.join(", ")
        )
    }

    pub fn insert_sql(&self, relation: &str) -> String {
        let cols: Vec<String> = self
            .columns
            .iter()
            .map(|(name, _)| quote_ident(name))
            .collect();
        let placeholders: Vec<String> =
            (1..=self.columns.len()).map(|i| format!("?{i}")).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(relation),
            cols.join(", "),
            placeholders.join(", ")
        )
    }
}

/// Double-quote an identifier for SQLite (relation names come from config).
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Jurisdictions recognized by the incident-count family, as lower-cased
/// full names. Filtering never admits a state outside this list.
pub const STATE_NAME_ALLOW_LIST: [&str; 6] = [
    "california",
    "new york",
    "massachusetts",
    "texas",
    "wyoming",
    "alaska",
];

/// The same six jurisdictions as the two-letter codes the mortality family
/// uses.
pub const STATE_CODE_ALLOW_LIST: [&str; 6] = ["CA", "NY", "MA", "TX", "WY", "AK"];

use ColumnType::{Integer, Text};

/// Output contract for the background-check (incident-count) family.
/// `year` and `state` lead; everything after them is a summed count.
pub const BACKGROUND_CHECK_SCHEMA: TableSchema = TableSchema::new(&[
    ("year", Integer),
    ("state", Text),
    ("permit", Integer),
    ("permit_recheck", Integer),
    ("handgun", Integer),
    ("long_gun", Integer),
    ("multiple", Integer),
    ("redemption_handgun", Integer),
    ("redemption_long_gun", Integer),
    ("private_sale_handgun", Integer),
    ("private_sale_long_gun", Integer),
    ("return_to_seller_handgun", Integer),
    ("return_to_seller_long_gun", Integer),
    ("totals", Integer),
]);

/// Number of leading key columns (`year`, `state`) in the background-check
/// schema; the rest are the numeric count columns.
pub const BACKGROUND_CHECK_KEY_COLUMNS: usize = 2;

/// Output contract for the mortality-rate family.
pub const MORTALITY_SCHEMA: TableSchema = TableSchema::new(&[
    ("YEAR", Integer),
    ("STATE", Text),
    ("DEATHS", Integer),
]);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    #[test]
    fn background_check_schema_has_all_fourteen_columns() {
        assert_eq!(BACKGROUND_CHECK_SCHEMA.len(), 14);
        let names = BACKGROUND_CHECK_SCHEMA.column_names();
        assert_eq!(names[0], "year");
        assert_eq!(names[1], "state");
        assert_eq!(names[13], "totals");
    }

    #[test]
    fn create_table_sql_quotes_and_orders_columns() {
        let sql = MORTALITY_SCHEMA.create_table_sql("cdc_data");
        assert_eq!(
            sql,
            "CREATE TABLE \"cdc_data\" (\"YEAR\" INTEGER, \"STATE\" TEXT, \"DEATHS\" INTEGER)"
        );
    }

    #[test]
    fn validate_rejects_column_mismatch() {
        let mut table = DataTable::new(vec![
            "YEAR".to_string(),
            "STATE".to_string(),
            "URL".to_string(),
        ]);
        table
            .push_row(vec![
                Value::Int(2020),
                Value::Text("CA".to_string()),
                Value::Text("x".to_string()),
            ])
            .unwrap();
        assert!(MORTALITY_SCHEMA.validate(&table).is_err());
    }
}
