use crate::error::{PipelineError, Result};

/// One untyped cell as delivered by an extractor or produced by a transform.
///
/// CSV cells arrive as `Text` (or `Null` when empty); transforms coerce them
/// explicitly, so a `Null` surviving into a declared numeric column is always
/// a validation failure rather than a silent default.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Null,
}

impl Value {
    /// Cell text with surrounding whitespace trimmed, or `None` for `Null`.
    pub fn as_trimmed_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.trim()),
            _ => None,
        }
    }
}

/// An in-memory table with named columns and untyped rows.
///
/// Extractors produce these with no guarantees beyond column names;
/// transforms consume them and emit tables that satisfy a fixed schema.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl DataTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append one row; the row must match the column count exactly.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(PipelineError::schema(
                "<row>",
                format!(
                    "row has {} cells but table has {} columns",
                    row.len(),
                    self.columns.len()
                ),
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_row_rejects_width_mismatch() {
        let mut table = DataTable::new(vec!["a".to_string(), "b".to_string()]);
        assert!(table.push_row(vec![Value::Int(1)]).is_err());
        assert!(table
            .push_row(vec![Value::Int(1), Value::Text("x".to_string())])
            .is_ok());
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn column_lookup_is_exact() {
        let table = DataTable::new(vec!["year".to_string(), "state".to_string()]);
        assert_eq!(table.column_index("state"), Some(1));
        assert_eq!(table.column_index("STATE"), None);
    }
}
