use crate::error::{PipelineError, Result};
use crate::schema::{quote_ident, TableSchema};
use crate::table::{DataTable, Value};
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{Connection, ToSql};
use std::path::Path;
use tracing::{debug, info};

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Value::Int(n) => Ok(ToSqlOutput::from(*n)),
            Value::Float(f) => Ok(ToSqlOutput::from(*f)),
            Value::Text(s) => Ok(ToSqlOutput::from(s.as_str())),
            Value::Null => Ok(ToSqlOutput::Owned(rusqlite::types::Value::Null)),
        }
    }
}

/// Handle on one SQLite store file. Scoped lifetime: the connection is
/// released when the store is dropped, on every exit path.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (creating if absent) the store file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        debug!("Opened SQLite store at {}", path.display());
        Ok(Self { conn })
    }

    /// Replace the named relation with exactly the rows and columns of
    /// `table`.
    ///
    /// Drop-and-recreate inside one transaction: a failure rolls back and
    /// leaves the previously stored relation unchanged, so the relation is
    /// never partially overwritten. Calling this twice with the same table
    /// leaves one copy of the rows.
    pub fn replace(
        &mut self,
        relation: &str,
        schema: &TableSchema,
        table: &DataTable,
    ) -> Result<()> {
        schema.validate(table)?;

        let tx = self.conn.transaction()?;
        tx.execute_batch(&format!("DROP TABLE IF EXISTS {}", quote_ident(relation)))?;
        tx.execute_batch(&schema.create_table_sql(relation))?;
        {
            let mut stmt = tx.prepare(&schema.insert_sql(relation))?;
            for row in table.rows() {
                stmt.execute(rusqlite::params_from_iter(row.iter()))?;
            }
        }
        tx.commit()?;

        info!("Stored {} rows into relation '{relation}'", table.row_count());
        Ok(())
    }

    /// Read a relation back into a `DataTable` with the given schema.
    pub fn fetch(&self, relation: &str, schema: &TableSchema) -> Result<DataTable> {
        let cols: Vec<String> = schema
            .columns()
            .iter()
            .map(|(name, _)| quote_ident(name))
            .collect();
        let sql = format!("SELECT {} FROM {}", cols.join(", "), quote_ident(relation));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut table = DataTable::new(schema.column_names());
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(schema.len());
            for (i, (name, _)) in schema.columns().iter().enumerate() {
                let cell = match row.get_ref(i)? {
                    ValueRef::Null => Value::Null,
                    ValueRef::Integer(n) => Value::Int(n),
                    ValueRef::Real(f) => Value::Float(f),
                    ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
                    ValueRef::Blob(_) => {
                        return Err(PipelineError::schema(
                            *name,
                            "unexpected blob value in relation".to_string(),
                        ))
                    }
                };
                cells.push(cell);
            }
            table.push_row(cells)?;
        }
        Ok(table)
    }
}
