pub mod background_checks;
pub mod mortality;

use crate::constants;
use crate::error::Result;
use crate::schema::{TableSchema, BACKGROUND_CHECK_SCHEMA, MORTALITY_SCHEMA};
use crate::table::DataTable;

/// One source family: a pure table-in/table-out normalization step plus the
/// schema its output satisfies.
pub trait SourceFamily {
    /// Unique identifier for this source (matches CLI and config keys).
    fn name(&self) -> &'static str;

    /// The fixed column contract every transform output satisfies.
    fn schema(&self) -> &'static TableSchema;

    /// Normalize one raw extract. Pure: table in, table out, or an explicit
    /// failure; never partial output.
    fn transform(&self, raw: &DataTable) -> Result<DataTable>;
}

/// FBI NICS background-check counts (incident-count family).
pub struct BackgroundChecks;

impl SourceFamily for BackgroundChecks {
    fn name(&self) -> &'static str {
        constants::NICS_SOURCE
    }

    fn schema(&self) -> &'static TableSchema {
        &BACKGROUND_CHECK_SCHEMA
    }

    fn transform(&self, raw: &DataTable) -> Result<DataTable> {
        background_checks::transform(raw)
    }
}

/// CDC firearm mortality counts (mortality-rate family).
pub struct Mortality;

impl SourceFamily for Mortality {
    fn name(&self) -> &'static str {
        constants::CDC_SOURCE
    }

    fn schema(&self) -> &'static TableSchema {
        &MORTALITY_SCHEMA
    }

    fn transform(&self, raw: &DataTable) -> Result<DataTable> {
        mortality::transform(raw)
    }
}

/// Look up the source family for a user-facing source name.
pub fn create_source(name: &str) -> Option<Box<dyn SourceFamily>> {
    match name {
        constants::NICS_SOURCE => Some(Box::new(BackgroundChecks)),
        constants::CDC_SOURCE => Some(Box::new(Mortality)),
        _ => None,
    }
}
