/// Source name constants to ensure consistency across the codebase

// User-facing source names (used in CLI and config)
pub const NICS_SOURCE: &str = "nics";
pub const CDC_SOURCE: &str = "cdc";

/// Get all supported source names, in run order
pub fn get_supported_sources() -> Vec<&'static str> {
    vec![NICS_SOURCE, CDC_SOURCE]
}
