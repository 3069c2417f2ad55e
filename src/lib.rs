pub mod config;
pub mod constants;
pub mod error;
pub mod extract;
pub mod loader;
pub mod logging;
pub mod pipeline;
pub mod schema;
pub mod table;
pub mod transform;
